use crate::accessor::BinaryIndexAccessor;
use crate::error::Result;
use crate::index::{Handle, Position};
use crate::reader::{Header, SectionLayout};
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// A binary index file mapped read-only for the lifetime of a search
/// session. Accessors borrow from it, so the map outlives every reader and
/// is released on drop.
#[derive(Debug)]
pub struct MappedIndex {
    mmap: Mmap,
    layout: SectionLayout,
}

impl MappedIndex {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the index is write-once; nothing modifies the file while a
        // session holds it open.
        let mmap = unsafe { Mmap::map(&file)? };
        let header = Header::parse(&mmap)?;
        let layout = SectionLayout::from_header(&header, mmap.len())?;
        tracing::info!(path = %path.display(), bytes = mmap.len(), "mapped binary index");
        Ok(Self { mmap, layout })
    }

    pub fn len(&self) -> usize { self.mmap.len() }

    pub fn is_empty(&self) -> bool { self.mmap.is_empty() }

    pub fn accessor(&self) -> BinaryIndexAccessor<'_> {
        BinaryIndexAccessor::with_layout(&self.mmap, &self.layout)
    }
}

/// Looks up one term in the binary index at `path`.
pub fn parse_binary_entry<P: AsRef<Path>>(path: P, term: &str) -> Result<BTreeMap<Handle, Vec<Position>>> {
    let index = MappedIndex::open(path)?;
    Ok(index.accessor().postings(term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::index::IndexBuilder;
    use crate::persist::IndexPaths;
    use crate::writer::{BinaryIndexWriter, IndexWriter};

    #[test]
    fn open_and_lookup_written_file() {
        let cfg = Config::new(vec!["the".into()], 3, 6).unwrap();
        let mut b = IndexBuilder::new();
        b.add_document(199903, "The Matrix: 1", &cfg);
        b.add_document(200305, "The Matrix: 2", &cfg);
        b.add_document(200311, "The Matrix: 3", &cfg);
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        BinaryIndexWriter::new().write(&paths, b.index()).unwrap();

        let entry = parse_binary_entry(paths.binary(), "matrix").unwrap();
        let expected: BTreeMap<Handle, Vec<Position>> =
            [(4, vec![0]), (18, vec![0]), (32, vec![0])].into_iter().collect();
        assert_eq!(entry, expected);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MappedIndex::open("/nonexistent/binary").unwrap_err();
        assert!(matches!(err, crate::error::FtsError::Io(_)));
    }

    #[test]
    fn garbage_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary");
        std::fs::write(&path, [3u8, 11, b'd']).unwrap();
        assert!(MappedIndex::open(&path).unwrap_err().is_decode());
    }
}
