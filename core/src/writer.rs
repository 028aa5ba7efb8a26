//! Binary index serialization.
//!
//! ```text
//! header      section_count: u8 = 3
//!             3 x { name: len+1 u8, bytes; offset: u32 (absolute) }
//! dictionary  trie, see `trie`
//! entries     per term: doc_count u32, doc_count x { handle u32, pos_count u32, [u32] }
//! docs        doc_count u32, then per document: len+1 u8, title bytes
//! ```
//!
//! Offsets stored inside a section are relative to that section's start.

use crate::buffer::BinaryBuffer;
use crate::error::Result;
use crate::index::{DocId, Handle, Index};
use crate::persist::IndexPaths;
use crate::trie::Trie;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};

pub const DICTIONARY: &str = "dictionary";
pub const ENTRIES: &str = "entries";
pub const DOCS: &str = "docs";
pub const SECTION_NAMES: [&str; 3] = [DICTIONARY, ENTRIES, DOCS];

/// Serializes a built [`Index`] into some on-disk format under an index
/// directory. Writers never mutate the index.
pub trait IndexWriter {
    fn write(&self, paths: &IndexPaths, index: &Index) -> Result<()>;
}

/// The four encoded sections plus the bookkeeping produced along the way.
#[derive(Debug)]
pub struct EncodedIndex {
    pub header: BinaryBuffer,
    pub dictionary: BinaryBuffer,
    pub entries: BinaryBuffer,
    pub docs: BinaryBuffer,
    pub handles: BTreeMap<DocId, Handle>,
    pub entry_offsets: HashMap<String, u32>,
}

impl EncodedIndex {
    pub fn len(&self) -> usize {
        self.header.len() + self.dictionary.len() + self.entries.len() + self.docs.len()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Contiguous file image: header, dictionary, entries, docs.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for section in self.sections() {
            out.extend_from_slice(section.as_slice());
        }
        out
    }

    /// Inverse of `handles`, for callers that need original ids back.
    pub fn doc_id_map(&self) -> BTreeMap<Handle, DocId> {
        self.handles.iter().map(|(id, handle)| (*handle, *id)).collect()
    }

    fn sections(&self) -> [&BinaryBuffer; 4] {
        [&self.header, &self.dictionary, &self.entries, &self.docs]
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryIndexWriter;

impl BinaryIndexWriter {
    pub fn new() -> Self { Self }

    pub fn encode(&self, index: &Index) -> EncodedIndex {
        let mut docs = BinaryBuffer::new();
        let handles = write_docs(&mut docs, index);

        let mut entries = BinaryBuffer::new();
        let entry_offsets = write_entries(&mut entries, index, &handles);

        let mut dictionary = BinaryBuffer::new();
        write_dictionary(&mut dictionary, &entry_offsets);

        let mut header = BinaryBuffer::new();
        let slots = write_header(&mut header);
        let dictionary_offset = header.offset();
        let entries_offset = dictionary_offset + dictionary.offset();
        let docs_offset = entries_offset + entries.offset();
        for (slot, offset) in slots.into_iter().zip([dictionary_offset, entries_offset, docs_offset]) {
            header.write_u32_at(slot, offset);
        }

        tracing::debug!(
            header = header.len(),
            dictionary = dictionary.len(),
            entries = entries.len(),
            docs = docs.len(),
            "encoded binary index"
        );
        EncodedIndex { header, dictionary, entries, docs, handles, entry_offsets }
    }

    pub fn write_encoded(&self, paths: &IndexPaths, encoded: &EncodedIndex) -> Result<()> {
        fs::create_dir_all(paths.binary_dir())?;
        let mut out = BufWriter::new(File::create(paths.binary())?);
        for section in encoded.sections() {
            out.write_all(section.as_slice())?;
        }
        out.flush()?;
        Ok(())
    }
}

impl IndexWriter for BinaryIndexWriter {
    fn write(&self, paths: &IndexPaths, index: &Index) -> Result<()> {
        let encoded = self.encode(index);
        self.write_encoded(paths, &encoded)?;
        tracing::info!(path = %paths.binary().display(), bytes = encoded.len(), "binary index written");
        Ok(())
    }
}

/// Writes the section table with zeroed offsets and returns the byte
/// positions of the offset slots.
fn write_header(buf: &mut BinaryBuffer) -> Vec<usize> {
    buf.write_u8(SECTION_NAMES.len() as u8);
    SECTION_NAMES
        .iter()
        .map(|name| {
            buf.write_str(name);
            let slot = buf.len();
            buf.write_u32(0);
            slot
        })
        .collect()
}

fn write_docs(buf: &mut BinaryBuffer, index: &Index) -> BTreeMap<DocId, Handle> {
    buf.write_u32(index.docs.len() as u32);
    index
        .docs
        .iter()
        .map(|(id, title)| {
            let handle = buf.offset();
            buf.write_str(title);
            (*id, handle)
        })
        .collect()
}

fn write_entries(
    buf: &mut BinaryBuffer,
    index: &Index,
    handles: &BTreeMap<DocId, Handle>,
) -> HashMap<String, u32> {
    let mut offsets = HashMap::with_capacity(index.entries.len());
    for (term, postings) in &index.entries {
        offsets.insert(term.clone(), buf.offset());
        let known: Vec<_> = postings
            .iter()
            .filter_map(|(id, positions)| handles.get(id).map(|handle| (*handle, positions)))
            .collect();
        if known.len() != postings.len() {
            tracing::warn!(term = %term, "postings reference documents missing from docs; skipped");
        }
        buf.write_u32(known.len() as u32);
        for (handle, positions) in known {
            buf.write_u32(handle);
            buf.write_u32(positions.len() as u32);
            for pos in positions {
                buf.write_u32(*pos);
            }
        }
    }
    offsets
}

fn write_dictionary(buf: &mut BinaryBuffer, entry_offsets: &HashMap<String, u32>) {
    let mut trie = Trie::new();
    for (term, offset) in entry_offsets {
        trie.add(term, *offset);
    }
    trie.serialize(buf);
}
