//! Plain-text index layout, kept for debugging and inspection:
//! `text/docs/<id>` holds a title, `text/entries/<hash>` one term's postings
//! as `term doc_count (doc_id pos_count pos...)*`.

use crate::accessor::IndexAccessor;
use crate::error::{FtsError, Result};
use crate::index::{DocId, Index, Postings};
use crate::persist::IndexPaths;
use crate::writer::IndexWriter;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of a term's entry: the first six hex digits of its SHA-256.
pub fn entry_file_name(term: &str) -> String {
    let digest = hex::encode(Sha256::digest(term.as_bytes()));
    digest[..6].to_string()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextIndexWriter;

impl IndexWriter for TextIndexWriter {
    fn write(&self, paths: &IndexPaths, index: &Index) -> Result<()> {
        let docs_dir = paths.text_docs();
        fs::create_dir_all(&docs_dir)?;
        for (id, title) in &index.docs {
            fs::write(docs_dir.join(id.to_string()), title)?;
        }

        let entries_dir = paths.text_entries();
        fs::create_dir_all(&entries_dir)?;
        for (term, postings) in &index.entries {
            fs::write(entries_dir.join(entry_file_name(term)), format_entry(term, postings))?;
        }
        tracing::info!(root = %paths.text().display(), docs = index.docs.len(), terms = index.entries.len(), "text index written");
        Ok(())
    }
}

fn format_entry(term: &str, postings: &Postings) -> String {
    let mut out = format!("{term} {}", postings.len());
    for (id, positions) in postings {
        out.push_str(&format!(" {id} {}", positions.len()));
        for pos in positions {
            out.push_str(&format!(" {pos}"));
        }
    }
    out
}

/// Parses one entry file into its term and postings.
pub fn parse_text_entry(path: &Path) -> Result<(String, Postings)> {
    let content = fs::read_to_string(path)?;
    let bad = |reason: &str| FtsError::decode("text entry", 0, format!("{}: {reason}", path.display()));
    let mut fields = content.split_whitespace();
    let term = fields.next().ok_or_else(|| bad("empty entry"))?.to_string();
    let mut next_num = |what: &str| -> Result<u64> {
        fields
            .next()
            .ok_or_else(|| bad(&format!("missing {what}")))?
            .parse::<u64>()
            .map_err(|_| bad(&format!("invalid {what}")))
    };

    let doc_count = next_num("doc count")?;
    let mut postings = Postings::new();
    for _ in 0..doc_count {
        let id = next_num("doc id")?;
        let pos_count = next_num("position count")?;
        let positions = (0..pos_count)
            .map(|_| next_num("position").and_then(|p| u32::try_from(p).map_err(|_| bad("position overflow"))))
            .collect::<Result<Vec<_>>>()?;
        postings.insert(id, positions);
    }
    Ok((term, postings))
}

/// Accessor over a directory written by [`TextIndexWriter`].
#[derive(Debug, Clone)]
pub struct TextIndexAccessor {
    root: PathBuf,
}

impl TextIndexAccessor {
    /// `root` is the `text` directory of an index.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn postings(&self, term: &str) -> Result<Postings> {
        let path = self.root.join("entries").join(entry_file_name(term));
        match parse_text_entry(&path) {
            // a different term under the same short hash
            Ok((stored, postings)) if stored == term => Ok(postings),
            Ok(_) => Ok(Postings::new()),
            Err(FtsError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Postings::new()),
            Err(e) if e.is_decode() => {
                tracing::warn!(term, error = %e, "treating undecodable term as unknown");
                Ok(Postings::new())
            }
            Err(e) => Err(e),
        }
    }
}

impl IndexAccessor for TextIndexAccessor {
    fn load_document(&self, id: DocId) -> Result<String> {
        match fs::read_to_string(self.root.join("docs").join(id.to_string())) {
            Ok(title) => Ok(title.lines().next().unwrap_or_default().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FtsError::DocumentNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    fn total_docs(&self) -> Result<usize> {
        let dir = match fs::read_dir(self.root.join("docs")) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut count = 0;
        for entry in dir {
            if entry?.file_type()?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn get_doc_by_term(&self, term: &str) -> Result<Vec<DocId>> {
        Ok(self.postings(term)?.into_keys().collect())
    }

    fn get_count_terms_in_doc(&self, term: &str, id: DocId) -> Result<usize> {
        Ok(self.postings(term)?.get(&id).map_or(0, Vec::len))
    }

    fn term_frequencies(&self, term: &str) -> Result<Vec<(DocId, usize)>> {
        Ok(self.postings(term)?.into_iter().map(|(id, p)| (id, p.len())).collect())
    }
}
