use crate::config::Config;
use crate::tokenizer::parse;
use std::collections::BTreeMap;

pub type DocId = u64;
pub type Position = u32;
/// Byte offset of a document record inside the docs section of a binary index.
pub type Handle = u32;

/// Positions of one term, keyed by document.
pub type Postings = BTreeMap<DocId, Vec<Position>>;

/// In-memory inverted index. Ordered maps give document-id and lexical term
/// iteration order to the writers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Index {
    pub docs: BTreeMap<DocId, String>,
    pub entries: BTreeMap<String, Postings>,
}

impl Index {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.entries.len() }
}

#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: Index,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    /// Adds a document. A repeated id is ignored; the first title wins.
    pub fn add_document(&mut self, id: DocId, title: &str, config: &Config) {
        if self.index.docs.contains_key(&id) {
            tracing::debug!(id, "duplicate document id ignored");
            return;
        }
        self.index.docs.insert(id, title.to_string());
        for word in parse(title, config) {
            for ngram in word.ngrams {
                self.index
                    .entries
                    .entry(ngram)
                    .or_default()
                    .entry(id)
                    .or_default()
                    .push(word.position as Position);
            }
        }
    }

    pub fn index(&self) -> &Index { &self.index }

    pub fn into_index(self) -> Index { self.index }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(vec!["the".into()], 3, 6).unwrap()
    }

    fn matrix_postings(ids: &[DocId]) -> BTreeMap<String, Postings> {
        ["mat", "matr", "matri", "matrix"]
            .iter()
            .map(|t| (t.to_string(), ids.iter().map(|id| (*id, vec![0])).collect()))
            .collect()
    }

    #[test]
    fn duplicate_id_keeps_first_document() {
        let cfg = config();
        let mut b = IndexBuilder::new();
        b.add_document(199903, "The Matrix: 1", &cfg);
        b.add_document(199903, "HeheHaha: 2", &cfg);
        let idx = b.into_index();
        assert_eq!(idx.docs.len(), 1);
        assert_eq!(idx.docs[&199903], "The Matrix: 1");
        assert_eq!(idx.entries, matrix_postings(&[199903]));
    }

    #[test]
    fn same_title_different_ids() {
        let cfg = config();
        let mut b = IndexBuilder::new();
        b.add_document(199903, "The Matrix: 1", &cfg);
        b.add_document(199904, "The Matrix: 1", &cfg);
        assert_eq!(b.index().entries, matrix_postings(&[199903, 199904]));
        assert_eq!(b.index().num_docs(), 2);
    }

    #[test]
    fn repeated_word_appends_positions_in_order() {
        let cfg = config();
        let mut b = IndexBuilder::new();
        b.add_document(7, "matrix the matrix", &cfg);
        assert_eq!(b.index().entries["matrix"][&7], vec![0, 1]);
    }

    #[test]
    fn document_without_tokens_has_no_postings() {
        let cfg = config();
        let mut b = IndexBuilder::new();
        b.add_document(1, "the a", &cfg);
        assert_eq!(b.index().num_docs(), 1);
        assert_eq!(b.index().num_terms(), 0);
    }
}
