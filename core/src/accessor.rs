use crate::error::{FtsError, Result};
use crate::index::{DocId, Handle, Index, Position};
use crate::reader::{DictionaryAccessor, DocumentAccessor, EntryAccessor, Header, SectionLayout};
use std::collections::BTreeMap;

/// Read-side view of an index, implemented by every storage format so that
/// search is written once. Document ids are format-specific: original ids
/// for the in-memory and text forms, handles for the binary form.
pub trait IndexAccessor {
    fn load_document(&self, id: DocId) -> Result<String>;

    fn total_docs(&self) -> Result<usize>;

    fn get_doc_by_term(&self, term: &str) -> Result<Vec<DocId>>;

    fn get_count_terms_in_doc(&self, term: &str, id: DocId) -> Result<usize>;

    /// `(document, term frequency)` for every document containing `term`,
    /// ascending by document.
    fn term_frequencies(&self, term: &str) -> Result<Vec<(DocId, usize)>> {
        self.get_doc_by_term(term)?
            .into_iter()
            .map(|id| Ok((id, self.get_count_terms_in_doc(term, id)?)))
            .collect()
    }
}

impl IndexAccessor for Index {
    fn load_document(&self, id: DocId) -> Result<String> {
        self.docs.get(&id).cloned().ok_or(FtsError::DocumentNotFound(id))
    }

    fn total_docs(&self) -> Result<usize> {
        Ok(self.docs.len())
    }

    fn get_doc_by_term(&self, term: &str) -> Result<Vec<DocId>> {
        Ok(self.entries.get(term).map(|p| p.keys().copied().collect()).unwrap_or_default())
    }

    fn get_count_terms_in_doc(&self, term: &str, id: DocId) -> Result<usize> {
        Ok(self.entries.get(term).and_then(|p| p.get(&id)).map_or(0, Vec::len))
    }

    fn term_frequencies(&self, term: &str) -> Result<Vec<(DocId, usize)>> {
        Ok(self
            .entries
            .get(term)
            .map(|p| p.iter().map(|(id, positions)| (*id, positions.len())).collect())
            .unwrap_or_default())
    }
}

/// Accessor over the bytes of a binary index, usually a memory map.
#[derive(Debug, Clone, Copy)]
pub struct BinaryIndexAccessor<'a> {
    dictionary: DictionaryAccessor<'a>,
    entries: EntryAccessor<'a>,
    docs: DocumentAccessor<'a>,
}

impl<'a> BinaryIndexAccessor<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let header = Header::parse(data)?;
        let layout = SectionLayout::from_header(&header, data.len())?;
        Ok(Self::with_layout(data, &layout))
    }

    /// `layout` must have been computed for `data`.
    pub fn with_layout(data: &'a [u8], layout: &SectionLayout) -> Self {
        Self {
            dictionary: DictionaryAccessor::new(&data[layout.dictionary.clone()]),
            entries: EntryAccessor::new(&data[layout.entries.clone()]),
            docs: DocumentAccessor::new(&data[layout.docs.clone()]),
        }
    }

    /// Postings of `term` keyed by handle. Unknown terms and decode
    /// inconsistencies both yield an empty map.
    pub fn postings(&self, term: &str) -> BTreeMap<Handle, Vec<Position>> {
        let lookup = self
            .dictionary
            .retrieve(term)
            .and_then(|offset| offset.map(|o| self.entries.get_term_infos(o)).transpose());
        match lookup {
            Ok(Some(infos)) => infos,
            Ok(None) => {
                tracing::debug!(term, "term not in dictionary");
                Default::default()
            }
            Err(e) => {
                tracing::warn!(term, error = %e, "treating undecodable term as unknown");
                Default::default()
            }
        }
    }
}

impl IndexAccessor for BinaryIndexAccessor<'_> {
    fn load_document(&self, id: DocId) -> Result<String> {
        let handle = Handle::try_from(id).map_err(|_| FtsError::DocumentNotFound(id))?;
        Ok(self.docs.load_document(handle)?.to_string())
    }

    fn total_docs(&self) -> Result<usize> {
        Ok(self.docs.total_docs()? as usize)
    }

    fn get_doc_by_term(&self, term: &str) -> Result<Vec<DocId>> {
        Ok(self.postings(term).into_keys().map(DocId::from).collect())
    }

    fn get_count_terms_in_doc(&self, term: &str, id: DocId) -> Result<usize> {
        let Ok(handle) = Handle::try_from(id) else { return Ok(0) };
        Ok(self.postings(term).get(&handle).map_or(0, Vec::len))
    }

    fn term_frequencies(&self, term: &str) -> Result<Vec<(DocId, usize)>> {
        Ok(self
            .postings(term)
            .into_iter()
            .map(|(handle, positions)| (DocId::from(handle), positions.len()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::index::IndexBuilder;
    use crate::writer::BinaryIndexWriter;

    fn build() -> Index {
        let cfg = Config::new(vec!["the".into()], 3, 6).unwrap();
        let mut b = IndexBuilder::new();
        b.add_document(199903, "The Matrix: 1", &cfg);
        b.add_document(200305, "The Matrix Reloaded", &cfg);
        b.add_document(200311, "Matrix matrix", &cfg);
        b.into_index()
    }

    #[test]
    fn in_memory_accessor_uses_original_ids() {
        let idx = build();
        assert_eq!(idx.total_docs().unwrap(), 3);
        assert_eq!(idx.get_doc_by_term("matrix").unwrap(), vec![199903, 200305, 200311]);
        assert_eq!(idx.get_count_terms_in_doc("matrix", 200311).unwrap(), 2);
        assert_eq!(idx.get_count_terms_in_doc("reload", 199903).unwrap(), 0);
        assert!(matches!(idx.load_document(1), Err(FtsError::DocumentNotFound(1))));
    }

    #[test]
    fn binary_accessor_reports_handles() {
        let idx = build();
        let bytes = BinaryIndexWriter::new().encode(&idx).to_bytes();
        let acc = BinaryIndexAccessor::new(&bytes).unwrap();
        assert_eq!(acc.total_docs().unwrap(), 3);

        let handles = acc.get_doc_by_term("matrix").unwrap();
        assert_eq!(handles, vec![4, 18, 38]);
        assert_eq!(acc.load_document(18).unwrap(), "The Matrix Reloaded");
        assert_eq!(acc.get_count_terms_in_doc("matrix", 38).unwrap(), 2);
        assert_eq!(acc.term_frequencies("reloa").unwrap(), vec![(18, 1)]);
        assert!(acc.get_doc_by_term("zebra").unwrap().is_empty());
    }

    #[test]
    fn default_term_frequencies_match_override() {
        struct Plain(Index);
        impl IndexAccessor for Plain {
            fn load_document(&self, id: DocId) -> Result<String> { self.0.load_document(id) }
            fn total_docs(&self) -> Result<usize> { self.0.total_docs() }
            fn get_doc_by_term(&self, term: &str) -> Result<Vec<DocId>> { self.0.get_doc_by_term(term) }
            fn get_count_terms_in_doc(&self, term: &str, id: DocId) -> Result<usize> {
                self.0.get_count_terms_in_doc(term, id)
            }
        }
        let idx = build();
        let plain = Plain(idx.clone());
        assert_eq!(plain.term_frequencies("matr").unwrap(), idx.term_frequencies("matr").unwrap());
    }
}
