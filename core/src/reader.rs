//! Zero-copy decoding of a binary index. Accessors borrow section slices of
//! the mapped file and build a fresh cursor per call.

use crate::buffer::ByteCursor;
use crate::error::{FtsError, Result};
use crate::index::{Handle, Position};
use crate::trie::UNPATCHED;
use crate::writer::{DICTIONARY, DOCS, ENTRIES};
use std::collections::BTreeMap;
use std::ops::Range;

/// Section table at the start of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    sections: Vec<(String, u32)>,
    len: usize,
}

impl Header {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data, "header");
        let count = cursor.read_u8()?;
        let mut sections = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = cursor.read_str()?.to_string();
            let offset = cursor.read_u32()?;
            sections.push((name, offset));
        }
        Ok(Self { sections, len: cursor.position() })
    }

    /// Encoded size of the header itself.
    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.sections.is_empty() }

    pub fn section_offset(&self, name: &str) -> Option<u32> {
        self.sections.iter().find(|(n, _)| n == name).map(|(_, off)| *off)
    }

    /// Byte range of `name` within a file of `file_len` bytes. A section ends
    /// where the next one starts, the last one at end of file.
    pub fn section_range(&self, name: &str, file_len: usize) -> Result<Range<usize>> {
        let start = self
            .section_offset(name)
            .ok_or_else(|| FtsError::decode("header", 0, format!("missing section {name:?}")))?
            as usize;
        if start < self.len || start > file_len {
            return Err(FtsError::decode(
                "header",
                0,
                format!("section {name:?} offset {start} outside {}..={file_len}", self.len),
            ));
        }
        let end = self
            .sections
            .iter()
            .map(|(_, off)| *off as usize)
            .filter(|off| *off > start)
            .min()
            .unwrap_or(file_len)
            .min(file_len);
        Ok(start..end)
    }
}

/// The three payload sections of one file image.
#[derive(Debug, Clone)]
pub struct SectionLayout {
    pub dictionary: Range<usize>,
    pub entries: Range<usize>,
    pub docs: Range<usize>,
}

impl SectionLayout {
    pub fn from_header(header: &Header, file_len: usize) -> Result<Self> {
        Ok(Self {
            dictionary: header.section_range(DICTIONARY, file_len)?,
            entries: header.section_range(ENTRIES, file_len)?,
            docs: header.section_range(DOCS, file_len)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DictionaryAccessor<'a> {
    data: &'a [u8],
}

impl<'a> DictionaryAccessor<'a> {
    pub fn new(data: &'a [u8]) -> Self { Self { data } }

    /// Walks the trie along the bytes of `term` and returns the entries
    /// offset stored at its node, or `None` when the path breaks off or ends
    /// on a non-leaf node.
    pub fn retrieve(&self, term: &str) -> Result<Option<u32>> {
        let mut cursor = ByteCursor::new(self.data, DICTIONARY);
        for symbol in term.bytes() {
            let child_count = cursor.read_u32()? as usize;
            let labels = cursor.read_bytes(child_count)?;
            // linear scan; fan-out is bounded by the byte alphabet
            let Some(slot) = labels.iter().position(|b| *b == symbol) else {
                return Ok(None);
            };
            cursor.skip(slot * 4)?;
            let child = cursor.read_u32()?;
            if child == UNPATCHED {
                return Err(FtsError::decode(DICTIONARY, cursor.position() - 4, "unpatched child slot"));
            }
            cursor.seek(child as usize)?;
        }
        let child_count = cursor.read_u32()? as usize;
        // labels (1 byte) and child slots (4 bytes) per child
        let table = child_count
            .checked_mul(5)
            .ok_or_else(|| FtsError::decode(DICTIONARY, cursor.position(), "child count overflow"))?;
        cursor.skip(table)?;
        match cursor.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(cursor.read_u32()?)),
            flag => Err(FtsError::decode(DICTIONARY, cursor.position() - 1, format!("bad leaf flag {flag}"))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntryAccessor<'a> {
    data: &'a [u8],
}

impl<'a> EntryAccessor<'a> {
    pub fn new(data: &'a [u8]) -> Self { Self { data } }

    /// Decodes the postings block at `offset`: handle -> positions.
    pub fn get_term_infos(&self, offset: u32) -> Result<BTreeMap<Handle, Vec<Position>>> {
        let mut cursor = ByteCursor::at(self.data, ENTRIES, offset as usize)?;
        let doc_count = cursor.read_u32()?;
        let mut infos = BTreeMap::new();
        for _ in 0..doc_count {
            let handle = cursor.read_u32()?;
            let pos_count = cursor.read_u32()? as usize;
            let raw = cursor.read_bytes(pos_count.saturating_mul(4))?;
            let positions = raw
                .chunks_exact(4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            infos.insert(handle, positions);
        }
        Ok(infos)
    }
}

/// Size of the `u32` document count opening the docs section; the first
/// record's handle.
pub const DOC_COUNT_LEN: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct DocumentAccessor<'a> {
    data: &'a [u8],
}

impl<'a> DocumentAccessor<'a> {
    pub fn new(data: &'a [u8]) -> Self { Self { data } }

    /// Title of the record starting at `handle`. Handles pointing into the
    /// leading document count are rejected.
    pub fn load_document(&self, handle: Handle) -> Result<&'a str> {
        if (handle as usize) < DOC_COUNT_LEN {
            return Err(FtsError::DocumentNotFound(handle.into()));
        }
        ByteCursor::at(self.data, DOCS, handle as usize)?.read_str()
    }

    pub fn total_docs(&self) -> Result<u32> {
        ByteCursor::new(self.data, DOCS).read_u32()
    }
}
