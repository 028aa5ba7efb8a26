//! Byte-level primitives of the binary index: a growable little-endian write
//! buffer with in-place patching, and a bounds-checked read cursor.

use crate::error::{FtsError, Result};

/// Largest string the one-byte, off-by-one length prefix can describe.
pub const MAX_STR_LEN: usize = u8::MAX as usize - 1;

#[derive(Debug, Default, Clone)]
pub struct BinaryBuffer {
    data: Vec<u8>,
}

impl BinaryBuffer {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.data.len() }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Current size as a section-relative offset.
    pub fn offset(&self) -> u32 { self.data.len() as u32 }

    pub fn as_slice(&self) -> &[u8] { &self.data }

    pub fn into_inner(self) -> Vec<u8> { self.data }

    pub fn write_u8(&mut self, v: u8) { self.data.push(v); }

    pub fn write_u32(&mut self, v: u32) { self.data.extend_from_slice(&v.to_le_bytes()); }

    pub fn write_bytes(&mut self, bytes: &[u8]) { self.data.extend_from_slice(bytes); }

    /// Writes `s` behind a length byte holding `len + 1`. Strings longer than
    /// [`MAX_STR_LEN`] are cut at the last char boundary that fits.
    pub fn write_str(&mut self, s: &str) {
        let s = truncate_to_boundary(s, MAX_STR_LEN);
        self.write_u8(s.len() as u8 + 1);
        self.write_bytes(s.as_bytes());
    }

    /// Overwrites four bytes previously written at `offset`.
    pub fn write_u32_at(&mut self, offset: usize, v: u32) {
        assert!(offset + 4 <= self.data.len(), "patch at {offset} past end of buffer");
        self.data[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
    }
}

pub(crate) fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    tracing::warn!(len = s.len(), kept = end, "string truncated to fit length prefix");
    &s[..end]
}

/// Read cursor over one section. Offsets are relative to the section start.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    section: &'static str,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], section: &'static str) -> Self {
        Self { data, pos: 0, section }
    }

    pub fn at(data: &'a [u8], section: &'static str, offset: usize) -> Result<Self> {
        let mut cursor = Self::new(data, section);
        cursor.seek(offset)?;
        Ok(cursor)
    }

    pub fn position(&self) -> usize { self.pos }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(self.error(format!("seek past end (len {})", self.data.len())));
        }
        self.pos = offset;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.error(format!("read of {n} bytes past end (len {})", self.data.len())))?;
        let data = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a string written by [`BinaryBuffer::write_str`].
    pub fn read_str(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let stored = self.read_u8()?;
        if stored == 0 {
            return Err(FtsError::decode(self.section, start, "zero string length prefix"));
        }
        let bytes = self.read_bytes(stored as usize - 1)?;
        std::str::from_utf8(bytes)
            .map_err(|e| FtsError::decode(self.section, start, format!("invalid UTF-8: {e}")))
    }

    fn error(&self, reason: String) -> FtsError {
        FtsError::decode(self.section, self.pos, reason)
    }
}
