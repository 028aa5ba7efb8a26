//! Dictionary trie. Built in memory over term bytes, then laid out depth-first
//! into the dictionary section.
//!
//! Node layout (all integers little-endian):
//!
//! ```text
//! child_count: u32
//! labels:      [u8; child_count]   ascending byte order
//! children:    [u32; child_count]  dictionary-relative node offsets
//! is_leaf:     u8
//! entry:       u32                 present only when is_leaf == 1
//! ```
//!
//! Child slots are reserved with [`UNPATCHED`] and back-patched once each
//! child has been written and its start offset is known.

use crate::buffer::BinaryBuffer;
use std::collections::BTreeMap;

pub const UNPATCHED: u32 = 0xFFFF_FFFF;

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<u8, Box<TrieNode>>,
    entry_offset: Option<u32>,
}

#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    pub fn new() -> Self { Self::default() }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Inserts `term`, marking its final node as a leaf pointing at
    /// `entry_offset`. Re-adding a term replaces its offset.
    pub fn add(&mut self, term: &str, entry_offset: u32) {
        let mut node = &mut self.root;
        for b in term.bytes() {
            node = node.children.entry(b).or_default().as_mut();
        }
        if node.entry_offset.replace(entry_offset).is_none() {
            self.len += 1;
        }
    }

    /// Writes the whole trie into `buf` and returns the root's offset, which
    /// is 0 when `buf` starts empty.
    pub fn serialize(&self, buf: &mut BinaryBuffer) -> u32 {
        serialize_node(&self.root, buf)
    }
}

fn serialize_node(node: &TrieNode, buf: &mut BinaryBuffer) -> u32 {
    let start = buf.offset();
    buf.write_u32(node.children.len() as u32);
    for label in node.children.keys() {
        buf.write_u8(*label);
    }
    let slots = buf.len();
    for _ in 0..node.children.len() {
        buf.write_u32(UNPATCHED);
    }
    match node.entry_offset {
        Some(offset) => {
            buf.write_u8(1);
            buf.write_u32(offset);
        }
        None => buf.write_u8(0),
    }
    for (i, child) in node.children.values().enumerate() {
        let child_start = serialize_node(child, buf);
        buf.write_u32_at(slots + i * 4, child_start);
    }
    start
}
