use crate::error::Result;
use crate::index::{DocId, Handle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

/// Files that make up one index directory.
#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn binary_dir(&self) -> PathBuf { self.root.join("binary") }
    pub fn binary(&self) -> PathBuf { self.binary_dir().join("binary") }
    pub fn text(&self) -> PathBuf { self.root.join("text") }
    pub fn text_docs(&self) -> PathBuf { self.text().join("docs") }
    pub fn text_entries(&self) -> PathBuf { self.text().join("entries") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn doc_id_map(&self) -> PathBuf { self.root.join("doc_id_map.bin") }
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Side table from binary handles back to the ids documents were indexed
/// under. The binary index itself only knows handles.
pub fn save_doc_id_map(paths: &IndexPaths, map: &BTreeMap<Handle, DocId>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.doc_id_map())?;
    let bytes = bincode::serialize(map)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_doc_id_map(paths: &IndexPaths) -> Result<BTreeMap<Handle, DocId>> {
    let mut f = File::open(paths.doc_id_map())?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let map = bincode::deserialize(&buf)?;
    Ok(map)
}
