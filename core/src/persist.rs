use crate::{DocumentCollection, FieldIndex};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub fields: Vec<String>,
    pub created_at: String,
    pub version: u32,
}

/// Everything a scorer needs, as loaded from an index directory.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub collection: DocumentCollection,
    pub index: FieldIndex,
    pub meta: MetaFile,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn collection(&self) -> PathBuf { self.root.join("collection.bin") }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    f.write_all(bytes)?;
    Ok(())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn save_collection(paths: &IndexPaths, collection: &DocumentCollection) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bytes(&paths.collection(), &bincode::serialize(collection)?)
}

pub fn load_collection(paths: &IndexPaths) -> Result<DocumentCollection> {
    Ok(bincode::deserialize(&read_bytes(&paths.collection())?)?)
}

pub fn save_index(paths: &IndexPaths, index: &FieldIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bytes(&paths.index(), &bincode::serialize(index)?)
}

pub fn load_index(paths: &IndexPaths) -> Result<FieldIndex> {
    Ok(bincode::deserialize(&read_bytes(&paths.index())?)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    write_bytes(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn save_corpus(paths: &IndexPaths, corpus: &Corpus) -> Result<()> {
    save_collection(paths, &corpus.collection)?;
    save_index(paths, &corpus.index)?;
    save_meta(paths, &corpus.meta)
}

/// Load collection, index and meta, checking the format version and document count.
pub fn load_corpus(paths: &IndexPaths) -> Result<Corpus> {
    let meta = load_meta(paths)?;
    anyhow::ensure!(
        meta.version == FORMAT_VERSION,
        "unsupported index format version {} (expected {FORMAT_VERSION})",
        meta.version
    );
    let collection = load_collection(paths)?;
    let index = load_index(paths)?;
    anyhow::ensure!(
        collection.len() == meta.num_docs as usize,
        "meta.json lists {} documents but the collection holds {}",
        meta.num_docs,
        collection.len()
    );
    tracing::info!(num_docs = meta.num_docs, root = %paths.root.display(), "loaded corpus");
    Ok(Corpus { collection, index, meta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use tempfile::tempdir;

    fn corpus() -> Corpus {
        let mut collection = DocumentCollection::new();
        collection.insert("d1", Document::new().with_field("body", ["a", "b", "a"]));
        collection.insert("d2", Document::new().with_field("body", ["b", "b"]));
        let index = FieldIndex::from_collection(&collection);
        let meta = MetaFile { num_docs: 2, fields: vec!["body".into()], created_at: String::new(), version: FORMAT_VERSION };
        Corpus { collection, index, meta }
    }

    #[test]
    fn corpus_survives_a_save_load_cycle() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let original = corpus();
        save_corpus(&paths, &original).unwrap();
        let loaded = load_corpus(&paths).unwrap();
        assert_eq!(loaded.collection, original.collection);
        assert_eq!(loaded.index, original.index);
        assert_eq!(loaded.meta, original.meta);
    }

    #[test]
    fn rejects_mismatched_meta() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut original = corpus();
        original.meta.num_docs = 3;
        save_corpus(&paths, &original).unwrap();
        assert!(load_corpus(&paths).is_err());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("nope"));
        assert!(load_corpus(&paths).is_err());
    }
}
