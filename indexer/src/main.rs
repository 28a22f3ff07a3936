use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fieldrank_core::persist::{load_corpus, save_corpus, Corpus, IndexPaths, MetaFile, FORMAT_VERSION};
use fieldrank_core::tokenizer::tokenize;
use fieldrank_core::{Document, DocumentCollection, FieldIndex, ModelKind, ModelRegistry, ScoreCollection};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(flatten)]
    fields: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct ScoredDoc {
    doc_id: String,
    score: f64,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build field-aware document collections and score queries against them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the collection and field index from input JSON/JSONL files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Document fields to tokenize and index
        #[arg(long, value_delimiter = ',', default_value = "title,body")]
        fields: Vec<String>,
    },
    /// Score a query against a built index and print the best matches
    Score {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Query text, tokenized like the documents
        #[arg(long)]
        query: String,
        /// Ranking model: term_count, bm25, lm, bm25f or mlm
        #[arg(long, default_value = "bm25")]
        model: String,
        /// JSON file with an array of model configs overriding the defaults
        #[arg(long)]
        models: Option<String>,
        /// Number of results to print
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, fields } => build_index(&input, &output, &fields),
        Commands::Score { index, query, model, models, top } => {
            let registry = match models {
                Some(path) => ModelRegistry::from_json(&fs::read_to_string(&path)?)
                    .with_context(|| format!("parsing model configs in {path}"))?,
                None => ModelRegistry::new(),
            };
            let hits = score_query(&index, &query, &model, &registry, top)?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
            Ok(())
        }
    }
}

fn build_index(input: &str, output: &str, fields: &[String]) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);
    fs::create_dir_all(&out_paths.root)?;

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    anyhow::ensure!(!files.is_empty(), "no .json or .jsonl input found at {input}");
    files.sort();

    let mut collection = DocumentCollection::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            index_jsonl(&file, fields, &mut collection)?;
        } else {
            index_json(&file, fields, &mut collection)?;
        }
    }

    let index = FieldIndex::from_collection(&collection);
    let num_terms: usize = fields.iter().map(|f| index.num_terms(f)).sum();
    tracing::info!(num_docs = collection.len(), num_terms, "ingested documents");

    let meta = MetaFile {
        num_docs: collection.len() as u32,
        fields: fields.to_vec(),
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_corpus(&out_paths, &Corpus { collection, index, meta })?;

    tracing::info!(output, "index build complete");
    Ok(())
}

fn index_jsonl(file: &Path, fields: &[String], collection: &mut DocumentCollection) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line).with_context(|| format!("bad document in {}", file.display()))?;
        ingest_doc(doc, fields, collection);
    }
    Ok(())
}

fn index_json(file: &Path, fields: &[String], collection: &mut DocumentCollection) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader).with_context(|| format!("bad JSON in {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v).with_context(|| format!("bad document in {}", file.display()))?;
                ingest_doc(doc, fields, collection);
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json).with_context(|| format!("bad document in {}", file.display()))?;
            ingest_doc(doc, fields, collection);
        }
        _ => anyhow::bail!("{} holds neither a document nor an array of documents", file.display()),
    }
    Ok(())
}

fn ingest_doc(doc: InputDoc, fields: &[String], collection: &mut DocumentCollection) {
    let mut document = Document::new();
    for field in fields {
        if let Some(text) = doc.fields.get(field).and_then(field_text) {
            document = document.with_field(field, tokenize(&text));
        }
    }
    if collection.insert(doc.id.clone(), document).is_some() {
        tracing::warn!(id = %doc.id, "duplicate document id, keeping the last one");
    }
}

/// Text of a JSON field value: a string, or an array of strings joined by spaces.
fn field_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            if parts.is_empty() { None } else { Some(parts.join(" ")) }
        }
        _ => None,
    }
}

fn score_query(index_dir: &str, query: &str, model: &str, registry: &ModelRegistry, top: usize) -> Result<Vec<ScoredDoc>> {
    let corpus = load_corpus(&IndexPaths::new(index_dir))?;
    let kind: ModelKind = model.parse()?;
    let scorer = registry.get(kind).build(&corpus.collection, &corpus.index)?;
    let terms = tokenize(query);
    let scores = scorer.score_collection(&terms)?;

    let mut hits: Vec<ScoredDoc> = scores.into_iter().map(|(doc_id, score)| ScoredDoc { doc_id, score }).collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
    hits.truncate(top);
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_inputs(dir: &Path) {
        fs::write(
            dir.join("docs.jsonl"),
            concat!(
                r#"{"id": "d1", "title": "Rust ownership", "body": "Ownership and borrowing in Rust. Rust is fast."}"#, "\n",
                "\n",
                r#"{"id": "d2", "title": "Go tour", "body": "Goroutines and channels.", "tags": 3}"#, "\n",
            ),
        )
        .unwrap();
        fs::write(
            dir.join("more.json"),
            r#"[{"id": "d3", "body": ["Borrow checker", "notes"]}]"#,
        )
        .unwrap();
    }

    #[test]
    fn builds_collection_from_json_and_jsonl() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_inputs(input.path());
        let fields = vec!["title".to_string(), "body".to_string()];
        build_index(input.path().to_str().unwrap(), output.path().to_str().unwrap(), &fields).unwrap();

        let corpus = load_corpus(&IndexPaths::new(output.path())).unwrap();
        assert_eq!(corpus.collection.len(), 3);
        assert_eq!(corpus.meta.fields, fields);
        let d1 = corpus.collection.get("d1").unwrap();
        assert_eq!(d1.term_frequency("body", "rust"), 2);
        assert!(corpus.collection.get("d3").unwrap().field("title").is_none());
        assert_eq!(corpus.index.doc_frequency("body", "borrow"), 2);
    }

    #[test]
    fn scores_and_orders_hits() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_inputs(input.path());
        let fields = vec!["title".to_string(), "body".to_string()];
        let out = output.path().to_str().unwrap();
        build_index(input.path().to_str().unwrap(), out, &fields).unwrap();

        let hits = score_query(out, "rust", "term_count", &ModelRegistry::new(), 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "d1");
        assert_eq!(hits[0].score, 2.0);

        let hits = score_query(out, "borrowing", "bm25", &ModelRegistry::new(), 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(score_query(out, "rust", "pagerank", &ModelRegistry::new(), 10).is_err());
    }

    #[test]
    fn scalar_json_input_is_rejected() {
        let input = tempdir().unwrap();
        let file = input.path().join("scalar.json");
        fs::write(&file, "42").unwrap();
        let mut collection = DocumentCollection::new();
        let err = index_json(&file, &["body".to_string()], &mut collection).unwrap_err();
        assert!(err.to_string().contains("scalar.json"));
        assert!(collection.is_empty());
    }

    #[test]
    fn document_errors_name_the_file() {
        let input = tempdir().unwrap();
        let file = input.path().join("noid.json");
        fs::write(&file, r#"[{"body": "missing id"}]"#).unwrap();
        let mut collection = DocumentCollection::new();
        let err = index_json(&file, &["body".to_string()], &mut collection).unwrap_err();
        assert!(err.to_string().contains("noid.json"));
    }

    #[test]
    fn field_text_accepts_strings_and_string_arrays() {
        assert_eq!(field_text(&serde_json::json!("a b")), Some("a b".into()));
        assert_eq!(field_text(&serde_json::json!(["a", 1, "b"])), Some("a b".into()));
        assert_eq!(field_text(&serde_json::json!(42)), None);
    }
}
