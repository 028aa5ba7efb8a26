use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fts_core::config::DEFAULT_CONFIG_FILE;
use fts_core::persist::{save_doc_id_map, save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use fts_core::{
    render_results, search, BinaryIndexWriter, Config, DocId, IndexAccessor, IndexBuilder, IndexWriter,
    MappedIndex, TextIndexAccessor, TextIndexWriter,
};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    title: String,
    #[serde(default)]
    language_code: Option<String>,
}

/// One row of a books CSV export. Columns other than these are ignored.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "bookID")]
    book_id: DocId,
    title: String,
    #[serde(default)]
    language_code: Option<String>,
}

impl From<CsvRecord> for InputDoc {
    fn from(r: CsvRecord) -> Self {
        InputDoc { id: r.book_id, title: r.title, language_code: r.language_code }
    }
}

/// Language codes a CSV build keeps when no `--language` is given.
const CSV_LANGUAGES: [&str; 2] = ["eng", "en-US"];

#[derive(Parser)]
#[command(name = "fts")]
#[command(about = "Build and query an n-gram TF-IDF index", long_about = None)]
struct Cli {
    /// JSON configuration with stop_words, ngram_min_length, ngram_max_length
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Binary,
    Text,
    Both,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from input JSON/JSONL/CSV files or a directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        #[arg(long, value_enum, default_value_t = Format::Binary)]
        format: Format,
        /// Only index records with one of these language codes (repeatable)
        #[arg(long = "language")]
        languages: Vec<String>,
    },
    /// Query an index; starts an interactive prompt when no query is given
    Search {
        /// Index directory
        #[arg(long)]
        index: String,
        #[arg(long)]
        query: Option<String>,
        /// Use the text layout instead of the binary file
        #[arg(long, default_value_t = false)]
        text: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?;

    match cli.command {
        Commands::Build { input, output, format, languages } => {
            build_index(&config, &input, &output, format, &languages)
        }
        Commands::Search { index, query, text } => {
            let paths = IndexPaths::new(&index);
            if text {
                run_search(&config, &TextIndexAccessor::new(paths.text()), query.as_deref())
            } else {
                let mapped = MappedIndex::open(paths.binary())
                    .with_context(|| format!("opening {}", paths.binary().display()))?;
                run_search(&config, &mapped.accessor(), query.as_deref())
            }
        }
    }
}

fn build_index(config: &Config, input: &str, output: &str, format: Format, languages: &[String]) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl" | "csv") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("input path {input} does not exist");
    }

    let mut ingest = Ingest { config, languages, builder: IndexBuilder::new(), count: 0 };
    for file in files {
        match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => ingest.jsonl(&file)?,
            Some("csv") => ingest.csv(&file)?,
            _ => ingest.json(&file)?,
        }
    }

    let index = ingest.builder.into_index();
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "ingested documents");

    if matches!(format, Format::Text | Format::Both) {
        TextIndexWriter.write(&out_paths, &index)?;
    }
    if matches!(format, Format::Binary | Format::Both) {
        let writer = BinaryIndexWriter::new();
        let encoded = writer.encode(&index);
        writer.write_encoded(&out_paths, &encoded)?;
        save_doc_id_map(&out_paths, &encoded.doc_id_map())?;
    }

    let meta = MetaFile {
        num_docs: index.num_docs() as u32,
        num_terms: index.num_terms() as u32,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_meta(&out_paths, &meta)?;

    tracing::info!(output, "index build complete");
    Ok(())
}

struct Ingest<'a> {
    config: &'a Config,
    languages: &'a [String],
    builder: IndexBuilder,
    count: usize,
}

impl Ingest<'_> {
    fn jsonl(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() { continue; }
            let doc: InputDoc = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", file.display(), n + 1))?;
            self.add(doc);
        }
        Ok(())
    }

    fn json(&mut self, file: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(file)?);
        let json: serde_json::Value = serde_json::from_reader(reader)
            .with_context(|| format!("parsing {}", file.display()))?;
        match json {
            serde_json::Value::Array(arr) => {
                for v in arr {
                    self.add(serde_json::from_value(v)?);
                }
            }
            serde_json::Value::Object(_) => self.add(serde_json::from_value(json)?),
            _ => tracing::warn!(file = %file.display(), "skipping JSON that is neither object nor array"),
        }
        Ok(())
    }

    fn csv(&mut self, file: &Path) -> Result<()> {
        let mut reader = csv::Reader::from_path(file)
            .with_context(|| format!("opening {}", file.display()))?;
        for (n, record) in reader.deserialize::<CsvRecord>().enumerate() {
            // header is line 1
            let record = record.with_context(|| format!("{}:{}", file.display(), n + 2))?;
            self.add_filtered(record.into(), &CSV_LANGUAGES);
        }
        Ok(())
    }

    fn add(&mut self, doc: InputDoc) {
        self.add_filtered(doc, &[]);
    }

    /// `defaults` applies only when no `--language` was given.
    fn add_filtered(&mut self, doc: InputDoc, defaults: &[&str]) {
        let code = doc.language_code.as_deref();
        let accepted = if !self.languages.is_empty() {
            code.is_some_and(|l| self.languages.iter().any(|x| x == l))
        } else if !defaults.is_empty() {
            code.is_some_and(|l| defaults.contains(&l))
        } else {
            true
        };
        if !accepted { return; }
        self.builder.add_document(doc.id, &doc.title, self.config);
        self.count += 1;
        if self.count % 500 == 0 {
            tracing::info!(count = self.count, "documents indexed");
        }
    }
}

fn run_search<A: IndexAccessor + ?Sized>(config: &Config, index: &A, query: Option<&str>) -> Result<()> {
    if let Some(query) = query {
        print!("{}", render_results(&search(config, index, query)?));
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 { break; }
        let query = line.trim();
        if query == "!q" { break; }
        if query.is_empty() { continue; }
        match search(config, index, query) {
            Ok(results) => write!(stdout, "{}", render_results(&results))?,
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}
