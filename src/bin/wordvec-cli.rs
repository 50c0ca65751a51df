//! wordvec CLI
//!
//! Loads a vocabulary and vector parts from disk, then answers queries
//! interactively.

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wordvec::ingest::{discover_vector_parts, DEFAULT_CHUNK_SIZE, VECTORS_FILE, VOCAB_FILE};
use wordvec::vector::clamp_top_k;
use wordvec::{
    progress_channel, FileSource, Loader, LoaderConfig, QueryMetrics, ScoredWord, Source,
    WordVectors,
};

const DEFAULT_TOP_K: usize = 10;

/// wordvec CLI - Nearest neighbors and analogies over word vectors
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding vocab.json and vectors.f32 (or vectors.f32.partN)
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Vocabulary file (defaults to <dir>/vocab.json)
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Vector part files, in order (defaults to parts found in <dir>)
    #[arg(long)]
    vectors: Vec<PathBuf>,

    /// Maximum vector parts read at once (0 = auto-detect)
    #[arg(long, default_value_t = 0)]
    max_concurrent_fetches: usize,

    /// Read size for vector files in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Accept vector files classified as text or markup
    #[arg(long, default_value_t = false)]
    allow_markup: bool,
}

/// A parsed REPL command
#[derive(Debug, PartialEq)]
enum Query {
    Nearest { word: String, k: usize },
    Analogy { a: String, b: String, c: String, k: usize },
    Sim { a: String, b: String },
    Has { word: String },
    Vec { word: String },
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordvec=info".parse()?))
        .init();

    let args = Args::parse();

    let vocab_path = args
        .vocab
        .clone()
        .unwrap_or_else(|| args.dir.join(VOCAB_FILE));
    let vector_paths = if args.vectors.is_empty() {
        discover_vector_parts(&args.dir)
    } else {
        args.vectors.clone()
    };
    if vector_paths.is_empty() {
        anyhow::bail!(
            "No vector files in {} (expected {} or {}.part0, {}.part1, ...)",
            args.dir.display(),
            VECTORS_FILE,
            VECTORS_FILE,
            VECTORS_FILE
        );
    }

    let config = LoaderConfig::default()
        .with_max_concurrent_fetches(args.max_concurrent_fetches)
        .with_markup_check(!args.allow_markup);

    let vocab = FileSource::new(&vocab_path);
    let parts: Vec<Arc<dyn Source>> = vector_paths
        .iter()
        .map(|p| Arc::new(FileSource::new(p).with_chunk_size(args.chunk_size)) as Arc<dyn Source>)
        .collect();

    let (report, rx) = progress_channel();
    let progress_logger = tokio::spawn(log_progress(rx));

    let loaded = Loader::new(config).load(&vocab, &parts, Some(report)).await;
    progress_logger.await?;
    let vectors = WordVectors::new(loaded?);

    info!(
        "Loaded {} words x {} dims from {} part(s)",
        vectors.len(),
        vectors.dim(),
        parts.len()
    );
    println!("Ready! Type 'help' for available commands, 'quit' to exit.\n");

    let metrics = QueryMetrics::new();

    loop {
        print!("wordvec> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }

        match parse_query(input) {
            Ok(query) => run_query(&vectors, &metrics, query),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

/// Log load progress in 10% steps
async fn log_progress(mut rx: UnboundedReceiver<f64>) {
    let mut next_step = 0u32;
    while let Some(ratio) = rx.recv().await {
        let percent = (ratio * 100.0).floor() as u32;
        if percent >= next_step {
            info!("Loading vectors: {}%", percent);
            next_step = (percent / 10 + 1) * 10;
        }
    }
}

fn parse_top_k(arg: Option<&&str>) -> anyhow::Result<usize> {
    match arg {
        Some(raw) => {
            let requested: f64 = raw
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid result count: {}", raw))?;
            Ok(clamp_top_k(requested))
        }
        None => Ok(DEFAULT_TOP_K),
    }
}

fn parse_query(input: &str) -> anyhow::Result<Query> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        anyhow::bail!("Empty command");
    }

    let cmd = parts[0].to_lowercase();

    match cmd.as_str() {
        "nearest" | "near" => {
            if parts.len() < 2 {
                anyhow::bail!("nearest requires a word: nearest <word> [k]");
            }
            Ok(Query::Nearest {
                word: parts[1].to_string(),
                k: parse_top_k(parts.get(2))?,
            })
        }

        "analogy" => {
            if parts.len() < 4 {
                anyhow::bail!("analogy requires three words: analogy <a> <b> <c> [k]");
            }
            Ok(Query::Analogy {
                a: parts[1].to_string(),
                b: parts[2].to_string(),
                c: parts[3].to_string(),
                k: parse_top_k(parts.get(4))?,
            })
        }

        "sim" | "similarity" => {
            if parts.len() < 3 {
                anyhow::bail!("sim requires two words: sim <a> <b>");
            }
            Ok(Query::Sim {
                a: parts[1].to_string(),
                b: parts[2].to_string(),
            })
        }

        "has" => {
            if parts.len() < 2 {
                anyhow::bail!("has requires a word: has <word>");
            }
            Ok(Query::Has {
                word: parts[1].to_string(),
            })
        }

        "vec" | "vector" => {
            if parts.len() < 2 {
                anyhow::bail!("vec requires a word: vec <word>");
            }
            Ok(Query::Vec {
                word: parts[1].to_string(),
            })
        }

        "stats" => Ok(Query::Stats),

        _ => anyhow::bail!("Unknown command: {}. Type 'help' for available commands.", cmd),
    }
}

fn run_query(vectors: &WordVectors, metrics: &QueryMetrics, query: Query) {
    let start = Instant::now();

    let (kind, hit) = match query {
        Query::Nearest { word, k } => {
            let results = vectors.nearest(&word, k);
            print_results(&results, &format!("'{}' is not in the vocabulary", word));
            ("nearest", !results.is_empty())
        }
        Query::Analogy { a, b, c, k } => {
            let results = vectors.analogy(&a, &b, &c, k);
            print_results(
                &results,
                &format!("one of '{}', '{}', '{}' is not in the vocabulary", a, b, c),
            );
            ("analogy", !results.is_empty())
        }
        Query::Sim { a, b } => match vectors.similarity(&a, &b) {
            Some(score) => {
                println!("{:.6}", score);
                ("sim", true)
            }
            None => {
                println!("(nil)");
                ("sim", false)
            }
        },
        Query::Has { word } => {
            let found = vectors.has(&word);
            println!("{}", found);
            ("has", found)
        }
        Query::Vec { word } => match vectors.vector_of(&word) {
            Some(v) => {
                let shown: Vec<String> = v.iter().take(8).map(|x| format!("{:.4}", x)).collect();
                let more = if v.len() > 8 { ", ..." } else { "" };
                println!("[{}{}] (dim {})", shown.join(", "), more, v.len());
                ("vec", true)
            }
            None => {
                println!("(nil)");
                ("vec", false)
            }
        },
        Query::Stats => {
            println!("{}", metrics.summary());
            let mut by_kind: Vec<_> = metrics.by_kind().into_iter().collect();
            by_kind.sort();
            for (kind, count) in by_kind {
                println!("  {:<8} {}", kind, count);
            }
            return;
        }
    };

    metrics.record(kind, start.elapsed(), hit);
}

fn print_results(results: &[ScoredWord], miss: &str) {
    if results.is_empty() {
        println!("(empty) {}", miss);
        return;
    }
    for (rank, r) in results.iter().enumerate() {
        println!("{:>3}) {:<24} {:.6}", rank + 1, r.word, r.score);
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  nearest <word> [k]          - Top-k words by dot product (default k = {})", DEFAULT_TOP_K);
    println!("  analogy <a> <b> <c> [k]     - Words completing a : b :: c : ?");
    println!("  sim <a> <b>                 - Raw dot product of two words");
    println!("  has <word>                  - Check vocabulary membership");
    println!("  vec <word>                  - Show a word's vector");
    println!("  stats                       - Query counters and latency");
    println!("  help                        - Show this help");
    println!("  quit/exit                   - Exit the CLI");
}
