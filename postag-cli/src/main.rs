use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use postag::corpus::{Corpus, DEFAULT_COMMENT_COLUMN};
use postag::features::extract_sentence;
use postag::get_version;
use postag::model::LinearTagger;
use postag::pipeline::{Pipeline, PipelineConfig, DEFAULT_TOP_K};
use postag::tagger::TaggerAdapter;
use postag::tokenizer::{RegexTokenizer, Tokenizer};

#[derive(Debug, Args)]
#[clap(
    author,
    about = "Extract per-token features from a text file, one sentence per line",
    version = get_version(),
)]
struct FeaturesArgs {
    input_file: PathBuf,
    features_file: PathBuf,
}

#[derive(Debug, Args)]
#[clap(author,
    about = "Tag the sentences read from stdin",
    version = get_version(),
)]
struct TagArgs {
    model_file: PathBuf,
}

#[derive(Debug, Args)]
#[clap(author,
    about = "Rank the most frequent nouns and adjectives of a comment corpus",
    version = get_version(),
)]
struct CountArgs {
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    #[arg(short = 'n', long, default_value = "1")]
    num_threads: usize,

    #[arg(short, long, default_value = DEFAULT_COMMENT_COLUMN)]
    column: String,

    model_file: PathBuf,
    corpus_file: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Features(FeaturesArgs),
    Tag(TagArgs),
    Count(CountArgs),
}

#[derive(Debug, Parser)]
#[clap(
    name = "postag",
    author,
    about = "A part-of-speech feature and frequency command line interface",
    version = get_version(),
)]
struct CommandArgs {
    #[clap(subcommand)]
    command: Commands,
}

fn load_tagger(model_file: &Path) -> Result<LinearTagger, Box<dyn Error>> {
    let mut tagger = LinearTagger::new();
    tagger.load_model(model_file)?;
    tracing::info!(
        "loaded model {} with {} labels",
        model_file.display(),
        tagger.labels().len()
    );
    Ok(tagger)
}

fn features(args: FeaturesArgs) -> Result<(), Box<dyn Error>> {
    let tokenizer = RegexTokenizer::new();
    let input = BufReader::new(File::open(&args.input_file)?);
    let mut output = io::BufWriter::new(File::create(&args.features_file)?);

    let mut sentences = 0;
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let sentence = tokenizer.tokenize(line);
        writeln!(output, "{}", serde_json::to_string(&extract_sentence(&sentence))?)?;
        sentences += 1;
    }
    output.flush()?;

    tracing::info!("extracted features for {} sentences", sentences);
    Ok(())
}

fn tag(args: TagArgs) -> Result<(), Box<dyn Error>> {
    let adapter = TaggerAdapter::new(load_tagger(&args.model_file)?);
    let tokenizer = RegexTokenizer::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut writer = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let tagged = adapter.tag_sentence(&tokenizer.tokenize(line))?;
        let pairs: Vec<String> = tagged
            .iter()
            .map(|t| format!("{}/{}", t.word, t.label))
            .collect();
        writeln!(writer, "{}", pairs.join(" "))?;
    }

    Ok(())
}

fn count(args: CountArgs) -> Result<(), Box<dyn Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        if r.load(Ordering::SeqCst) {
            r.store(false, Ordering::SeqCst);
        } else {
            std::process::exit(0);
        }
    })?;

    let tagger = load_tagger(&args.model_file)?;
    let corpus = Corpus::load(args.corpus_file.as_path(), &args.column)?;
    tracing::info!("loaded {} rows from {}", corpus.len(), args.corpus_file.display());

    let config = PipelineConfig {
        top_k: args.top_k,
        num_threads: args.num_threads.max(1),
    };
    let pipeline = Pipeline::new(RegexTokenizer::new(), tagger, config);
    let report = if pipeline.config().num_threads > 1 {
        pipeline.run_parallel(corpus.values(), &running)?
    } else {
        pipeline.run_until(corpus.values(), &running)?
    };

    if report.cancelled {
        tracing::warn!("interrupted, printing partial counts");
    }

    let output = serde_json::json!({
        "nouns": report.nouns,
        "adjectives": report.adjectives,
    });
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    serde_json::to_writer_pretty(&mut writer, &output)?;
    writeln!(writer)?;

    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = CommandArgs::parse();

    match args.command {
        Commands::Features(args) => features(args),
        Commands::Tag(args) => tag(args),
        Commands::Count(args) => count(args),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
