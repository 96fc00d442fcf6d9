//! Offline evaluation of the recognizer.
//!
//! Reads labelled ink samples, recognizes each one against a reference
//! database and reports how often the expected label came out on top,
//! along with the time taken.
//!
//! # Usage
//!
//! ```bash
//! cli_demo --db refpat.bin --inputs debug/inputs.jsonl --iters 100
//! cli_demo --db refpat.json --inputs debug/inputs.jsonl --config recognizer.toml
//! ```

extern crate serde_derive;

use clap::Parser;
use log::{info, warn};
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use kanji_lookup::{LookupError, Matcher, Pattern, RecognizerConfig, ReferenceDatabase, Result};

#[derive(Parser)]
#[command(name = "cli_demo")]
#[command(about = "Measure recognition accuracy and speed over labelled ink samples")]
struct Args {
    /// Reference database; `.json` for the dataset, anything else is read as bincode
    #[arg(short, long)]
    db: PathBuf,

    /// Labelled samples, one JSON object per line
    #[arg(short, long, default_value = "debug/inputs.jsonl")]
    inputs: PathBuf,

    /// Recognizer parameters (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of passes over all samples
    #[arg(long, default_value_t = 1)]
    iters: usize,
}

#[derive(Serialize, Deserialize)]
struct Input {
    label: String,
    strokes: Vec<Vec<Vec<f64>>>,
}

struct Sample {
    label: String,
    ink: Pattern,
}

fn read_inputs(path: &Path) -> Result<Vec<Sample>> {
    let mut res: Vec<Sample> = Vec::new();
    let file = File::open(path)?;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let input: Input = serde_json::from_str(&line)?;
        match Pattern::from_nested(&input.strokes) {
            Ok(ink) => res.push(Sample {
                label: input.label,
                ink: ink,
            }),
            Err(e) => warn!("Skipping sample on line {}: {}", line_no + 1, e),
        }
    }
    Ok(res)
}

fn load_database(path: &Path) -> Result<ReferenceDatabase> {
    let file = BufReader::new(File::open(path)?);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => ReferenceDatabase::from_json_reader(file),
        _ => ReferenceDatabase::from_bincode_reader(file),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RecognizerConfig::load(path)?,
        None => RecognizerConfig::default(),
    };
    let db = load_database(&args.db)?;
    if db.is_empty() {
        return Err(LookupError::Config(format!("{} holds no reference patterns", args.db.display())));
    }
    let matcher = Matcher::with_config(&db, config)?;

    info!("Loading evaluation data from {}", args.inputs.display());
    let samples = read_inputs(&args.inputs)?;
    info!("Loaded {} inputs; starting {} cycles of evaluation", samples.len(), args.iters);

    let start = Instant::now();
    let mut guessed = 0;
    let mut attempts = 0;
    for _ in 0..args.iters {
        for sample in &samples {
            let labels = matcher.recognize(&sample.ink);
            attempts += 1;
            if labels.first() == Some(&sample.label) {
                guessed += 1;
            }
        }
    }
    let duration = start.elapsed();

    let accuracy = if attempts == 0 {
        0.0
    } else {
        guessed as f64 * 100.0 / attempts as f64
    };
    println!(
        "Finished in {:?}. Correct guesses: {} of {} ({:.1}%).",
        duration, guessed, attempts, accuracy
    );
    if attempts > 0 {
        println!("Average per lookup: {:?}", duration / attempts as u32);
    }
    Ok(())
}
