//! Packages the JSON reference-pattern dataset into the bincode form the
//! library loads at startup.

use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use kanji_lookup::{ReferenceDatabase, Result};

#[derive(Parser)]
#[command(name = "refpat_convert")]
#[command(about = "Convert reference patterns from JSON to bincode")]
struct Args {
    /// Dataset: array of [label, stroke_count, strokes] triples
    #[arg(short, long, default_value = "./data/refpat.json")]
    input: PathBuf,

    /// Packaged output
    #[arg(short, long, default_value = "./data/refpat.bin")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let db = ReferenceDatabase::from_json_reader(BufReader::new(File::open(&args.input)?))?;
    let mut f = BufWriter::new(File::create(&args.output)?);
    db.write_bincode(&mut f)?;
    f.flush()?;
    info!(
        "Wrote {} reference patterns from {} to {}",
        db.len(),
        args.input.display(),
        args.output.display()
    );
    Ok(())
}
