//! PAIN.001 Inspect - CLI tool listing the transactions of a single batch.

use clap::Parser;
use pain_recon::{export, logging, pain001_format::Pain001Document, report, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pain_inspect")]
#[command(about = "List references and amounts of one PAIN.001 file", long_about = None)]
struct Cli {
    /// PAIN.001 file path
    input: PathBuf,

    /// Write the Reference,Amount rows to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let document = Pain001Document::from_path(&cli.input)?;
    let file_name = cli.input.display().to_string();

    let mut stdout = io::stdout().lock();
    report::write_batch_listing(&mut stdout, &file_name, &document.batch)?;

    if let Some(ref csv_path) = cli.csv {
        let mut file = BufWriter::new(File::create(csv_path)?);
        export::write_batch_csv(&mut file, &document.batch)?;
        file.flush()?;
        writeln!(stdout, "Results exported to '{}'", csv_path.display())?;
    }

    Ok(())
}
