//! PAIN.001 Reconcile - CLI tool for checking control sums over a folder of batches.

use clap::Parser;
use pain_recon::{
    export::{Exporter, TransactionLog},
    logging, report, FileFilter, Reconciler, ReconcilerConfig, Result,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pain_reconcile")]
#[command(about = "Compare PAIN.001 transaction totals with their declared control sums", long_about = None)]
struct Cli {
    /// Directory holding the PAIN.001 files
    input_dir: PathBuf,

    /// Report file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File-name suffix selecting the files to process (case-insensitive)
    #[arg(long, default_value = ".xml")]
    filter: String,

    /// Also process files in subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Directory for the CSV, reference and error exports
    #[arg(long = "export-dir")]
    export_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        if e.is_directory_condition() {
            println!("{}", e);
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = ReconcilerConfig::new(cli.input_dir)
        .with_filter(cli.filter.parse::<FileFilter>()?)
        .recursive(cli.recursive);
    if let Some(output) = cli.output {
        config = config.with_output(output);
    }
    if let Some(export_dir) = cli.export_dir {
        config = config.with_export_dir(export_dir);
    }

    let reconciler = Reconciler::new(config)?;

    let mut log = TransactionLog::new();
    let result = reconciler.run_with(|file_name, batch| log.record(file_name, batch))?;

    // Output based on output file or stdout
    if let Some(ref output_path) = reconciler.config().output {
        let mut file = BufWriter::new(File::create(output_path)?);
        report::write_report(&mut file, &result)?;
        file.flush()?;
        println!("Report written to '{}'", output_path.display());
    } else {
        let mut stdout = io::stdout().lock();
        report::write_report(&mut stdout, &result)?;
    }

    if let Some(ref export_dir) = reconciler.config().export_dir {
        let exporter = Exporter::new(export_dir)?;
        for path in exporter.export(&result, &log)? {
            println!("Exported '{}'", path.display());
        }
    }

    Ok(())
}
