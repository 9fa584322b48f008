//! leakmerge CLI - Consolidate machine CSV exports into one spreadsheet
//!
//! # Main Commands
//!
//! ```bash
//! leakmerge serve                        # Start HTTP server (port 3000)
//! leakmerge consolidate a.csv b.csv      # Merge exports into the XLSX artifact
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! leakmerge parse input.csv              # Parse one export and dump JSON rows
//! ```

use clap::{Parser, Subcommand};
use leakmerge::export::ARTIFACT_FILENAME;
use leakmerge::{normalize, parse_export, run, ExportOutcome, FileInput};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "leakmerge")]
#[command(about = "Consolidate leak-test machine CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge machine exports into the consolidated XLSX artifact
    Consolidate {
        /// Input CSV files, processed in the given order
        files: Vec<PathBuf>,

        /// Output path (default: datos_consolidados_analisis.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse one export and dump its rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Consolidate { files, output } => cmd_consolidate(&files, output.as_deref()),
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),
        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_consolidate(
    files: &[PathBuf],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return Err("no input files given".into());
    }

    let mut inputs = Vec::with_capacity(files.len());
    for path in files {
        match fs::read(path) {
            Ok(bytes) => inputs.push(FileInput::new(path.display().to_string(), bytes)),
            Err(e) => eprintln!("Skipping {}: {}", path.display(), e),
        }
    }

    let report = run(inputs)?;

    eprintln!();
    eprintln!("Files:");
    for outcome in &report.files {
        match &outcome.error {
            None => eprintln!("   {} - {} rows", outcome.file, outcome.rows),
            Some(reason) => eprintln!("   {} - FAILED: {}", outcome.file, reason),
        }
    }
    eprintln!("Consolidated rows: {}", report.table.rows.len());
    if let Some(reason) = &report.derivations.decimal_error {
        eprintln!("DECIMAL skipped: {}", reason);
    }
    if let ExportOutcome::Plain { reason } = &report.export {
        eprintln!("Plain export fallback: {}", reason);
    }

    let out_path = output.unwrap_or_else(|| Path::new(ARTIFACT_FILENAME));
    fs::write(out_path, &report.artifact)?;
    eprintln!("Artifact written to: {}", out_path.display());

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing: {}", input.display());

    let bytes = fs::read(input)?;
    let mut set = parse_export(&input.display().to_string(), &bytes)?;
    normalize(&mut set);

    eprintln!("   Columns: {}", set.columns.join(", "));
    eprintln!("   Rows: {}", set.rows.len());

    let json = serde_json::to_string_pretty(&set.rows)?;
    match output {
        Some(p) => {
            fs::write(p, &json)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    leakmerge::server::start_server(port).await
}
