//! DocSearch CLI
//!
//! Runs the document ingestion pipeline locally: extract and chunk files,
//! and check filenames against the upload allow-list.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "docsearch",
    author = "DocSearch Team",
    version,
    about = "DocSearch - document extraction and chunking",
    long_about = "A command-line interface for the DocSearch ingestion pipeline.\n\n\
                  Use this CLI to extract text and metadata from PDF, DOCX and text\n\
                  files, preview how they will be chunked, and validate filenames."
)]
struct Cli {
    /// Configuration file; defaults and DOCSEARCH__* variables still apply
    #[arg(short, long, env = "DOCSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text, chunks and metadata from a document
    Process {
        /// Document to process
        path: PathBuf,

        /// File type tag (pdf, docx, txt); taken from the extension when omitted
        #[arg(short = 't', long = "type")]
        file_type: Option<String>,

        /// Print every chunk instead of a summary
        #[arg(long)]
        show_chunks: bool,
    },

    /// Check filenames against the allowed file types
    Validate {
        /// Filenames to check
        #[arg(required = true)]
        filenames: Vec<String>,
    },

    /// Chunk plain text from a file or standard input
    Chunk {
        /// Text file to read, or `-` for standard input
        #[arg(default_value = "-")]
        input: String,

        /// Window size in characters
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared by consecutive chunks
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so JSON output on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Process {
            path,
            file_type,
            show_chunks,
        } => commands::process::run(&config, &path, file_type.as_deref(), show_chunks, cli.format),
        Commands::Validate { filenames } => {
            commands::validate::run(&config, &filenames, cli.format)
        }
        Commands::Chunk {
            input,
            chunk_size,
            chunk_overlap,
        } => commands::chunk::run(&config, &input, chunk_size, chunk_overlap, cli.format),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            if cli.verbose {
                for cause in e.chain().skip(1) {
                    eprintln!("{}: {}", "Caused by".yellow(), cause);
                }
            }
            ExitCode::FAILURE
        }
    }
}
