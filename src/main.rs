//! # Student QA CLI (`sqa`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sqa init` | Create the SQLite ingestion store |
//! | `sqa sources` | Show which year files exist and how many lines they hold |
//! | `sqa ask "<question>"` | Answer a question from the knowledge base |
//! | `sqa ingest` | Load year files into the ingestion store |
//! | `sqa serve` | Start the HTTP chat server |
//!
//! Logging goes to stderr and is controlled by `SQA_LOG` (an `EnvFilter`
//! directive) or `-v`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use student_qa::assistant::{Assistant, EMPTY_QUESTION_MESSAGE};
use student_qa::models::Question;
use student_qa::{config, ingest, migrate, server, sources};

/// Student QA: answers student questions from per-year knowledge files.
#[derive(Parser)]
#[command(name = "sqa", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/sqa.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the ingestion database schema.
    ///
    /// Idempotent; running it more than once is safe.
    Init,

    /// List the per-year knowledge files and their status.
    Sources,

    /// Answer a single question and print the reply.
    Ask {
        /// The question text.
        question: String,
    },

    /// Load the year files into the ingestion store.
    ///
    /// Embeds each document when `[embedding]` is configured.
    Ingest {
        /// Show what would be ingested without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Start the HTTP chat server on `[server].bind`.
    Serve,
}

fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("SQA_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Ask { question } => {
            let Some(question) = Question::parse(Some(question.as_str())) else {
                anyhow::bail!(EMPTY_QUESTION_MESSAGE);
            };
            let answer = Assistant::from_config(&cfg).answer(&question);
            println!("{}", answer.text());
        }
        Commands::Ingest { dry_run } => {
            ingest::run_ingest(&cfg, dry_run).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
