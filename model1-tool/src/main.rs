//! Model1 Tool - CLI for running the translation language model scorer
//!
//! # Commands
//!
//! - `score` - Score documents of a bundle against a query
//! - `project` - Print the sparse query and document vectors
//! - `candidates` - Print a document's top scored translation candidates
//!
//! A bundle is a JSON file with `documents` (`{"id", "text"}`), `translations`
//! (`{"src", "dst", "prob"}` in word form) and optional `collection`
//! probabilities. The config is a JSON object with the extractor option names.
//!
//! # Examples
//!
//! ```bash
//! model1-tool score -b bundle.json -c config.json -q "cheap flights" --top 10
//! model1-tool candidates -b bundle.json -c config.json -d doc42
//! ```

mod bundle;
mod commands;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use model1_core::Model1Similarity;

use crate::bundle::{Bundle, load_config};
use crate::commands::{run_candidates, run_project, run_score};

#[derive(Parser)]
#[command(name = "model1-tool")]
#[command(version, about = "CLI for Model 1 translation language model scoring")]
#[command(after_help = "Use 'model1-tool <command> --help' for more information.")]
struct Cli {
    /// Path to the JSON bundle (documents + translation table)
    #[arg(short, long, global = true)]
    bundle: Option<PathBuf>,

    /// Path to the JSON extractor config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score documents against a query, best first
    Score {
        /// Query text
        #[arg(short, long)]
        query: String,

        /// Document ids to score (default: all)
        #[arg(short, long, value_delimiter = ',')]
        docs: Vec<String>,

        /// Print only the N best documents
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Print the sparse vectors whose inner product gives the score
    Project {
        /// Query text
        #[arg(short, long)]
        query: String,

        /// Document ids to project (default: all)
        #[arg(short, long, value_delimiter = ',')]
        docs: Vec<String>,
    },

    /// Print a document's top scored candidates
    Candidates {
        /// Document id
        #[arg(short, long)]
        doc: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("model1_tool=info".parse()?)
                .add_directive("model1_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let bundle_path = cli.bundle.context("--bundle is required")?;
    let config_path = cli.config.context("--config is required")?;

    let config = load_config(&config_path)?;
    let (resources, index) = Bundle::load(&bundle_path)?
        .into_resources(&config)
        .context("Failed to register bundle resources")?;
    let extractor =
        Model1Similarity::new(&resources, config).context("Failed to create extractor")?;

    let mut out = BufWriter::new(io::stdout().lock());
    match cli.command {
        Commands::Score { query, docs, top } => {
            run_score(&extractor, &index, &query, &docs, top, &mut out)?;
        }
        Commands::Project { query, docs } => {
            run_project(&extractor, &index, &query, &docs, &mut out)?;
        }
        Commands::Candidates { doc } => {
            run_candidates(&extractor, &index, &doc, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}
