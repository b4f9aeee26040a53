//! Command-line interface wiring for guji-relex.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Settings;

pub mod extract;
pub mod predict;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Entity and relation extraction over classical corpora", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::run(args, settings).await,
            Commands::Extract(args) => extract::run(args, settings).await,
            Commands::Predict(args) => predict::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the JSON job-control API.
    Serve(serve::Args),
    /// Run analysis jobs over stored corpora and wait for the results.
    Extract(extract::Args),
    /// Extract relations from a single sentence.
    Predict(predict::Args),
}

/// Which corpus analysis to run.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExtractKind {
    /// Entity-pair relation extraction.
    Relation,
    /// Event-relation identification between trigger words.
    Event,
    /// Named-entity recognition only.
    Ner,
}
