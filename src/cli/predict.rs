//! CLI entry-point for single-sentence relation extraction.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{config::Settings, nlp::Pipeline};

/// Args for the `predict` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Sentence to analyse.
    #[arg(long)]
    pub text: String,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::from_settings(&settings)?;
    let facts = pipeline.extract_sentence(&args.text).await;
    info!(facts = facts.len(), "extracted relations");
    println!("{}", serde_json::to_string_pretty(&facts)?);
    Ok(())
}
