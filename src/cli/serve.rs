//! `serve`: job-control API over the configured model endpoints.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{api, config::Settings};

#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Overrides `STORAGE_ROOT` for this process.
    #[arg(long)]
    pub storage_root: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, mut settings: Settings) -> Result<()> {
    if let Some(root) = args.storage_root {
        settings.storage_root = root;
    }
    info!(
        ner = %settings.ner_url,
        relation = %settings.relation_url,
        event_relation = %settings.event_relation_url,
        storage = %settings.storage_root.display(),
        "model endpoints"
    );
    api::serve(settings, args.host, args.port).await
}
