//! `guji-relex` binary.

use anyhow::Result;
use guji_relex::{cli::Cli, config::Settings, logging};
use tracing::{debug, instrument};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    logging::init_tracing()?;
    let cli = Cli::parse();
    let settings = Settings::load()?;

    debug!(?cli, ?settings, "dispatching");
    cli.dispatch(settings).await
}
