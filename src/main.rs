use anyhow::Result;
use crabgate::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file before anything else (silently ignore if missing)
    dotenvy::dotenv().ok();

    logging::init()?;

    cli::run().await
}
