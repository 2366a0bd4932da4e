mod config;
mod counter;
mod display;
mod feedback;
mod keys;
mod messages;
mod state;
mod store;
mod tally;

use config::Config;
use store::JsonFileStore;

use anyhow::{Result, bail};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mode = std::env::args().nth(1);

    let config = Config::load()?;
    config.validate()?;

    let store = Box::new(JsonFileStore::open(config.store_path()?)?);

    match mode.as_deref() {
        Some("counter") => {
            tracing::info!("Starting rekap tally counter");
            counter::run(config, store).await
        }
        Some("display") => {
            tracing::info!("Starting rekap public display");
            display::run(config, store).await
        }
        _ => bail!("Usage: rekap <counter|display>"),
    }
}
