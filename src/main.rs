mod app;
mod classifier;
mod config;
mod domain;
mod infrastructure;
mod sms;
#[cfg(test)]
mod testing;
mod web_content;

use anyhow::Result;
use infrastructure::{directories, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;
    logging::install_panic_hook();

    match app::run(config).await? {
        app::StopReason::Notified => tracing::info!("course monitor finished"),
        app::StopReason::Interrupted => tracing::info!("course monitor stopped by operator"),
    }
    Ok(())
}
