pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod sensing;
pub mod settings;
pub mod sink;
mod utils;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use db::Database;
use sensing::{ConfiguredDriver, PollingLoop};
use settings::MonitorSettings;
use sink::{ConfiguredSink, ConsoleSink, DurableSink};

pub use error::MonitorError;

pub fn run() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("vpd-monitor starting up...");

    let settings = MonitorSettings::from_args_or_env(std::env::args())?;
    let (identity, config, database) = settings.into_sensor()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async move {
        let sink = match database {
            Some(database) => {
                ConfiguredSink::Durable(DurableSink::new(Database::new(database.path)?))
            }
            None => {
                warn!("No database configured, printing readings to stdout");
                ConfiguredSink::Console(ConsoleSink::new())
            }
        };
        info!("Readings go to the {} sink", sink.describe());

        let driver = ConfiguredDriver::from_settings(config.hardware());

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current cycle");
                token_clone.cancel();
            }
        });

        let mut polling = PollingLoop::new(identity, config, driver, sink);
        polling.run(cancel_token).await?;
        Ok::<(), anyhow::Error>(())
    })
}
