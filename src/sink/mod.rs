//! Where formatted readings end up.
//!
//! A run writes either to a durable store (one unit of work per poll cycle)
//! or to stdout. The choice is made once, when the sink is constructed.

mod console;
mod durable;

pub use console::ConsoleSink;
pub use durable::{DurableSink, RecordStore};

#[cfg(test)]
pub(crate) use durable::tests::{RecordingStore, StoreCall};

use std::future::Future;

use crate::db::Database;
use crate::error::MonitorError;
use crate::models::{FormattedRecord, SensorIdentity};

/// Receives the records of one poll cycle. No retries happen here.
pub trait ReadingSink {
    fn persist(
        &mut self,
        identity: &SensorIdentity,
        records: &[FormattedRecord],
    ) -> impl Future<Output = Result<(), MonitorError>>;
}

/// The sink selected by the settings for this run.
pub enum ConfiguredSink {
    Durable(DurableSink<Database>),
    Console(ConsoleSink),
}

impl ConfiguredSink {
    pub fn describe(&self) -> &'static str {
        match self {
            ConfiguredSink::Durable(_) => "sqlite",
            ConfiguredSink::Console(_) => "console",
        }
    }
}

impl ReadingSink for ConfiguredSink {
    async fn persist(
        &mut self,
        identity: &SensorIdentity,
        records: &[FormattedRecord],
    ) -> Result<(), MonitorError> {
        match self {
            ConfiguredSink::Durable(sink) => sink.persist(identity, records).await,
            ConfiguredSink::Console(sink) => sink.persist(identity, records).await,
        }
    }
}
