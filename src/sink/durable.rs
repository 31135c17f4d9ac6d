use std::future::Future;

use anyhow::{Context, Result};

use crate::error::MonitorError;
use crate::models::{FormattedRecord, SensorIdentity, SensorRow};

use super::ReadingSink;

/// A relational store with explicit commits.
///
/// `Database` is the SQLite implementation. A networked server (a Postgres
/// or MySQL client, say) plugs in by implementing the same two calls: rows
/// go into an open transaction and `commit` makes them visible.
pub trait RecordStore {
    /// Issues one parameterised insert inside the pending unit of work.
    fn insert(&mut self, row: SensorRow) -> impl Future<Output = Result<()>>;

    /// Commits everything inserted since the last commit.
    fn commit(&mut self) -> impl Future<Output = Result<()>>;
}

/// Writes each cycle as N inserts followed by a single commit.
///
/// The first failing statement ends the batch: the remaining inserts and the
/// commit are skipped and the error is reported as `Persistence`.
pub struct DurableSink<R: RecordStore> {
    store: R,
}

impl<R: RecordStore> DurableSink<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    async fn write_batch(
        &mut self,
        identity: &SensorIdentity,
        records: &[FormattedRecord],
    ) -> Result<()> {
        let total = records.len();
        for (index, record) in records.iter().enumerate() {
            self.store
                .insert(SensorRow::from_record(identity, record))
                .await
                .with_context(|| {
                    format!("insert {} of {total} ({}) failed", index + 1, record.label)
                })?;
        }
        self.store.commit().await.context("commit failed")
    }
}

impl<R: RecordStore> ReadingSink for DurableSink<R> {
    async fn persist(
        &mut self,
        identity: &SensorIdentity,
        records: &[FormattedRecord],
    ) -> Result<(), MonitorError> {
        self.write_batch(identity, records)
            .await
            .map_err(MonitorError::Persistence)
    }
}
