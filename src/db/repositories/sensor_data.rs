use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::Database;
use crate::models::SensorRow;
use crate::sink::RecordStore;

impl Database {
    /// Inserts one row, opening a unit of work first if none is pending.
    pub async fn insert_sensor_row(&self, row: SensorRow) -> Result<()> {
        self.execute(move |conn| {
            if conn.is_autocommit() {
                conn.execute_batch("BEGIN")
                    .context("failed to begin unit of work")?;
            }

            conn.execute(
                "INSERT INTO sensor_data (sensor_id, room, sensor_type, value, unit, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.sensor_id,
                    row.room,
                    row.sensor_type,
                    row.value,
                    row.unit,
                    row.timestamp.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert sensor reading")?;
            Ok(())
        })
        .await
    }

    pub async fn commit_pending(&self) -> Result<()> {
        self.execute(|conn| {
            if !conn.is_autocommit() {
                conn.execute_batch("COMMIT")
                    .context("failed to commit sensor readings")?;
            }
            Ok(())
        })
        .await
    }
}

impl RecordStore for Database {
    async fn insert(&mut self, row: SensorRow) -> Result<()> {
        self.insert_sensor_row(row).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.commit_pending().await
    }
}
