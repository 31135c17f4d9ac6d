use std::io::{self, Write};

use log::warn;

use crate::error::MonitorError;
use crate::models::{FormattedRecord, SensorIdentity, SensorRow};

use super::ReadingSink;

/// Prints every record as a six-field tuple. Used when no database is set up.
pub struct ConsoleSink<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn render(row: &SensorRow) -> String {
    format!(
        "({}, '{}', '{}', {}, '{}', {})",
        row.sensor_id,
        row.room,
        row.sensor_type,
        row.value,
        row.unit,
        row.timestamp.to_rfc3339()
    )
}

impl<W: Write> ReadingSink for ConsoleSink<W> {
    async fn persist(
        &mut self,
        identity: &SensorIdentity,
        records: &[FormattedRecord],
    ) -> Result<(), MonitorError> {
        for record in records {
            let line = render(&SensorRow::from_record(identity, record));
            // Output is best effort; a closed stdout must not stop sampling.
            if let Err(err) = writeln!(self.out, "{line}") {
                warn!("failed to print reading: {err}");
            }
        }
        if let Err(err) = self.out.flush() {
            warn!("failed to flush readings: {err}");
        }
        Ok(())
    }
}
