use thiserror::Error;

/// Every failure the polling loop can observe, tagged by how it must react.
///
/// Only `TransientRead` is recovered locally (short delay, retry). All other
/// variants end the loop after the sensor has been released.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The driver glitched on the bus (checksum, timeout) or returned an
    /// implausible sample.
    #[error("transient sensor read error: {0}")]
    TransientRead(String),

    #[error("sensor hardware unavailable: {0}")]
    HardwareUnavailable(String),

    #[error("{values} values cannot be paired with {channels} channel descriptors")]
    LengthMismatch { values: usize, channels: usize },

    #[error("failed to persist readings: {0:#}")]
    Persistence(anyhow::Error),

    #[error("{0:#}")]
    Unclassified(anyhow::Error),
}

impl MonitorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MonitorError::TransientRead(_))
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        MonitorError::Unclassified(anyhow::anyhow!(message.into()))
    }
}
