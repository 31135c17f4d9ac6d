use thiserror::Error;

use crate::models::RawSample;

/// How a driver failed. The session turns this into a `MonitorError`.
#[derive(Debug, Error)]
pub enum DriverFault {
    /// Bus noise: checksum mismatch, missed edge, timeout. Worth retrying.
    #[error("{0}")]
    Transient(String),
    /// The device or pin cannot be claimed.
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Fault(String),
}

/// A temperature/humidity device on some bus.
pub trait SensorDriver {
    /// Claims the device.
    fn open(&mut self) -> Result<(), DriverFault>;

    /// One physical read.
    fn read(&mut self) -> Result<RawSample, DriverFault>;

    /// Gives the device back. Called at most once per successful `open`.
    fn close(&mut self);

    /// Human readable location of the device, for logs.
    fn describe(&self) -> String;
}
