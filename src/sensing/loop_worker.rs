use std::future::Future;

use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::MonitorError;
use crate::metrics::{format_readings, round4, vapor_pressure_deficit};
use crate::models::{RawSample, SensorConfig, SensorIdentity};
use crate::sink::ReadingSink;

use super::driver::SensorDriver;
use super::session::SensorSession;

// Set to false to silence this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Pause after a glitched read before trying again.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Where the loop waits. Swapped out in tests to observe the sleep pattern.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration) -> impl Future<Output = ()>;
}

pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub transient_retries: u64,
}

/// Read, derive, format and persist, forever.
///
/// Glitched reads are retried after `RETRY_DELAY` without waiting for the
/// next poll. Any other failure releases the sensor and is returned. A
/// cancelled token stops the loop between cycles, also releasing the sensor.
pub struct PollingLoop<D: SensorDriver, S: ReadingSink, P: Sleeper> {
    identity: SensorIdentity,
    config: SensorConfig,
    session: SensorSession<D>,
    sink: S,
    sleeper: P,
    stats: LoopStats,
}

impl<D: SensorDriver, S: ReadingSink> PollingLoop<D, S, TokioSleeper> {
    pub fn new(identity: SensorIdentity, config: SensorConfig, driver: D, sink: S) -> Self {
        Self::with_sleeper(identity, config, driver, sink, TokioSleeper)
    }
}

impl<D: SensorDriver, S: ReadingSink, P: Sleeper> PollingLoop<D, S, P> {
    pub fn with_sleeper(
        identity: SensorIdentity,
        config: SensorConfig,
        driver: D,
        sink: S,
        sleeper: P,
    ) -> Self {
        Self {
            identity,
            config,
            session: SensorSession::new(driver),
            sink,
            sleeper,
            stats: LoopStats::default(),
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), MonitorError> {
        self.session.acquire()?;
        log_info!(
            "Polling sensor {} ({}) every {}s",
            self.identity.id,
            self.identity.room,
            self.config.poll_interval().as_secs()
        );

        let outcome = self.poll(&cancel).await;
        self.session.release();

        match &outcome {
            Ok(()) => log_info!(
                "Polling stopped after {} cycles ({} transient retries)",
                self.stats.cycles,
                self.stats.transient_retries
            ),
            Err(err) => log_error!(
                "Polling aborted after {} cycles: {err}",
                self.stats.cycles
            ),
        }
        outcome
    }

    async fn poll(&mut self, cancel: &CancellationToken) -> Result<(), MonitorError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let sample = match self.session.read_raw() {
                Ok(sample) => sample,
                Err(err) if err.is_transient() => {
                    self.stats.transient_retries += 1;
                    log_warn!("{err}, retrying in {}ms", RETRY_DELAY.as_millis());
                    if !self.pause(RETRY_DELAY, cancel).await {
                        return Ok(());
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };

            self.record_cycle(sample).await?;
            self.stats.cycles += 1;

            if !self.pause(self.config.poll_interval(), cancel).await {
                return Ok(());
            }
        }
    }

    async fn record_cycle(&mut self, sample: RawSample) -> Result<(), MonitorError> {
        let temperature = round4(sample.temperature);
        let humidity = round4(sample.humidity);
        let vpd = round4(vapor_pressure_deficit(temperature, humidity));
        log_debug!("Sample: {temperature} C, {humidity} %, VPD {vpd} kPa");

        let records = format_readings(&[temperature, humidity, vpd], self.config.channels())?;
        self.sink.persist(&self.identity, &records).await
    }

    /// Returns false when cancelled while waiting.
    async fn pause(&mut self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = self.sleeper.sleep(duration) => true,
            _ = cancel.cancelled() => false,
        }
    }
}
