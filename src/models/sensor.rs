use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::settings::HardwareSettings;

/// Temperature, humidity and VPD.
pub const METRICS_PER_CYCLE: usize = 3;

/// Who is reporting. Stamped on every persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorIdentity {
    pub id: i64,
    pub room: String,
}

impl SensorIdentity {
    pub fn new(id: i64, room: impl Into<String>) -> Self {
        Self {
            id,
            room: room.into(),
        }
    }
}

/// Label and unit of one output channel, e.g. `("VPD", "kPa")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub label: String,
    pub unit: String,
}

impl ChannelDescriptor {
    pub fn new(label: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
        }
    }

    /// Fresh list on every call, in the order the loop produces values.
    pub fn defaults() -> Vec<ChannelDescriptor> {
        vec![
            ChannelDescriptor::new("Outside Temp", "C"),
            ChannelDescriptor::new("Humidity", "%"),
            ChannelDescriptor::new("VPD", "kPa"),
        ]
    }
}

/// Immutable per-sensor configuration handed to the polling loop.
#[derive(Debug, Clone)]
pub struct SensorConfig {
    hardware: HardwareSettings,
    poll_interval: Duration,
    channels: Vec<ChannelDescriptor>,
}

impl SensorConfig {
    pub fn new(
        hardware: HardwareSettings,
        poll_interval: Duration,
        channels: Vec<ChannelDescriptor>,
    ) -> Result<Self> {
        if poll_interval.is_zero() {
            bail!("poll interval must be greater than zero");
        }
        if channels.len() != METRICS_PER_CYCLE {
            bail!(
                "expected {} channel descriptors, got {}",
                METRICS_PER_CYCLE,
                channels.len()
            );
        }
        if let Some(blank) = channels.iter().position(|c| c.label.trim().is_empty()) {
            bail!("channel descriptor {blank} has an empty label");
        }

        Ok(Self {
            hardware,
            poll_interval,
            channels,
        })
    }

    pub fn hardware(&self) -> &HardwareSettings {
        &self.hardware
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_not_shared_between_configs() {
        let mut first = ChannelDescriptor::defaults();
        first[0].label = "Inside Temp".into();

        let second = ChannelDescriptor::defaults();
        assert_eq!(second[0].label, "Outside Temp");
    }

    #[test]
    fn rejects_zero_interval() {
        let result = SensorConfig::new(
            HardwareSettings::default(),
            Duration::ZERO,
            ChannelDescriptor::defaults(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_wrong_channel_count() {
        let mut channels = ChannelDescriptor::defaults();
        channels.pop();
        let result = SensorConfig::new(
            HardwareSettings::default(),
            Duration::from_secs(30),
            channels,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_blank_label() {
        let mut channels = ChannelDescriptor::defaults();
        channels[1].label = "  ".into();
        let result = SensorConfig::new(
            HardwareSettings::default(),
            Duration::from_secs(30),
            channels,
        );
        assert!(result.is_err());
    }
}
