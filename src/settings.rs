use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ChannelDescriptor, SensorConfig, SensorIdentity};

pub const CONFIG_ENV_VAR: &str = "VPD_MONITOR_CONFIG";

const DEFAULT_IIO_DEVICE: &str = "/sys/bus/iio/devices/iio:device0";

/// Which driver backs the sensor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HardwareSettings {
    /// DHT11/DHT22 bound to the Linux `dht11` IIO driver.
    Iio { device: PathBuf },
    /// Generated readings, no hardware needed.
    Simulated {
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default = "default_glitch_rate")]
        glitch_rate: f64,
    },
}

impl Default for HardwareSettings {
    fn default() -> Self {
        HardwareSettings::Iio {
            device: PathBuf::from(DEFAULT_IIO_DEVICE),
        }
    }
}

fn default_glitch_rate() -> f64 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub sensor_id: i64,
    pub room: String,
    pub hardware: HardwareSettings,
    pub poll_interval_secs: u64,
    pub channels: Vec<ChannelDescriptor>,
    /// Without a database every reading goes to stdout.
    pub database: Option<DatabaseSettings>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sensor_id: 1,
            room: "default".into(),
            hardware: HardwareSettings::default(),
            poll_interval_secs: 30,
            channels: ChannelDescriptor::defaults(),
            database: None,
        }
    }
}

impl MonitorSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    /// Settings file named by the first argument, then by
    /// `VPD_MONITOR_CONFIG`, otherwise built-in defaults.
    pub fn from_args_or_env(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let path = args
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .filter(|p| !p.is_empty());

        match path {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Splits the settings into the immutable values the loop is built from.
    pub fn into_sensor(self) -> Result<(SensorIdentity, SensorConfig, Option<DatabaseSettings>)> {
        if let HardwareSettings::Simulated { glitch_rate, .. } = &self.hardware {
            if !(0.0..=1.0).contains(glitch_rate) {
                bail!("glitch_rate must be within [0, 1], got {glitch_rate}");
            }
        }

        let config = SensorConfig::new(
            self.hardware,
            Duration::from_secs(self.poll_interval_secs),
            self.channels,
        )?;

        Ok((
            SensorIdentity::new(self.sensor_id, self.room),
            config,
            self.database,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_uses_defaults() {
        let settings: MonitorSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.poll_interval_secs, 30);
        assert_eq!(settings.channels, ChannelDescriptor::defaults());
        assert_eq!(settings.hardware, HardwareSettings::default());
        assert!(settings.database.is_none());
    }

    #[test]
    fn parses_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "sensor_id": 13,
                "room": "Mutterraum",
                "hardware": {{ "kind": "simulated", "seed": 7 }},
                "poll_interval_secs": 5,
                "database": {{ "path": "/tmp/readings.sqlite3" }}
            }}"#
        )
        .unwrap();

        let settings = MonitorSettings::load(file.path()).unwrap();
        assert_eq!(settings.sensor_id, 13);
        assert_eq!(
            settings.hardware,
            HardwareSettings::Simulated {
                seed: Some(7),
                glitch_rate: 0.1
            }
        );

        let (identity, config, database) = settings.into_sensor().unwrap();
        assert_eq!(identity, SensorIdentity::new(13, "Mutterraum"));
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(
            database,
            Some(DatabaseSettings {
                path: PathBuf::from("/tmp/readings.sqlite3")
            })
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"sensor_id\": \"thirteen\" }}").unwrap();
        assert!(MonitorSettings::load(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(MonitorSettings::load(Path::new("/nonexistent/vpd.json")).is_err());
    }

    #[test]
    fn first_argument_selects_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "room": "Greenhouse" }}"#).unwrap();
        let args = vec![
            "vpd-monitor".to_string(),
            file.path().display().to_string(),
        ];

        let settings = MonitorSettings::from_args_or_env(args.into_iter()).unwrap();
        assert_eq!(settings.room, "Greenhouse");
    }

    #[test]
    fn rejects_out_of_range_glitch_rate() {
        let settings = MonitorSettings {
            hardware: HardwareSettings::Simulated {
                seed: None,
                glitch_rate: 1.5,
            },
            ..MonitorSettings::default()
        };
        assert!(settings.into_sensor().is_err());
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let settings = MonitorSettings {
            poll_interval_secs: 0,
            ..MonitorSettings::default()
        };
        assert!(settings.into_sensor().is_err());
    }
}
