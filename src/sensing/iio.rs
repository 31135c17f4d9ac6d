use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::models::RawSample;

use super::driver::{DriverFault, SensorDriver};

const TEMPERATURE_CHANNEL: &str = "in_temp_input";
const HUMIDITY_CHANNEL: &str = "in_humidityrelative_input";

// Linux errno values the dht11 kernel driver reports for a bad transfer.
#[cfg(target_os = "linux")]
const EIO: i32 = 5;
#[cfg(target_os = "linux")]
const EAGAIN: i32 = 11;
#[cfg(target_os = "linux")]
const ETIMEDOUT: i32 = 110;

/// DHT11/DHT22 exposed by the Linux `dht11` IIO driver, e.g. through the
/// `dht11` device-tree overlay on a Raspberry Pi.
///
/// Both channels report thousandths: milli-degrees Celsius and milli-percent
/// relative humidity.
///
/// The kernel driver owns the GPIO line for as long as the overlay is
/// loaded, so there is nothing to request or free here. `open` checks the
/// channels exist and `close` only drops the claim, after which reads fail.
pub struct IioDht {
    device: PathBuf,
    claimed: bool,
}

impl IioDht {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            claimed: false,
        }
    }

    fn channel(&self, name: &str) -> PathBuf {
        self.device.join(name)
    }

    fn read_channel(&self, name: &str) -> Result<f64, DriverFault> {
        let path = self.channel(name);
        let raw = fs::read_to_string(&path).map_err(|err| classify_io(&path, err))?;
        let milli: i64 = raw.trim().parse().map_err(|_| {
            DriverFault::Transient(format!("unparsable value {:?} in {}", raw.trim(), path.display()))
        })?;
        Ok(milli as f64 / 1000.0)
    }
}

impl SensorDriver for IioDht {
    fn open(&mut self) -> Result<(), DriverFault> {
        if !self.device.is_dir() {
            return Err(DriverFault::Unavailable(format!(
                "IIO device {} does not exist",
                self.device.display()
            )));
        }
        for name in [TEMPERATURE_CHANNEL, HUMIDITY_CHANNEL] {
            if !self.channel(name).is_file() {
                return Err(DriverFault::Unavailable(format!(
                    "IIO device {} has no {name} channel",
                    self.device.display()
                )));
            }
        }
        self.claimed = true;
        Ok(())
    }

    fn read(&mut self) -> Result<RawSample, DriverFault> {
        if !self.claimed {
            return Err(DriverFault::Fault("IIO device read before open".into()));
        }
        let temperature = self.read_channel(TEMPERATURE_CHANNEL)?;
        let humidity = self.read_channel(HUMIDITY_CHANNEL)?;
        Ok(RawSample::new(temperature, humidity))
    }

    fn close(&mut self) {
        self.claimed = false;
    }

    fn describe(&self) -> String {
        format!("dht (iio) at {}", self.device.display())
    }
}

fn classify_io(path: &Path, err: io::Error) -> DriverFault {
    let message = format!("reading {} failed: {err}", path.display());

    if err.raw_os_error().is_some_and(is_bus_errno) {
        return DriverFault::Transient(message);
    }
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => {
            DriverFault::Transient(message)
        }
        io::ErrorKind::NotFound => DriverFault::Unavailable(message),
        _ => DriverFault::Fault(message),
    }
}

#[cfg(target_os = "linux")]
fn is_bus_errno(code: i32) -> bool {
    matches!(code, EIO | EAGAIN | ETIMEDOUT)
}

// The dht11 IIO driver only exists on Linux; elsewhere classify by kind.
#[cfg(not(target_os = "linux"))]
fn is_bus_errno(_code: i32) -> bool {
    false
}
