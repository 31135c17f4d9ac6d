mod driver;
mod iio;
mod loop_worker;
mod session;
mod simulated;

pub use driver::{DriverFault, SensorDriver};
pub use iio::IioDht;
pub use loop_worker::{LoopStats, PollingLoop, Sleeper, TokioSleeper, RETRY_DELAY};
pub use session::{SensorSession, SessionState};
pub use simulated::SimulatedDht;

use crate::settings::HardwareSettings;

/// Driver selected by the settings for this run.
pub enum ConfiguredDriver {
    Iio(IioDht),
    Simulated(SimulatedDht),
}

impl ConfiguredDriver {
    pub fn from_settings(settings: &HardwareSettings) -> Self {
        match settings {
            HardwareSettings::Iio { device } => ConfiguredDriver::Iio(IioDht::new(device.clone())),
            HardwareSettings::Simulated { seed, glitch_rate } => {
                ConfiguredDriver::Simulated(SimulatedDht::new(*seed, *glitch_rate))
            }
        }
    }

    fn inner(&mut self) -> &mut dyn SensorDriver {
        match self {
            ConfiguredDriver::Iio(driver) => driver,
            ConfiguredDriver::Simulated(driver) => driver,
        }
    }
}

impl SensorDriver for ConfiguredDriver {
    fn open(&mut self) -> Result<(), DriverFault> {
        self.inner().open()
    }

    fn read(&mut self) -> Result<crate::models::RawSample, DriverFault> {
        self.inner().read()
    }

    fn close(&mut self) {
        self.inner().close()
    }

    fn describe(&self) -> String {
        match self {
            ConfiguredDriver::Iio(driver) => driver.describe(),
            ConfiguredDriver::Simulated(driver) => driver.describe(),
        }
    }
}
