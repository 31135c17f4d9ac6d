use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::RawSample;

use super::driver::{DriverFault, SensorDriver};

const BASE_TEMPERATURE_C: f64 = 22.0;
const BASE_HUMIDITY: f64 = 55.0;

/// Drifting indoor climate with occasional checksum glitches, for running
/// the monitor on a machine without a sensor attached.
pub struct SimulatedDht {
    rng: StdRng,
    glitch_rate: f64,
    temperature: f64,
    humidity: f64,
    open: bool,
}

impl SimulatedDht {
    pub fn new(seed: Option<u64>, glitch_rate: f64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            glitch_rate: glitch_rate.clamp(0.0, 1.0),
            temperature: BASE_TEMPERATURE_C,
            humidity: BASE_HUMIDITY,
            open: false,
        }
    }
}

impl SensorDriver for SimulatedDht {
    fn open(&mut self) -> Result<(), DriverFault> {
        self.open = true;
        Ok(())
    }

    fn read(&mut self) -> Result<RawSample, DriverFault> {
        if !self.open {
            return Err(DriverFault::Fault("simulated sensor read before open".into()));
        }
        if self.rng.gen_bool(self.glitch_rate) {
            return Err(DriverFault::Transient(
                "Checksum did not validate. Try again.".into(),
            ));
        }

        // Random walk pulled back towards the baseline.
        let temperature_step: f64 = self.rng.gen_range(-0.3..=0.3);
        let humidity_step: f64 = self.rng.gen_range(-1.0..=1.0);
        self.temperature += temperature_step + (BASE_TEMPERATURE_C - self.temperature) * 0.05;
        self.humidity += humidity_step + (BASE_HUMIDITY - self.humidity) * 0.05;
        self.humidity = self.humidity.clamp(0.0, 100.0);

        // DHT sensors resolve to a tenth.
        Ok(RawSample::new(
            (self.temperature * 10.0).round() / 10.0,
            (self.humidity * 10.0).round() / 10.0,
        ))
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn describe(&self) -> String {
        format!("simulated dht (glitch rate {:.2})", self.glitch_rate)
    }
}
