use anyhow::anyhow;
use log::{info, warn};

use crate::error::MonitorError;
use crate::models::RawSample;

use super::driver::{DriverFault, SensorDriver};

/// Lowest temperature the VPD formula is defined for.
const MIN_PLAUSIBLE_TEMPERATURE_C: f64 = -237.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active,
    Closed,
}

/// Exclusive owner of one sensor driver.
///
/// The driver is closed exactly once, either through `release()` or when the
/// session is dropped while still active.
pub struct SensorSession<D: SensorDriver> {
    driver: D,
    state: SessionState,
}

impl<D: SensorDriver> SensorSession<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn acquire(&mut self) -> Result<(), MonitorError> {
        if self.state != SessionState::Uninitialized {
            return Err(MonitorError::unclassified(format!(
                "cannot acquire sensor in state {:?}",
                self.state
            )));
        }

        self.driver.open().map_err(|fault| match fault {
            DriverFault::Unavailable(msg) | DriverFault::Fault(msg) => {
                MonitorError::HardwareUnavailable(msg)
            }
            DriverFault::Transient(msg) => MonitorError::HardwareUnavailable(format!(
                "device did not respond while being claimed: {msg}"
            )),
        })?;

        self.state = SessionState::Active;
        info!("Sensor acquired: {}", self.driver.describe());
        Ok(())
    }

    pub fn read_raw(&mut self) -> Result<RawSample, MonitorError> {
        if self.state != SessionState::Active {
            return Err(MonitorError::unclassified(format!(
                "cannot read sensor in state {:?}",
                self.state
            )));
        }

        let sample = self.driver.read().map_err(|fault| match fault {
            DriverFault::Transient(msg) => MonitorError::TransientRead(msg),
            DriverFault::Unavailable(msg) | DriverFault::Fault(msg) => {
                MonitorError::Unclassified(anyhow!("sensor read failed: {msg}"))
            }
        })?;

        check_plausible(&sample)?;
        Ok(sample)
    }

    pub fn release(&mut self) {
        match self.state {
            SessionState::Active => {
                self.driver.close();
                info!("Sensor released: {}", self.driver.describe());
            }
            SessionState::Uninitialized => {}
            SessionState::Closed => return,
        }
        self.state = SessionState::Closed;
    }
}

impl<D: SensorDriver> Drop for SensorSession<D> {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            warn!("Sensor session dropped while active, releasing");
            self.release();
        }
    }
}

/// Glitchy DHT reads occasionally report humidity above 100 % or garbage
/// temperatures. Those are retried like any other bus noise.
fn check_plausible(sample: &RawSample) -> Result<(), MonitorError> {
    let RawSample {
        temperature,
        humidity,
    } = *sample;

    if !temperature.is_finite() || temperature <= MIN_PLAUSIBLE_TEMPERATURE_C {
        return Err(MonitorError::TransientRead(format!(
            "implausible temperature {temperature}"
        )));
    }
    if !humidity.is_finite() || !(0.0..=100.0).contains(&humidity) {
        return Err(MonitorError::TransientRead(format!(
            "implausible humidity {humidity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::Cell, collections::VecDeque, rc::Rc};

    use super::*;

    /// Scripted driver shared by the session and loop tests.
    pub(crate) struct ScriptedDriver {
        pub open_result: Option<DriverFault>,
        pub reads: VecDeque<Result<RawSample, DriverFault>>,
        pub reads_taken: Rc<Cell<usize>>,
        pub closes: Rc<Cell<usize>>,
    }

    impl ScriptedDriver {
        pub(crate) fn new(reads: Vec<Result<RawSample, DriverFault>>) -> Self {
            Self {
                open_result: None,
                reads: reads.into(),
                reads_taken: Rc::new(Cell::new(0)),
                closes: Rc::new(Cell::new(0)),
            }
        }
    }

    impl SensorDriver for ScriptedDriver {
        fn open(&mut self) -> Result<(), DriverFault> {
            match self.open_result.take() {
                Some(fault) => Err(fault),
                None => Ok(()),
            }
        }

        fn read(&mut self) -> Result<RawSample, DriverFault> {
            self.reads_taken.set(self.reads_taken.get() + 1);
            self.reads
                .pop_front()
                .unwrap_or_else(|| Err(DriverFault::Fault("script exhausted".into())))
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }

        fn describe(&self) -> String {
            "scripted".into()
        }
    }

    #[test]
    fn release_is_idempotent() {
        let driver = ScriptedDriver::new(vec![]);
        let closes = Rc::clone(&driver.closes);
        let mut session = SensorSession::new(driver);

        session.acquire().unwrap();
        session.release();
        session.release();
        session.release();

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drop_releases_active_session_once() {
        let driver = ScriptedDriver::new(vec![]);
        let closes = Rc::clone(&driver.closes);
        {
            let mut session = SensorSession::new(driver);
            session.acquire().unwrap();
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drop_after_release_does_not_close_again() {
        let driver = ScriptedDriver::new(vec![]);
        let closes = Rc::clone(&driver.closes);
        {
            let mut session = SensorSession::new(driver);
            session.acquire().unwrap();
            session.release();
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn unavailable_device_fails_acquire() {
        let mut driver = ScriptedDriver::new(vec![]);
        driver.open_result = Some(DriverFault::Unavailable("no such device".into()));
        let closes = Rc::clone(&driver.closes);
        let mut session = SensorSession::new(driver);

        let err = session.acquire().unwrap_err();
        assert!(matches!(err, MonitorError::HardwareUnavailable(_)));
        assert_eq!(session.state(), SessionState::Uninitialized);
        drop(session);
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn read_before_acquire_is_rejected() {
        let mut session = SensorSession::new(ScriptedDriver::new(vec![Ok(RawSample::new(
            20.0, 50.0,
        ))]));
        assert!(matches!(
            session.read_raw(),
            Err(MonitorError::Unclassified(_))
        ));
    }

    #[test]
    fn classifies_driver_faults() {
        let mut session = SensorSession::new(ScriptedDriver::new(vec![
            Err(DriverFault::Transient("checksum".into())),
            Err(DriverFault::Fault("bus gone".into())),
        ]));
        session.acquire().unwrap();

        assert!(session.read_raw().unwrap_err().is_transient());
        assert!(matches!(
            session.read_raw(),
            Err(MonitorError::Unclassified(_))
        ));
    }

    #[test]
    fn implausible_samples_are_transient() {
        let mut session = SensorSession::new(ScriptedDriver::new(vec![
            Ok(RawSample::new(21.0, 140.0)),
            Ok(RawSample::new(f64::NAN, 40.0)),
            Ok(RawSample::new(21.0, 40.0)),
        ]));
        session.acquire().unwrap();

        assert!(session.read_raw().unwrap_err().is_transient());
        assert!(session.read_raw().unwrap_err().is_transient());
        assert_eq!(session.read_raw().unwrap(), RawSample::new(21.0, 40.0));
    }

    #[test]
    fn cannot_reacquire_after_close() {
        let mut session = SensorSession::new(ScriptedDriver::new(vec![]));
        session.acquire().unwrap();
        session.release();
        assert!(session.acquire().is_err());
    }
}
