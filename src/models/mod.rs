pub mod reading;
pub mod sensor;

pub use reading::{FormattedRecord, RawSample, SensorRow};
pub use sensor::{ChannelDescriptor, SensorConfig, SensorIdentity, METRICS_PER_CYCLE};
