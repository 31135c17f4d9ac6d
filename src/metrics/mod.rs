mod format;
mod vpd;

pub use format::{format_readings, format_readings_at};
pub use vpd::{round4, vapor_pressure_deficit};
