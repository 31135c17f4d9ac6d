use chrono::{DateTime, Utc};

use crate::error::MonitorError;
use crate::models::{ChannelDescriptor, FormattedRecord};

/// Pairs `values[i]` with `channels[i]`, stamping every record with the same
/// capture instant.
pub fn format_readings(
    values: &[f64],
    channels: &[ChannelDescriptor],
) -> Result<Vec<FormattedRecord>, MonitorError> {
    format_readings_at(values, channels, Utc::now())
}

pub fn format_readings_at(
    values: &[f64],
    channels: &[ChannelDescriptor],
    timestamp: DateTime<Utc>,
) -> Result<Vec<FormattedRecord>, MonitorError> {
    if values.len() != channels.len() {
        return Err(MonitorError::LengthMismatch {
            values: values.len(),
            channels: channels.len(),
        });
    }

    Ok(values
        .iter()
        .zip(channels)
        .map(|(value, channel)| FormattedRecord {
            label: channel.label.clone(),
            unit: channel.unit.clone(),
            value: *value,
            timestamp,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> Vec<ChannelDescriptor> {
        vec![
            ChannelDescriptor::new("T", "C"),
            ChannelDescriptor::new("H", "%"),
            ChannelDescriptor::new("VPD", "kPa"),
        ]
    }

    #[test]
    fn pairs_values_with_channels_by_position() {
        let records = format_readings(&[10.1, 55.2, 1.58], &channels()).unwrap();

        let tuples: Vec<(&str, &str, f64)> = records
            .iter()
            .map(|r| (r.label.as_str(), r.unit.as_str(), r.value))
            .collect();
        assert_eq!(
            tuples,
            vec![("T", "C", 10.1), ("H", "%", 55.2), ("VPD", "kPa", 1.58)]
        );
    }

    #[test]
    fn all_records_share_one_timestamp() {
        let records = format_readings(&[10.1, 55.2, 1.58], &channels()).unwrap();
        assert!(records.iter().all(|r| r.timestamp == records[0].timestamp));
    }

    #[test]
    fn uses_the_given_capture_instant() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let records = format_readings_at(&[1.0, 2.0, 3.0], &channels(), at).unwrap();
        assert!(records.iter().all(|r| r.timestamp == at));
    }

    #[test]
    fn length_mismatch_yields_no_records() {
        let err = format_readings(&[10.1, 55.2, 1.58], &channels()[..2]).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::LengthMismatch {
                values: 3,
                channels: 2
            }
        ));
    }
}
