/// Saturation vapor pressure coefficients (Magnus-Tetens form, Pa).
const SVP_BASE_PA: f64 = 610.78;
const SVP_EXPONENT: f64 = 17.2694;
const SVP_OFFSET_C: f64 = 237.3;

/// Vapor-pressure deficit in kPa for a temperature in °C and a relative
/// humidity in percent.
///
/// Inputs are used as given. Callers that care about glitchy reads filter
/// them before getting here.
pub fn vapor_pressure_deficit(temperature: f64, humidity: f64) -> f64 {
    let saturation_pa =
        SVP_BASE_PA * (temperature / (temperature + SVP_OFFSET_C) * SVP_EXPONENT).exp();
    saturation_pa * (1.0 - humidity / 100.0) / 1000.0
}

/// Rounds to 4 decimal places.
///
/// Rounds the exact binary value rather than `value * 10^4`, so a literal
/// such as `2.00005`, stored just below the halfway point, goes down to
/// `2.0`. The scaled form would round it up.
pub fn round4(value: f64) -> f64 {
    format!("{value:.4}").parse().unwrap_or(value)
}
