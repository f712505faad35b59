//! Display formatting shared by report sections and file naming.
//!
//! All helpers are total: they never fail, and non-finite inputs render as zero.

use chrono::{DateTime, TimeZone};

/// Formats a percentage with one decimal place and a trailing `%`.
///
/// Non-finite values render as `0.0%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", to_fixed(value, 1))
}

/// Formats a minute count as `"{hours}H {minutes}M"`.
///
/// Negative counts are treated as zero.
pub fn format_minutes(total_minutes: i64) -> String {
    let total = total_minutes.max(0);
    format!("{}H {}M", total / 60, total % 60)
}

/// Formats a second count as `"{hours}H {minutes}M"`, dropping leftover seconds.
pub fn format_seconds(total_seconds: f64) -> String {
    let secs = finite_or_zero(total_seconds).max(0.0).floor() as i64;
    format!("{}H {}M", secs / 3600, (secs % 3600) / 60)
}

/// Formats a score rounded to a whole number; halves round away from zero.
pub fn format_whole(value: f64) -> String {
    to_fixed(value, 0)
}

/// Wall-clock time of day, `HH:MM:SS`.
pub fn format_clock<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H:%M:%S").to_string()
}

/// Timestamp printed in report mastheads and footers, `YYYY-MM-DD HH:MM:SS`.
pub fn format_audit_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Audit identifier derived from the generation time, `LG-AUDIT-yyMMddHHmmss`.
pub fn format_audit_id<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("LG-AUDIT-{}", at.format("%y%m%d%H%M%S"))
}

/// Timestamp segment used in generated file names, `YYYY-MM-DD_HH-mm`.
pub fn format_file_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d_%H-%M").to_string()
}

/// Fixed-point rendering where exact decimal ties round away from zero.
///
/// `format!` rounds ties to even, so `12.5` would print as `12`. Only values
/// whose binary expansion lands exactly on a tie are affected: `0.35` is
/// really `0.3499...` and still rounds down.
fn to_fixed(value: f64, decimals: u32) -> String {
    let value = finite_or_zero(value);
    let precision = decimals as usize;
    let magnitude = value.abs();
    let frac = magnitude.fract();

    // A tie needs a fraction that is a multiple of 2^-(decimals + 1); both
    // products below are then exact.
    let halves = frac * f64::from(2u32.pow(decimals + 1));
    let scale = 10u64.pow(decimals);
    let scaled = frac * scale as f64;
    if halves.fract() != 0.0 || scaled.fract() != 0.5 {
        return format!("{:.*}", precision, value);
    }

    // A fractional part means the magnitude is below 2^52.
    let mut whole = magnitude.trunc() as u64;
    let mut digits = scaled.trunc() as u64 + 1;
    if digits == scale {
        whole += 1;
        digits = 0;
    }
    let sign = if value < 0.0 { "-" } else { "" };
    if precision == 0 {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{:0width$}", sign, whole, digits, width = precision)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
