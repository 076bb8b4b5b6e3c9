//! Physical constants, unit conversions, and display-time helpers.
//!
//! Everything in this module is a pure function over plain values: fluid
//! densities keyed by salinity class, the hydrostatic pressure/depth scale,
//! unit factors for reporting in feet or mph, and epoch-millisecond to
//! datetime conversion for labeling output.
//!
//! # Conventions
//!
//! - Pressure is measured in decibars (the native unit of the submerged
//!   sensors), depth and elevation in meters, time in UTC epoch milliseconds.
//! - Timezone and daylight-saving adjustment affect display only; all
//!   computation happens on the UTC millisecond axis.

use chrono::{DateTime, FixedOffset, Utc};

/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.8;

/// Density of salt water (> 30 ppt) in kg/m³.
pub const SALT_WATER_DENSITY: f64 = 1027.0;

/// Density of brackish water (0.5 – 30 ppt) in kg/m³.
pub const BRACKISH_WATER_DENSITY: f64 = 1015.0;

/// Density of fresh water in kg/m³.
pub const FRESH_WATER_DENSITY: f64 = 1000.0;

/// Pascals per decibar.
pub const DBAR_TO_PASCAL: f64 = 10_000.0;

/// Feet per meter.
pub const METER_TO_FEET: f64 = 3.28084;

/// Miles per hour per meter per second.
pub const METERS_PER_SECOND_TO_MILES_PER_HOUR: f64 = 2.236_94;

/// Salinity class of the deployment site.
///
/// Selects the fluid density used by the hydrostatic pressure/depth
/// conversion. The three classes match the deployment-file labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Salinity {
    /// Salt water, > 30 ppt.
    Salt,
    /// Brackish water, 0.5 – 30 ppt.
    Brackish,
    /// Fresh water.
    Fresh,
}

impl Salinity {
    /// Fluid density for this class in kg/m³.
    #[inline]
    pub fn density(self) -> f64 {
        match self {
            Salinity::Salt => SALT_WATER_DENSITY,
            Salinity::Brackish => BRACKISH_WATER_DENSITY,
            Salinity::Fresh => FRESH_WATER_DENSITY,
        }
    }

    /// Parse a salinity class from a deployment-file label.
    ///
    /// Recognizes the verbose metadata labels ("Salt Water (> 30 ppt)",
    /// "Brackish Water (.5 - 30 ppt)") as well as the short forms
    /// ("salt", "brackish"). Anything else is treated as fresh water,
    /// matching the source metadata convention.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        if lower.starts_with("salt") {
            Salinity::Salt
        } else if lower.starts_with("brackish") {
            Salinity::Brackish
        } else {
            Salinity::Fresh
        }
    }
}

/// Convert pressure in decibars to water-column height in meters.
#[inline]
pub fn dbar_to_meters(pressure_dbar: f64, salinity: Salinity) -> f64 {
    pressure_dbar * DBAR_TO_PASCAL / (salinity.density() * GRAVITY)
}

/// Convert water-column height in meters to pressure in decibars.
#[inline]
pub fn meters_to_dbar(depth_m: f64, salinity: Salinity) -> f64 {
    depth_m * salinity.density() * GRAVITY / DBAR_TO_PASCAL
}

/// Known pressure-instrument level accuracies in meters, by make.
///
/// Fallback table for deployments whose files carry an instrument make but
/// no explicit `instrument_level_accuracy_in_meters` attribute.
pub fn instrument_level_accuracy(make: &str) -> Option<f64> {
    match make {
        "TruBlue" | "Level TROLL" => Some(0.010_668_0),
        "Hobo" => Some(0.021_336_0),
        "RBR Solo" => Some(0.05),
        _ => None,
    }
}

/// Display timezone for labeling output.
///
/// Offsets are fixed per zone; daylight saving is applied as a flat
/// one-hour shift when requested. Display-only: no computation depends
/// on these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timezone {
    Gmt,
    Eastern,
    Central,
    Mountain,
    Pacific,
}

impl Timezone {
    /// Offset from UTC in hours, before any daylight adjustment.
    pub fn utc_offset_hours(self) -> i32 {
        match self {
            Timezone::Gmt => 0,
            Timezone::Eastern => -5,
            Timezone::Central => -6,
            Timezone::Mountain => -7,
            Timezone::Pacific => -8,
        }
    }
}

/// Convert a UTC epoch-millisecond stamp to a UTC datetime.
///
/// Returns `None` only for stamps outside chrono's representable range.
pub fn ms_to_datetime(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms)
}

/// Shift a UTC datetime into a display timezone.
///
/// GMT never observes daylight saving; every other zone gains one hour
/// when `daylight_savings` is set.
pub fn adjust_from_gmt(
    datetime: DateTime<Utc>,
    timezone: Timezone,
    daylight_savings: bool,
) -> DateTime<FixedOffset> {
    let mut hours = timezone.utc_offset_hours();
    if daylight_savings && timezone != Timezone::Gmt {
        hours += 1;
    }
    // Offsets are whole hours in (-24, 24), always representable.
    let offset = FixedOffset::east_opt(hours * 3600).expect("offset within ±24h");
    datetime.with_timezone(&offset)
}

/// Wind speed in m/s from eastward/northward components.
pub fn wind_speed(u: &[f64], v: &[f64]) -> Vec<f64> {
    u.iter()
        .zip(v.iter())
        .map(|(&x, &y)| (x * x + y * y).sqrt())
        .collect()
}

/// Wind speed in mph from eastward/northward components.
pub fn wind_speed_mph(u: &[f64], v: &[f64]) -> Vec<f64> {
    wind_speed(u, v)
        .into_iter()
        .map(|s| s * METERS_PER_SECOND_TO_MILES_PER_HOUR)
        .collect()
}
