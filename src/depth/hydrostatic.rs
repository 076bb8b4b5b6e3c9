//! Hydrostatic pressure ↔ depth conversion.
//!
//! Assumes pressure varies linearly with water-column height:
//!
//! ```text
//! d = p / (ρ g)
//! ```
//!
//! with `p` in pascals (inputs are decibars, 1 dbar = 10⁴ Pa), fluid
//! density `ρ` chosen by salinity class, and `g = 9.8 m/s²`.

use crate::units::{self, Salinity};

/// Convert a corrected sea-pressure series (decibars) to water-column
/// height above the sensor orifice (meters).
pub fn hydrostatic_method(pressure_dbar: &[f64], salinity: Salinity) -> Vec<f64> {
    pressure_dbar
        .iter()
        .map(|&p| units::dbar_to_meters(p, salinity))
        .collect()
}

/// Inverse of [`hydrostatic_method`]: water-column height (meters) back to
/// pressure (decibars).
///
/// Used when a record arrives as a water-level series and the engine needs
/// the equivalent corrected sea pressure.
pub fn hydrostatic_pressure(depth_m: &[f64], salinity: Salinity) -> Vec<f64> {
    depth_m
        .iter()
        .map(|&d| units::meters_to_dbar(d, salinity))
        .collect()
}

/// Mean water-column height above the sensor for one pressure window.
pub fn mean_depth(pressure_dbar: &[f64], salinity: Salinity) -> f64 {
    if pressure_dbar.is_empty() {
        return 0.0;
    }
    let mean = pressure_dbar.iter().sum::<f64>() / pressure_dbar.len() as f64;
    units::dbar_to_meters(mean, salinity)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn test_round_trip_all_salinities() {
        let depths = [0.0, 0.5, 2.75, 11.2];
        for salinity in [Salinity::Salt, Salinity::Brackish, Salinity::Fresh] {
            let pressure = hydrostatic_pressure(&depths, salinity);
            let back = hydrostatic_method(&pressure, salinity);
            for (orig, rec) in depths.iter().zip(back.iter()) {
                assert!(
                    (orig - rec).abs() < TOL,
                    "round trip for {:?}: {} != {}",
                    salinity,
                    orig,
                    rec
                );
            }
        }
    }

    #[test]
    fn test_fresh_water_ten_meters() {
        // 10 m of fresh water is 1000 * 9.8 * 10 Pa = 9.8 dbar.
        let p = hydrostatic_pressure(&[10.0], Salinity::Fresh);
        assert!((p[0] - 9.8).abs() < TOL);
    }

    #[test]
    fn test_mean_depth() {
        let pressure = [1.0, 2.0, 3.0];
        let d = mean_depth(&pressure, Salinity::Fresh);
        let expected = 2.0 * 1e4 / (1000.0 * 9.8);
        assert!((d - expected).abs() < TOL);
        assert_eq!(mean_depth(&[], Salinity::Salt), 0.0);
    }
}
