//! Power spectra and windowed wave statistics.
//!
//! [`power_spectrum`] estimates a band-averaged, depth-corrected elevation
//! spectrum with 90% chi-square confidence bounds for one analysis window;
//! [`SpectralAnalysis`] turns spectra into wave height and period
//! statistics; [`SpectralAnalysis::derive_statistics`] runs the whole
//! record's chunks and produces the triplicate statistics dictionaries
//! (central estimate, upper bound, lower bound) consumed by the writers.

mod psd;
mod stats;

pub use psd::{
    power_spectrum, PowerSpectrum, BAND_AVERAGING, DEGREES_OF_FREEDOM, SPECTRUM_LOWER_SCALE,
    SPECTRUM_UPPER_SCALE,
};
pub use stats::{
    SpectralAnalysis, AVERAGE_HEIGHT_COEF, MAXIMUM_TO_SIGNIFICANT, MEDIAN_HEIGHT_COEF,
    ONE_PERCENT_HEIGHT_COEF, RMS_HEIGHT_COEF, SIGNIFICANT_HEIGHT_COEF, TEN_PERCENT_HEIGHT_COEF,
};

use std::collections::BTreeMap;

use crate::chunk::Chunk;
use crate::depth::mean_depth;
use crate::units::Salinity;

/// Height statistics, computed from m₀ and bounded by the confidence
/// spectra plus instrument error.
pub const HEIGHT_STATISTICS: [&str; 7] =
    ["H1/3", "H10%", "H1%", "RMS", "Median", "Maximum", "Average"];

/// Period statistics, computed from moment ratios or the spectral peak.
/// Their upper/lower entries repeat the central estimate.
pub const PERIOD_STATISTICS: [&str; 4] =
    ["Average Z Cross", "Mean Wave Period", "Crest", "Peak Wave"];

/// Mapping from statistic name to one value per chunk.
pub type StatDictionary = BTreeMap<&'static str, Vec<f64>>;

/// Wave statistics for a whole record, one entry per analysis window.
#[derive(Clone, Debug, Default)]
pub struct WaveStatistics {
    /// Window center times in UTC epoch milliseconds.
    pub time_ms: Vec<f64>,
    /// Band frequencies per window.
    pub frequency: Vec<Vec<f64>>,
    /// Elevation PSD per window, m²/Hz.
    pub spectrum: Vec<Vec<f64>>,
    /// Upper 90% confidence spectrum per window.
    pub high_spectrum: Vec<Vec<f64>>,
    /// Lower 90% confidence spectrum per window.
    pub low_spectrum: Vec<Vec<f64>>,
    /// Central estimates.
    pub central: StatDictionary,
    /// Upper confidence bounds.
    pub upper: StatDictionary,
    /// Lower confidence bounds.
    pub lower: StatDictionary,
}

impl WaveStatistics {
    /// Number of analysis windows covered.
    pub fn len(&self) -> usize {
        self.time_ms.len()
    }

    /// True when the record was too short for a single window.
    pub fn is_empty(&self) -> bool {
        self.time_ms.is_empty()
    }
}

type StatFn = fn(&SpectralAnalysis, &PowerSpectrum, &[f64]) -> f64;

const HEIGHT_FNS: [(&str, StatFn); 7] = [
    ("H1/3", SpectralAnalysis::significant_wave_height),
    ("H10%", SpectralAnalysis::ten_percent_wave_height),
    ("H1%", SpectralAnalysis::one_percent_wave_height),
    ("RMS", SpectralAnalysis::rms_wave_height),
    ("Median", SpectralAnalysis::median_wave_height),
    ("Maximum", SpectralAnalysis::maximum_wave_height),
    ("Average", SpectralAnalysis::average_wave_height),
];

const PERIOD_FNS: [(&str, StatFn); 4] = [
    ("Average Z Cross", SpectralAnalysis::average_zero_crossing_period),
    ("Mean Wave Period", SpectralAnalysis::mean_wave_period),
    ("Crest", SpectralAnalysis::crest_wave_period),
    ("Peak Wave", SpectralAnalysis::peak_wave_period),
];

impl SpectralAnalysis {
    /// Derive the per-chunk statistics dictionaries for a record.
    ///
    /// Heights are computed in meters from the central/upper/lower spectra,
    /// widened by ± `instrument_error_m` (the combined sea and air sensor
    /// accuracy) after the spectral confidence adjustment, then scaled by
    /// `unit_scale` (1 for meters, the feet factor otherwise). Period
    /// bounds repeat the central estimate. Any NaN sample in a chunk makes
    /// every statistic of that chunk NaN.
    pub fn derive_statistics(
        &self,
        chunks: &[Chunk],
        instrument_error_m: f64,
        unit_scale: f64,
        salinity: Salinity,
    ) -> WaveStatistics {
        let mut result = WaveStatistics::default();
        for name in HEIGHT_STATISTICS.into_iter().chain(PERIOD_STATISTICS) {
            result.central.insert(name, Vec::with_capacity(chunks.len()));
            result.upper.insert(name, Vec::with_capacity(chunks.len()));
            result.lower.insert(name, Vec::with_capacity(chunks.len()));
        }

        for chunk in chunks {
            let center =
                chunk.time_s.iter().sum::<f64>() / chunk.time_s.len().max(1) as f64 * 1000.0;
            result.time_ms.push(center);

            let instrument_height =
                (chunk.land_surface_elevation - chunk.sensor_orifice_elevation).abs();
            let water_depth = mean_depth(&chunk.pressure_dbar, salinity) + instrument_height;

            let ps = power_spectrum(
                &chunk.pressure_dbar,
                chunk.dt(),
                instrument_height,
                water_depth,
                salinity,
            );
            let nan = chunk.has_nan();

            for (name, stat) in HEIGHT_FNS {
                let (central, upper, lower) = if nan {
                    (f64::NAN, f64::NAN, f64::NAN)
                } else {
                    (
                        stat(self, &ps, &ps.spectrum) * unit_scale,
                        (stat(self, &ps, &ps.upper) + instrument_error_m) * unit_scale,
                        (stat(self, &ps, &ps.lower) - instrument_error_m) * unit_scale,
                    )
                };
                push(&mut result, name, central, upper, lower);
            }

            for (name, stat) in PERIOD_FNS {
                let central = if nan {
                    f64::NAN
                } else {
                    stat(self, &ps, &ps.spectrum)
                };
                push(&mut result, name, central, central, central);
            }

            result.frequency.push(ps.frequency);
            result.spectrum.push(ps.spectrum);
            result.high_spectrum.push(ps.upper);
            result.low_spectrum.push(ps.lower);
        }

        result
    }
}

fn push(result: &mut WaveStatistics, name: &'static str, central: f64, upper: f64, lower: f64) {
    // Dictionaries are pre-seeded with every statistic name.
    if let Some(v) = result.central.get_mut(name) {
        v.push(central);
    }
    if let Some(v) = result.upper.get_mut(name) {
        v.push(upper);
    }
    if let Some(v) = result.lower.get_mut(name) {
        v.push(lower);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunker, CHUNK_LENGTH};
    use std::f64::consts::PI;

    fn make_chunks(n: usize, inject_nan: bool) -> Vec<Chunk> {
        let time_ms: Vec<f64> = (0..n).map(|i| i as f64 * 250.0).collect();
        let mut pressure: Vec<f64> = (0..n)
            .map(|i| 10.0 + 0.3 * (2.0 * PI * 0.15 * i as f64 * 0.25).sin())
            .collect();
        if inject_nan {
            pressure[CHUNK_LENGTH / 2] = f64::NAN;
        }
        let land = vec![-2.0; n];
        let orifice = vec![-1.0; n];
        Chunker::new(&time_ms, &pressure, &land, &orifice, None).collect()
    }

    #[test]
    fn test_triplicate_shape() {
        let chunks = make_chunks(10_240, false);
        let stats = SpectralAnalysis::default().derive_statistics(&chunks, 0.02, 1.0, Salinity::Salt);

        assert_eq!(stats.len(), 4);
        for name in HEIGHT_STATISTICS.iter().chain(PERIOD_STATISTICS.iter()) {
            assert_eq!(stats.central[name].len(), 4, "{} central", name);
            assert_eq!(stats.upper[name].len(), 4, "{} upper", name);
            assert_eq!(stats.lower[name].len(), 4, "{} lower", name);
        }
        assert_eq!(stats.frequency.len(), 4);
        assert_eq!(stats.spectrum.len(), 4);
    }

    #[test]
    fn test_height_bounds_ordered_after_instrument_widening() {
        let chunks = make_chunks(10_240, false);
        let stats = SpectralAnalysis::default().derive_statistics(&chunks, 0.05, 1.0, Salinity::Salt);

        for name in HEIGHT_STATISTICS {
            for i in 0..stats.len() {
                let lower = stats.lower[name][i];
                let central = stats.central[name][i];
                let upper = stats.upper[name][i];
                assert!(
                    lower <= central && central <= upper,
                    "{} chunk {}: {} <= {} <= {} violated",
                    name,
                    i,
                    lower,
                    central,
                    upper
                );
            }
        }
    }

    #[test]
    fn test_period_bounds_repeat_central() {
        let chunks = make_chunks(8192, false);
        let stats = SpectralAnalysis::default().derive_statistics(&chunks, 0.02, 1.0, Salinity::Salt);
        for name in PERIOD_STATISTICS {
            assert_eq!(stats.central[name], stats.upper[name], "{} upper", name);
            assert_eq!(stats.central[name], stats.lower[name], "{} lower", name);
        }
    }

    #[test]
    fn test_nan_chunk_poisons_all_statistics() {
        let chunks = make_chunks(10_240, true);
        let stats = SpectralAnalysis::default().derive_statistics(&chunks, 0.02, 1.0, Salinity::Salt);

        // The NaN lands in the first window (and the second, via overlap).
        for name in HEIGHT_STATISTICS.iter().chain(PERIOD_STATISTICS.iter()) {
            assert!(stats.central[name][0].is_nan(), "{} should be NaN", name);
            assert!(stats.upper[name][0].is_nan());
            assert!(stats.lower[name][0].is_nan());
            // Later windows are clean.
            assert!(!stats.central[name][3].is_nan(), "{} chunk 3 poisoned", name);
        }
    }

    #[test]
    fn test_unit_scale_applies_to_heights_not_periods() {
        let chunks = make_chunks(8192, false);
        let analysis = SpectralAnalysis::default();
        let meters = analysis.derive_statistics(&chunks, 0.0, 1.0, Salinity::Salt);
        let feet = analysis.derive_statistics(&chunks, 0.0, crate::units::METER_TO_FEET, Salinity::Salt);

        for i in 0..meters.len() {
            let ratio = feet.central["H1/3"][i] / meters.central["H1/3"][i];
            assert!((ratio - crate::units::METER_TO_FEET).abs() < 1e-9);
            assert!(
                (feet.central["Peak Wave"][i] - meters.central["Peak Wave"][i]).abs() < 1e-12,
                "periods must not be unit-scaled"
            );
        }
    }
}
