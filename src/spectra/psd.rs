//! Band-averaged power spectral density with chi-square confidence bounds.
//!
//! One analysis window becomes one spectrum:
//!
//! 1. The pressure window is mean-removed and converted hydrostatically to
//!    elevation, then transformed with an FFT into a one-sided raw
//!    periodogram (units m²/Hz).
//! 2. Sixteen adjacent raw estimates are averaged per band. Each raw
//!    estimate carries 2 degrees of freedom, so every band has 32.
//! 3. Each band is divided by the squared pressure response factor to
//!    recover the surface-elevation spectrum from the at-depth signal.
//! 4. Upper and lower spectra come from the chi-square 90% interval for a
//!    32-DOF spectral estimate: `ν S / χ²₀.₀₅` and `ν S / χ²₀.₉₅`.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::depth::{dispersion_wavenumber, pressure_response_factor, KP_MINIMUM};
use crate::units::{self, Salinity};

/// Adjacent raw spectral estimates averaged per band.
pub const BAND_AVERAGING: usize = 16;

/// Degrees of freedom per band-averaged estimate (2 per raw estimate).
pub const DEGREES_OF_FREEDOM: f64 = 2.0 * BAND_AVERAGING as f64;

/// χ² quantiles for 32 degrees of freedom bounding the 90% interval.
const CHI2_32_AT_05: f64 = 20.071_773;
const CHI2_32_AT_95: f64 = 46.194_260;

/// Multiplier taking a band estimate to its upper 90% bound (≈ 1.594).
pub const SPECTRUM_UPPER_SCALE: f64 = DEGREES_OF_FREEDOM / CHI2_32_AT_05;

/// Multiplier taking a band estimate to its lower 90% bound (≈ 0.693).
pub const SPECTRUM_LOWER_SCALE: f64 = DEGREES_OF_FREEDOM / CHI2_32_AT_95;

/// Band-averaged, depth-corrected elevation spectrum for one window.
#[derive(Clone, Debug)]
pub struct PowerSpectrum {
    /// Band center frequencies in Hz, uniformly spaced.
    pub frequency: Vec<f64>,
    /// Power spectral density in m²/Hz.
    pub spectrum: Vec<f64>,
    /// Upper 90% confidence spectrum.
    pub upper: Vec<f64>,
    /// Lower 90% confidence spectrum.
    pub lower: Vec<f64>,
}

impl PowerSpectrum {
    /// Frequency spacing between bands in Hz.
    pub fn df(&self) -> f64 {
        if self.frequency.len() < 2 {
            0.0
        } else {
            self.frequency[1] - self.frequency[0]
        }
    }
}

/// Compute the elevation power spectrum of one pressure window.
///
/// `instrument_height` is the sensor orifice height above the bed and
/// `water_depth` the mean total depth over the window; together they set
/// the pressure response correction. NaN samples propagate: a window with
/// any NaN produces an all-NaN spectrum.
pub fn power_spectrum(
    pressure_dbar: &[f64],
    dt: f64,
    instrument_height: f64,
    water_depth: f64,
    salinity: Salinity,
) -> PowerSpectrum {
    let n = pressure_dbar.len();
    let half = n / 2;
    let n_bands = half / BAND_AVERAGING;
    if n < 2 || dt <= 0.0 || n_bands == 0 {
        return PowerSpectrum {
            frequency: Vec::new(),
            spectrum: Vec::new(),
            upper: Vec::new(),
            lower: Vec::new(),
        };
    }

    let mean = pressure_dbar.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex<f64>> = pressure_dbar
        .iter()
        .map(|&p| Complex::new(units::dbar_to_meters(p - mean, salinity), 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    // One-sided raw periodogram, DC excluded. The Nyquist bin (j = n/2,
    // present for even n) has no mirror and is not doubled.
    let bin_df = 1.0 / (n as f64 * dt);
    let raw = |j: usize| {
        let fold = if n % 2 == 0 && j == half { 1.0 } else { 2.0 };
        fold * dt / n as f64 * buffer[j].norm_sqr()
    };

    let mut frequency = Vec::with_capacity(n_bands);
    let mut spectrum = Vec::with_capacity(n_bands);
    for band in 0..n_bands {
        let first = band * BAND_AVERAGING + 1;
        let mut f_sum = 0.0;
        let mut s_sum = 0.0;
        for j in first..first + BAND_AVERAGING {
            f_sum += j as f64 * bin_df;
            s_sum += raw(j);
        }
        let f_band = f_sum / BAND_AVERAGING as f64;
        let mut s_band = s_sum / BAND_AVERAGING as f64;

        // Depth correction: divide by Kp² to go from at-depth pressure
        // signal to surface elevation, with the amplification floor.
        let omega = 2.0 * std::f64::consts::PI * f_band;
        let k = dispersion_wavenumber(omega, water_depth);
        let kp = pressure_response_factor(k, instrument_height, water_depth).max(KP_MINIMUM);
        s_band /= kp * kp;

        frequency.push(f_band);
        spectrum.push(s_band);
    }

    let upper = spectrum.iter().map(|s| s * SPECTRUM_UPPER_SCALE).collect();
    let lower = spectrum.iter().map(|s| s * SPECTRUM_LOWER_SCALE).collect();

    PowerSpectrum {
        frequency,
        spectrum,
        upper,
        lower,
    }
}
