//! Wave height and period statistics from spectral moments.
//!
//! The spectral moments of an elevation spectrum S(f) over the resolved
//! wave band [low_cut, high_cut] are
//!
//! ```text
//! mₙ = Σ fⁿ S(f) Δf
//! ```
//!
//! Heights follow from m₀ under the Rayleigh wave-height distribution:
//! the significant wave height is 4.004 √m₀ and the other height
//! statistics are fixed multiples of √m₀. Periods are moment ratios
//! (zero-crossing √(m₀/m₂), mean m₀/m₁, crest √(m₂/m₄)) or the inverse
//! frequency of the spectral maximum (peak).

use super::psd::PowerSpectrum;

/// Rayleigh multipliers on √m₀ for the height statistics.
pub const SIGNIFICANT_HEIGHT_COEF: f64 = 4.004;
pub const TEN_PERCENT_HEIGHT_COEF: f64 = 5.091;
pub const ONE_PERCENT_HEIGHT_COEF: f64 = 6.672;
pub const RMS_HEIGHT_COEF: f64 = 2.828;
pub const MEDIAN_HEIGHT_COEF: f64 = 2.360;
pub const AVERAGE_HEIGHT_COEF: f64 = 2.507;

/// Ratio of the expected maximum height to the significant height.
pub const MAXIMUM_TO_SIGNIFICANT: f64 = 1.86;

/// Spectral statistics over a configurable frequency band.
///
/// `low_cut`/`high_cut` bound the wave band used for moment integration,
/// excluding surge leakage below and instrument noise above.
#[derive(Clone, Copy, Debug)]
pub struct SpectralAnalysis {
    /// Lower band edge in Hz.
    pub low_cut: f64,
    /// Upper band edge in Hz.
    pub high_cut: f64,
}

impl Default for SpectralAnalysis {
    fn default() -> Self {
        Self {
            low_cut: 0.045,
            high_cut: 1.0,
        }
    }
}

impl SpectralAnalysis {
    /// n-th spectral moment of `spectrum` over the wave band.
    pub fn moment(&self, ps: &PowerSpectrum, spectrum: &[f64], order: i32) -> f64 {
        let df = ps.df();
        if df <= 0.0 {
            return f64::NAN;
        }
        ps.frequency
            .iter()
            .zip(spectrum.iter())
            .filter(|(&f, _)| f >= self.low_cut && f <= self.high_cut)
            .map(|(&f, &s)| f.powi(order) * s * df)
            .sum()
    }

    fn height(&self, ps: &PowerSpectrum, spectrum: &[f64], coef: f64) -> f64 {
        coef * self.moment(ps, spectrum, 0).sqrt()
    }

    /// Significant wave height H1/3 in meters.
    pub fn significant_wave_height(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        self.height(ps, spectrum, SIGNIFICANT_HEIGHT_COEF)
    }

    /// Mean of the highest 10% of waves.
    pub fn ten_percent_wave_height(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        self.height(ps, spectrum, TEN_PERCENT_HEIGHT_COEF)
    }

    /// Mean of the highest 1% of waves.
    pub fn one_percent_wave_height(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        self.height(ps, spectrum, ONE_PERCENT_HEIGHT_COEF)
    }

    /// Root-mean-square wave height.
    pub fn rms_wave_height(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        self.height(ps, spectrum, RMS_HEIGHT_COEF)
    }

    /// Median wave height.
    pub fn median_wave_height(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        self.height(ps, spectrum, MEDIAN_HEIGHT_COEF)
    }

    /// Expected maximum wave height over the window.
    pub fn maximum_wave_height(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        MAXIMUM_TO_SIGNIFICANT * self.significant_wave_height(ps, spectrum)
    }

    /// Average wave height.
    pub fn average_wave_height(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        self.height(ps, spectrum, AVERAGE_HEIGHT_COEF)
    }

    /// Average zero-up-crossing period √(m₀/m₂) in seconds.
    pub fn average_zero_crossing_period(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        (self.moment(ps, spectrum, 0) / self.moment(ps, spectrum, 2)).sqrt()
    }

    /// Mean wave period m₀/m₁ in seconds.
    pub fn mean_wave_period(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        self.moment(ps, spectrum, 0) / self.moment(ps, spectrum, 1)
    }

    /// Crest period √(m₂/m₄) in seconds.
    pub fn crest_wave_period(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        (self.moment(ps, spectrum, 2) / self.moment(ps, spectrum, 4)).sqrt()
    }

    /// Peak wave period: inverse frequency of the spectral maximum within
    /// the wave band. NaN when the band is empty or all-NaN.
    pub fn peak_wave_period(&self, ps: &PowerSpectrum, spectrum: &[f64]) -> f64 {
        let mut best: Option<(f64, f64)> = None;
        for (&f, &s) in ps.frequency.iter().zip(spectrum.iter()) {
            if f < self.low_cut || f > self.high_cut {
                continue;
            }
            if best.map_or(s.is_finite(), |(_, bs)| s > bs) {
                best = Some((f, s));
            }
        }
        match best {
            Some((f, _)) if f > 0.0 => 1.0 / f,
            _ => f64::NAN,
        }
    }
}
