//! Zero-phase Butterworth low-pass filtering for surge separation.
//!
//! The storm-tide (surge) component of a pressure record is everything
//! slower than the wave band. It is isolated with a 4th-order Butterworth
//! low-pass, default cutoff period 6 minutes (1/360 Hz), run forward and
//! then backward over the record so the net phase shift is zero.
//!
//! # Design
//!
//! The 4th-order Butterworth is realized as two cascaded biquad sections
//! whose quality factors are the Butterworth pole pairs:
//!
//! ```text
//! Q₁ = 1 / (2 sin(π/8))    Q₂ = 1 / (2 sin(3π/8))
//! ```
//!
//! Each section uses the standard bilinear-transform low-pass biquad
//! coefficients. Edge transients are suppressed by odd extension of the
//! signal at both ends and steady-state initial filter conditions, the
//! same scheme as SciPy's `filtfilt`.

use std::f64::consts::PI;

/// Default low-pass cutoff frequency: a 6-minute period.
pub const DEFAULT_LOWPASS_CUTOFF_HZ: f64 = 1.0 / 360.0;

/// Butterworth section quality factors for a 4th-order cascade.
const BUTTERWORTH_Q: [f64; 2] = [0.541_196_100_146_196_9, 1.306_562_964_876_376_4];

/// Samples of odd extension used at each end for the zero-phase pass.
const EDGE_PAD: usize = 15;

/// One direct-form-II-transposed biquad section.
#[derive(Clone, Copy, Debug)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// Low-pass section from cutoff frequency, sampling frequency, and Q.
    fn lowpass(cutoff_hz: f64, fs: f64, q: f64) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / fs;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: (1.0 - cos_w0) / 2.0 / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: (1.0 - cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Filter state that makes a constant input pass through unchanged.
    ///
    /// Scaled by the first input sample, this removes the startup
    /// transient for signals that begin near steady state.
    fn steady_state(&self, x0: f64) -> (f64, f64) {
        let gain = (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2);
        let y0 = gain * x0;
        let z2 = self.b2 * x0 - self.a2 * y0;
        let z1 = y0 - self.b0 * x0;
        (z1, z2)
    }

    /// Run the section over `data` in place.
    fn apply(&self, data: &mut [f64]) {
        if data.is_empty() {
            return;
        }
        let (mut z1, mut z2) = self.steady_state(data[0]);
        for x in data.iter_mut() {
            let input = *x;
            let y = self.b0 * input + z1;
            z1 = self.b1 * input - self.a1 * y + z2;
            z2 = self.b2 * input - self.a2 * y;
            *x = y;
        }
    }
}

/// Apply the default 6-minute-cutoff zero-phase low-pass filter.
///
/// Callers are responsible for the sampling-rate preconditions; this
/// routine assumes `fs` is valid and positive.
pub fn lowpass_filter(signal: &[f64], fs: f64) -> Vec<f64> {
    lowpass_filter_with_cutoff(signal, fs, DEFAULT_LOWPASS_CUTOFF_HZ)
}

/// Zero-phase 4th-order Butterworth low-pass with an explicit cutoff.
///
/// Records shorter than three samples are returned unchanged; there is
/// nothing meaningful to filter.
pub fn lowpass_filter_with_cutoff(signal: &[f64], fs: f64, cutoff_hz: f64) -> Vec<f64> {
    let n = signal.len();
    if n < 3 {
        return signal.to_vec();
    }

    let sections = [
        Biquad::lowpass(cutoff_hz, fs, BUTTERWORTH_Q[0]),
        Biquad::lowpass(cutoff_hz, fs, BUTTERWORTH_Q[1]),
    ];

    let pad = EDGE_PAD.min(n - 1);
    let mut extended = Vec::with_capacity(n + 2 * pad);
    // Odd extension about the end points.
    for i in (1..=pad).rev() {
        extended.push(2.0 * signal[0] - signal[i]);
    }
    extended.extend_from_slice(signal);
    for i in 1..=pad {
        extended.push(2.0 * signal[n - 1] - signal[n - 1 - i]);
    }

    // Forward pass.
    for section in &sections {
        section.apply(&mut extended);
    }
    // Backward pass: same cascade over the reversed signal.
    extended.reverse();
    for section in &sections {
        section.apply(&mut extended);
    }
    extended.reverse();

    extended[pad..pad + n].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_signal_passes_unchanged() {
        let signal = vec![3.25; 2000];
        let filtered = lowpass_filter(&signal, 4.0);
        assert_eq!(filtered.len(), signal.len());
        for (i, v) in filtered.iter().enumerate() {
            assert!(
                (v - 3.25).abs() < 1e-9,
                "constant drifted at sample {}: {}",
                i,
                v
            );
        }
    }

    #[test]
    fn test_zero_phase_preserves_symmetric_peak() {
        // Slow gaussian bump centered at sample 5000; low-frequency enough
        // to survive the 1/360 Hz cutoff at 4 Hz sampling.
        let fs = 4.0;
        let center = 5000.0;
        let signal: Vec<f64> = (0..10_000)
            .map(|i| {
                let t = (i as f64 - center) / fs;
                (-t * t / (2.0 * 400.0 * 400.0)).exp()
            })
            .collect();

        let filtered = lowpass_filter(&signal, fs);

        let peak_in = argmax(&signal);
        let peak_out = argmax(&filtered);
        assert!(
            peak_in.abs_diff(peak_out) <= 1,
            "peak moved from {} to {}",
            peak_in,
            peak_out
        );
    }

    #[test]
    fn test_wave_band_is_removed() {
        // A 10-second wave (0.1 Hz) is far above the 1/360 Hz cutoff and
        // should be almost entirely suppressed.
        let fs = 4.0;
        let signal: Vec<f64> = (0..8000)
            .map(|i| (2.0 * PI * 0.1 * i as f64 / fs).sin())
            .collect();

        let filtered = lowpass_filter(&signal, fs);
        let interior = &filtered[1000..7000];
        let max_abs = interior.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(max_abs < 1e-3, "wave band leaked through: {}", max_abs);
    }

    #[test]
    fn test_short_record_returned_unchanged() {
        let signal = vec![1.0, 2.0];
        assert_eq!(lowpass_filter(&signal, 4.0), signal);
    }

    fn argmax(data: &[f64]) -> usize {
        let mut best = 0;
        for (i, v) in data.iter().enumerate() {
            if *v > data[best] {
                best = i;
            }
        }
        best
    }
}
