//! Linear-wave-theory dynamic pressure correction.
//!
//! A submerged pressure sensor under-reads wave-induced pressure: the
//! dynamic signal of a wave with wavenumber `k` in water of depth `h`,
//! measured by a sensor `z` above the bed, is attenuated by the pressure
//! response factor
//!
//! ```text
//! Kp(f) = cosh(k z) / cosh(k h)
//! ```
//!
//! where `k` solves the dispersion relation `ω² = g k tanh(k h)`.
//!
//! [`combo_method`] combines the hydrostatic conversion for the
//! low-frequency (surge) band with a spectral Kp correction of the wave
//! band, recovering surface elevation from a wave-resolving (≥ 4 Hz)
//! pressure record. Below that rate individual waves are not resolvable
//! and only the hydrostatic method is valid; callers enforce that
//! precondition before invoking this routine.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::depth::filter::lowpass_filter;
use crate::units::{self, Salinity, GRAVITY};

/// Floor on the pressure response factor.
///
/// Strongly attenuated bins carry mostly instrument noise; amplifying them
/// by more than 1/KP_MINIMUM turns that noise into spurious surface waves.
pub const KP_MINIMUM: f64 = 0.1;

/// Solve the linear dispersion relation `ω² = g k tanh(k h)` for `k`.
///
/// Newton iteration from the Eckart-style initial guess; converges in a
/// handful of steps over the whole shallow-to-deep range. Returns 0 for
/// non-positive frequency or depth.
pub fn dispersion_wavenumber(omega: f64, depth: f64) -> f64 {
    if omega <= 0.0 || depth <= 0.0 {
        return 0.0;
    }

    let x = omega * omega * depth / GRAVITY;
    let mut k = omega * omega / (GRAVITY * x.tanh().sqrt().max(1e-8));

    for _ in 0..50 {
        let kh = k * depth;
        let tanh_kh = kh.tanh();
        let f = GRAVITY * k * tanh_kh - omega * omega;
        let df = GRAVITY * tanh_kh + GRAVITY * kh * (1.0 - tanh_kh * tanh_kh);
        let step = f / df;
        k -= step;
        if step.abs() < 1e-13 * k.abs().max(1e-13) {
            break;
        }
    }
    k.max(0.0)
}

/// Pressure response factor for a sensor `sensor_height` above the bed in
/// water of total depth `water_depth`.
///
/// Equals 1 at the surface (`z = h`) and decays toward the bed. Written in
/// exponential form for large `k h` where `cosh` would overflow.
pub fn pressure_response_factor(k: f64, sensor_height: f64, water_depth: f64) -> f64 {
    if k <= 0.0 || water_depth <= 0.0 {
        return 1.0;
    }
    let z = sensor_height.clamp(0.0, water_depth);
    let kh = k * water_depth;
    if kh > 700.0 {
        (k * (z - water_depth)).exp()
    } else {
        (k * z).cosh() / kh.cosh()
    }
}

/// Hydrostatic + linear-wave-theory surface elevation from a high-frequency
/// pressure record.
///
/// Splits the record into a surge band (low-pass filtered, converted
/// hydrostatically) and a wave band, divides each wave-band spectral bin by
/// its pressure response factor (floored at [`KP_MINIMUM`]), and returns
/// the water-surface elevation `orifice + surge_depth + wave_elevation`.
///
/// `water_depth` is the mean total water depth over the record and sets the
/// dispersion solution; the sensor height above the bed is inferred from
/// the mean hydrostatic submergence.
pub fn combo_method(
    time_s: &[f64],
    pressure_dbar: &[f64],
    sensor_orifice_elevation: &[f64],
    water_depth: f64,
    salinity: Salinity,
) -> Vec<f64> {
    let n = pressure_dbar.len();
    if n < 2 || time_s.len() < 2 {
        return sensor_orifice_elevation
            .iter()
            .zip(pressure_dbar.iter())
            .map(|(&orifice, &p)| orifice + units::dbar_to_meters(p, salinity))
            .collect();
    }

    let dt = time_s[1] - time_s[0];
    let fs = 1.0 / dt;

    let mean = pressure_dbar.iter().sum::<f64>() / n as f64;
    let demeaned: Vec<f64> = pressure_dbar.iter().map(|&p| p - mean).collect();
    let surge = lowpass_filter(&demeaned, fs);
    let wave: Vec<f64> = demeaned
        .iter()
        .zip(surge.iter())
        .map(|(&d, &s)| d - s)
        .collect();

    // Sensor height above the bed from the mean submergence.
    let submergence = units::dbar_to_meters(mean, salinity);
    let sensor_height = (water_depth - submergence).max(0.0);

    // Correct the wave band bin by bin in the frequency domain.
    let mut planner = FftPlanner::<f64>::new();
    let mut spectrum: Vec<Complex<f64>> = wave.iter().map(|&v| Complex::new(v, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut spectrum);

    for (j, bin) in spectrum.iter_mut().enumerate().skip(1) {
        let cycles = j.min(n - j) as f64;
        let freq = cycles * fs / n as f64;
        let omega = 2.0 * std::f64::consts::PI * freq;
        let k = dispersion_wavenumber(omega, water_depth);
        let kp = pressure_response_factor(k, sensor_height, water_depth).max(KP_MINIMUM);
        *bin /= kp;
    }

    planner.plan_fft_inverse(n).process(&mut spectrum);
    let scale = 1.0 / n as f64;

    (0..n)
        .map(|i| {
            let surge_depth = units::dbar_to_meters(surge[i] + mean, salinity);
            let wave_elevation = units::dbar_to_meters(spectrum[i].re * scale, salinity);
            sensor_orifice_elevation[i] + surge_depth + wave_elevation
        })
        .collect()
}
