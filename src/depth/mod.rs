//! Pressure-to-depth algorithms.
//!
//! Three ways to turn a corrected sea-pressure record into water level:
//!
//! - [`hydrostatic_method`]: the full-bandwidth hydrostatic conversion,
//!   valid at any sampling rate.
//! - [`lowpass_filter`]: zero-phase Butterworth filtering that separates
//!   the storm-tide (surge) band from the wave band.
//! - [`combo_method`]: hydrostatic surge plus a linear-wave-theory
//!   correction of the wave band, for wave-resolving (≥ 4 Hz) records.
//!
//! These routines assume their frequency preconditions have been checked
//! by the caller and do not re-validate sampling rates.

mod filter;
mod hydrostatic;
mod lwt;

pub use filter::{lowpass_filter, lowpass_filter_with_cutoff, DEFAULT_LOWPASS_CUTOFF_HZ};
pub use hydrostatic::{hydrostatic_method, hydrostatic_pressure, mean_depth};
pub use lwt::{combo_method, dispersion_wavenumber, pressure_response_factor, KP_MINIMUM};
