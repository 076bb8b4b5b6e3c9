//! # stormtide
//!
//! Storm-tide water level and ocean wave statistics from submerged
//! pressure sensor records.
//!
//! This crate provides the processing core for deriving sea state from
//! paired sea/air pressure deployments:
//! - Unit conversions and physical constants (decibar/meter, timezone display)
//! - Hydrostatic pressure-to-depth conversion
//! - Zero-phase Butterworth filtering for storm-tide / wave band separation
//! - Linear wave theory depth correction (dispersion, pressure response)
//! - Overlapping analysis windows and band-averaged power spectra
//! - Wave height and period statistics with chi-square confidence bounds
//! - A memoized derivation graph orchestrating one processing run

pub mod chunk;
pub mod depth;
pub mod graph;
pub mod spectra;
pub mod units;

// Re-export main types for convenience
pub use chunk::{chunk_count, Chunk, Chunker, CHUNK_LENGTH, CHUNK_STRIDE};
pub use depth::{
    combo_method, dispersion_wavenumber, hydrostatic_method, lowpass_filter,
    pressure_response_factor, KP_MINIMUM,
};
pub use graph::{
    Deployment, DerivationGraph, EngineError, ProcessingOptions, SensorRecord, TimeCoverage,
    WindRecord, SURGE_MIN_HZ, WAVE_STATISTICS_MIN_HZ,
};
pub use spectra::{
    power_spectrum, PowerSpectrum, SpectralAnalysis, StatDictionary, WaveStatistics,
    HEIGHT_STATISTICS, PERIOD_STATISTICS,
};
pub use units::{Salinity, Timezone, GRAVITY, METER_TO_FEET};
