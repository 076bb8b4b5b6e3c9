//! Error taxonomy for a processing run.
//!
//! Structural violations abort a run; data-quality problems propagate as
//! NaN through the derived series instead (see the clip policy and the
//! per-chunk NaN rule in [`crate::spectra`]).

use thiserror::Error;

/// Fatal conditions for one derivation run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The sea record's first two timestamps do not advance.
    #[error("non-positive sample interval in sea pressure record")]
    NonPositiveTimeStep,

    /// Sea and air records never overlap in time.
    #[error("pressure records don't cover the same time period")]
    DisjointSeries,

    /// A required input array is empty.
    #[error("input series `{0}` is empty")]
    EmptyInput(&'static str),

    /// Parallel time/value arrays disagree in length.
    #[error("time and value arrays differ in length for `{0}`")]
    LengthMismatch(&'static str),

    /// An optional input the request needs was never supplied.
    #[error("required input `{0}` was not supplied")]
    MissingInput(&'static str),

    /// The record is sampled too slowly for the requested derivation.
    #[error("sampling rate {actual} Hz is below the {required} Hz required")]
    InsufficientSamplingRate { required: f64, actual: f64 },

    /// A timestamp cannot be represented as a datetime.
    #[error("timestamp {0} ms is outside the representable datetime range")]
    TimestampOutOfRange(i64),
}

/// How the air record's time range covers the sea record's.
///
/// Computed from interval endpoints alone. `Partial` is a warning, not an
/// error: the run proceeds on the truncated overlap. `Disjoint` is fatal
/// for every air-dependent derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeCoverage {
    /// The air record covers the whole sea record.
    Full,
    /// The records overlap only partially; data outside the overlap is
    /// dropped.
    Partial,
    /// No overlap at all.
    Disjoint,
}

impl TimeCoverage {
    /// Numeric code kept for report compatibility: 0 full, 1 partial,
    /// 2 disjoint.
    pub fn code(self) -> u8 {
        match self {
            TimeCoverage::Full => 0,
            TimeCoverage::Partial => 1,
            TimeCoverage::Disjoint => 2,
        }
    }
}
