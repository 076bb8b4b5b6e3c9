//! The derivation graph: memoized, dependency-resolving orchestration of
//! one processing run.
//!
//! A [`DerivationGraph`] owns the raw sea and air pressure records plus
//! deployment metadata for a single deployment, and exposes named getters
//! for every derived quantity (`get_raw_water_level`,
//! `get_surge_water_level`, `get_wave_statistics`, ...). Each derived
//! field is computed on first request, cached, and reused; requesting a
//! field transparently computes its prerequisites first.
//!
//! Dependencies are declared explicitly per [`Field`] and resolved by a
//! small recursive scheduler over a field→value cache, so getter-call
//! order can never produce stale or partially initialized state. Every
//! getter is idempotent: a second call returns the cached value
//! bit-identically.
//!
//! # Alignment and slicing
//!
//! Air pressure is linearly interpolated onto the sea time base with NaN
//! outside the air record. Before anything air-dependent is derived, all
//! input arrays are sliced once to the NaN-free overlap. Records that
//! never overlap are a fatal [`EngineError::DisjointSeries`]; a partial
//! overlap is a warning carried by [`TimeCoverage::Partial`] and the run
//! proceeds on the truncated region.
//!
//! # Clip policy
//!
//! Water-level samples below the sensor's minimum recordable elevation
//! (deployment orifice elevation plus a small threshold when clipping is
//! enabled) are replaced with NaN, not treated as errors. If the surge
//! series has no such samples only the raw series is clipped. The test is
//! applied exactly once per run.

mod error;

pub use error::{EngineError, TimeCoverage};

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::chunk::Chunker;
use crate::depth::{hydrostatic_method, lowpass_filter};
use crate::spectra::{SpectralAnalysis, WaveStatistics};
use crate::units::{self, Salinity, Timezone, METER_TO_FEET};

/// Minimum sampling rate for wave statistics: individual waves must be
/// resolvable.
pub const WAVE_STATISTICS_MIN_HZ: f64 = 4.0;

/// Minimum sampling rate for a meaningful storm-tide (surge) filter
/// output.
pub const SURGE_MIN_HZ: f64 = 1.0 / 180.0;

/// Clip threshold above the deployment orifice elevation, in the display
/// length unit.
const CLIP_THRESHOLD: f64 = 0.1;

/// One instrument's raw record: UTC epoch-millisecond timestamps and
/// pressure in decibars, in parallel arrays.
#[derive(Clone, Debug)]
pub struct SensorRecord {
    pub time_ms: Vec<i64>,
    pub pressure_dbar: Vec<f64>,
}

/// Wind record: eastward/northward components on their own time base.
#[derive(Clone, Debug)]
pub struct WindRecord {
    pub time_ms: Vec<i64>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

/// Deployment metadata for one instrument pair.
///
/// Orifice and land-surface elevations are given at deployment and
/// retrieval and interpolated linearly across the whole record length.
#[derive(Clone, Debug)]
pub struct Deployment {
    pub latitude: f64,
    pub longitude: f64,
    pub station_id: String,
    pub instrument_id: String,
    pub air_station_id: String,
    pub air_instrument_id: String,
    /// Vertical reference datum name, carried through to the writers.
    pub datum: String,
    pub salinity: Salinity,
    /// Sensor orifice elevation (deployment, retrieval), meters above datum.
    pub sensor_orifice_elevation: (f64, f64),
    /// Land-surface elevation (deployment, retrieval), meters above datum.
    pub land_surface_elevation: (f64, f64),
    /// Sea pressure instrument level accuracy in meters.
    pub sea_accuracy_m: f64,
    /// Air pressure instrument level accuracy in meters.
    pub air_accuracy_m: f64,
}

/// Per-run processing options.
#[derive(Clone, Debug)]
pub struct ProcessingOptions {
    /// Lower wave-band cutoff in Hz for spectral statistics.
    pub low_cut: f64,
    /// Upper wave-band cutoff in Hz for spectral statistics.
    pub high_cut: f64,
    /// Report in meters when true, feet otherwise.
    pub international_units: bool,
    /// Apply the clip threshold above the orifice elevation.
    pub clip: bool,
    /// Optional datum annotation for output, unused by the engine itself.
    pub reference_name: Option<String>,
    pub reference_elevation: Option<f64>,
    /// Display timezone; computation stays on the UTC axis.
    pub timezone: Timezone,
    pub daylight_savings: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            low_cut: 0.045,
            high_cut: 1.0,
            international_units: true,
            clip: false,
            reference_name: None,
            reference_elevation: None,
            timezone: Timezone::Gmt,
            daylight_savings: false,
        }
    }
}

/// Derived quantities, the nodes of the dependency DAG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Field {
    /// The one-time slice of all inputs to the sea/air overlap.
    Alignment,
    SamplingFrequency,
    CorrectedSeaPressure,
    SeaPressureMean,
    SurgeSeaPressure,
    WaveSeaPressure,
    RawWaterLevel,
    SurgeWaterLevel,
    /// The elevation test: raw and surge series after clipping.
    ClippedLevels,
    WaveWaterLevel,
    CombinedLevelAccuracy,
    WindSpeed,
    WaveStats,
}

/// Arrays sliced to the sea/air overlap, computed once per run.
#[derive(Clone, Debug)]
struct AlignedInputs {
    time_ms: Vec<f64>,
    sea_pressure: Vec<f64>,
    air_pressure: Vec<f64>,
    sensor_orifice_elevation: Vec<f64>,
    land_surface_elevation: Vec<f64>,
}

#[derive(Clone, Debug)]
enum FieldValue {
    Aligned(AlignedInputs),
    Series(Vec<f64>),
    Scalar(f64),
    Levels { raw: Vec<f64>, surge: Vec<f64> },
    Stats(Box<WaveStatistics>),
}

/// Memoized derivation graph for one deployment's processing run.
///
/// Create one per run, query the derived fields the run needs, and drop
/// it; no state survives across runs. Not internally synchronized: the
/// engine is single-threaded by contract.
#[derive(Debug)]
pub struct DerivationGraph {
    sea: SensorRecord,
    air: SensorRecord,
    wind: Option<WindRecord>,
    deployment: Deployment,
    options: ProcessingOptions,
    cache: HashMap<Field, FieldValue>,
}

impl DerivationGraph {
    pub fn new(
        sea: SensorRecord,
        air: SensorRecord,
        deployment: Deployment,
        options: ProcessingOptions,
    ) -> Self {
        Self {
            sea,
            air,
            wind: None,
            deployment,
            options,
            cache: HashMap::new(),
        }
    }

    /// Attach an optional wind record; its speed is interpolated onto the
    /// sea time base and carried into the analysis windows.
    pub fn with_wind(mut self, wind: WindRecord) -> Self {
        self.wind = Some(wind);
        self
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Discard every cached field; the next getter recomputes from the
    /// raw inputs.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    /// Sea timestamps (ms) after slicing to the sea/air overlap.
    pub fn get_sea_time(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::Alignment)?;
        Ok(&self.aligned().time_ms)
    }

    /// Air pressure interpolated onto the sliced sea time base.
    pub fn get_interpolated_air_pressure(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::Alignment)?;
        Ok(&self.aligned().air_pressure)
    }

    /// Sensor orifice elevation interpolated across the sliced record.
    pub fn get_sensor_orifice_elevation(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::Alignment)?;
        Ok(&self.aligned().sensor_orifice_elevation)
    }

    /// Land-surface elevation interpolated across the sliced record.
    pub fn get_land_surface_elevation(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::Alignment)?;
        Ok(&self.aligned().land_surface_elevation)
    }

    /// Nominal sampling frequency in Hz, from the first two sea samples.
    pub fn get_sampling_frequency(&mut self) -> Result<f64, EngineError> {
        self.ensure(Field::SamplingFrequency)?;
        Ok(self.scalar(Field::SamplingFrequency))
    }

    /// Sea pressure minus interpolated air pressure, decibars.
    pub fn get_corrected_sea_pressure(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::CorrectedSeaPressure)?;
        Ok(self.series(Field::CorrectedSeaPressure))
    }

    /// Mean of the corrected sea pressure over the sliced record.
    pub fn get_sea_pressure_mean(&mut self) -> Result<f64, EngineError> {
        self.ensure(Field::SeaPressureMean)?;
        Ok(self.scalar(Field::SeaPressureMean))
    }

    /// Storm-tide band of the corrected pressure: low-pass filtered with
    /// the record mean removed. The mean is added back when the surge
    /// water level is derived.
    pub fn get_surge_sea_pressure(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::SurgeSeaPressure)?;
        Ok(self.series(Field::SurgeSeaPressure))
    }

    /// Wave band of the corrected pressure: what the surge filter removed.
    pub fn get_wave_sea_pressure(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::WaveSeaPressure)?;
        Ok(self.series(Field::WaveSeaPressure))
    }

    /// Full-bandwidth hydrostatic water level, clipped.
    pub fn get_raw_water_level(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::ClippedLevels)?;
        Ok(self.levels().0)
    }

    /// Storm-tide (low-pass filtered) water level, clipped.
    pub fn get_surge_water_level(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::ClippedLevels)?;
        Ok(self.levels().1)
    }

    /// Wave-band-only water level: raw minus surge.
    pub fn get_wave_water_level(&mut self) -> Result<&[f64], EngineError> {
        self.ensure(Field::WaveWaterLevel)?;
        Ok(self.series(Field::WaveWaterLevel))
    }

    /// Combined sea + air instrument level accuracy in meters.
    pub fn get_combined_level_accuracy(&mut self) -> Result<f64, EngineError> {
        self.ensure(Field::CombinedLevelAccuracy)?;
        Ok(self.scalar(Field::CombinedLevelAccuracy))
    }

    /// Wind speed in m/s interpolated onto the sliced sea time base.
    pub fn get_wind_speed(&mut self) -> Result<&[f64], EngineError> {
        if self.wind.is_none() {
            return Err(EngineError::MissingInput("wind record"));
        }
        self.ensure(Field::WindSpeed)?;
        Ok(self.series(Field::WindSpeed))
    }

    /// Windowed wave statistics: central estimates with upper and lower
    /// confidence bounds. Requires a wave-resolving record
    /// (≥ [`WAVE_STATISTICS_MIN_HZ`]).
    pub fn get_wave_statistics(&mut self) -> Result<&WaveStatistics, EngineError> {
        self.ensure(Field::WaveStats)?;
        match self.cache.get(&Field::WaveStats) {
            Some(FieldValue::Stats(stats)) => Ok(stats),
            _ => unreachable!("wave statistics not cached after ensure"),
        }
    }

    /// Sea timestamps converted for display in the configured timezone.
    pub fn get_formatted_sea_time(&self) -> Result<Vec<DateTime<FixedOffset>>, EngineError> {
        self.format_times(&self.sea.time_ms)
    }

    /// Air timestamps converted for display in the configured timezone.
    pub fn get_formatted_air_time(&self) -> Result<Vec<DateTime<FixedOffset>>, EngineError> {
        self.format_times(&self.air.time_ms)
    }

    /// Coverage of the sea record by the air record, from interval
    /// endpoints alone.
    pub fn time_comparison(&self) -> Result<TimeCoverage, EngineError> {
        let sea = endpoints(&self.sea.time_ms).ok_or(EngineError::EmptyInput("sea time"))?;
        let air = endpoints(&self.air.time_ms).ok_or(EngineError::EmptyInput("air time"))?;

        if air.1 < sea.0 || air.0 > sea.1 {
            Ok(TimeCoverage::Disjoint)
        } else if air.0 > sea.0 || air.1 < sea.1 {
            Ok(TimeCoverage::Partial)
        } else {
            Ok(TimeCoverage::Full)
        }
    }

    // ------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------

    fn dependencies(&self, field: Field) -> Vec<Field> {
        use Field::*;
        match field {
            Alignment | CombinedLevelAccuracy => vec![],
            SamplingFrequency | CorrectedSeaPressure | WindSpeed => vec![Alignment],
            SeaPressureMean => vec![CorrectedSeaPressure],
            SurgeSeaPressure => vec![CorrectedSeaPressure, SeaPressureMean, SamplingFrequency],
            WaveSeaPressure => vec![CorrectedSeaPressure, SeaPressureMean, SurgeSeaPressure],
            RawWaterLevel => vec![Alignment, CorrectedSeaPressure],
            SurgeWaterLevel => vec![Alignment, SurgeSeaPressure, SeaPressureMean],
            ClippedLevels => vec![Alignment, RawWaterLevel, SurgeWaterLevel],
            WaveWaterLevel => vec![ClippedLevels],
            WaveStats => {
                let mut deps = vec![
                    Alignment,
                    CorrectedSeaPressure,
                    SamplingFrequency,
                    CombinedLevelAccuracy,
                ];
                if self.wind.is_some() {
                    deps.push(WindSpeed);
                }
                deps
            }
        }
    }

    fn ensure(&mut self, field: Field) -> Result<(), EngineError> {
        if self.cache.contains_key(&field) {
            return Ok(());
        }
        for dep in self.dependencies(field) {
            self.ensure(dep)?;
        }
        let value = self.compute(field)?;
        self.cache.insert(field, value);
        Ok(())
    }

    fn compute(&self, field: Field) -> Result<FieldValue, EngineError> {
        match field {
            Field::Alignment => self.compute_alignment(),
            Field::SamplingFrequency => self.compute_sampling_frequency(),
            Field::CorrectedSeaPressure => self.compute_corrected_sea_pressure(),
            Field::SeaPressureMean => self.compute_sea_pressure_mean(),
            Field::SurgeSeaPressure => self.compute_surge_sea_pressure(),
            Field::WaveSeaPressure => self.compute_wave_sea_pressure(),
            Field::RawWaterLevel => self.compute_raw_water_level(),
            Field::SurgeWaterLevel => self.compute_surge_water_level(),
            Field::ClippedLevels => self.compute_clipped_levels(),
            Field::WaveWaterLevel => self.compute_wave_water_level(),
            Field::CombinedLevelAccuracy => Ok(FieldValue::Scalar(
                self.deployment.sea_accuracy_m + self.deployment.air_accuracy_m,
            )),
            Field::WindSpeed => self.compute_wind_speed(),
            Field::WaveStats => self.compute_wave_statistics(),
        }
    }

    // ------------------------------------------------------------------
    // Compute functions (prerequisites already cached)
    // ------------------------------------------------------------------

    fn compute_alignment(&self) -> Result<FieldValue, EngineError> {
        if self.sea.pressure_dbar.is_empty() {
            return Err(EngineError::EmptyInput("sea pressure"));
        }
        if self.air.pressure_dbar.is_empty() {
            return Err(EngineError::EmptyInput("air pressure"));
        }
        if self.sea.time_ms.len() != self.sea.pressure_dbar.len() {
            return Err(EngineError::LengthMismatch("sea pressure"));
        }
        if self.air.time_ms.len() != self.air.pressure_dbar.len() {
            return Err(EngineError::LengthMismatch("air pressure"));
        }
        if self.time_comparison()? == TimeCoverage::Disjoint {
            return Err(EngineError::DisjointSeries);
        }

        let sea_time: Vec<f64> = self.sea.time_ms.iter().map(|&t| t as f64).collect();
        let air_time: Vec<f64> = self.air.time_ms.iter().map(|&t| t as f64).collect();
        let air_interp = interp_linear(
            &sea_time,
            &air_time,
            &self.air.pressure_dbar,
            f64::NAN,
            f64::NAN,
        );

        // Drop the NaN-padded edges from the interpolation: the record is
        // truncated once to the region both instruments cover.
        let begin = air_interp
            .iter()
            .position(|v| !v.is_nan())
            .ok_or(EngineError::DisjointSeries)?;
        let end = air_interp
            .iter()
            .rposition(|v| !v.is_nan())
            .ok_or(EngineError::DisjointSeries)?;

        let n = sea_time.len();
        let orifice = linspace(
            self.deployment.sensor_orifice_elevation.0,
            self.deployment.sensor_orifice_elevation.1,
            n,
        );
        let land = linspace(
            self.deployment.land_surface_elevation.0,
            self.deployment.land_surface_elevation.1,
            n,
        );

        Ok(FieldValue::Aligned(AlignedInputs {
            time_ms: sea_time[begin..=end].to_vec(),
            sea_pressure: self.sea.pressure_dbar[begin..=end].to_vec(),
            air_pressure: air_interp[begin..=end].to_vec(),
            sensor_orifice_elevation: orifice[begin..=end].to_vec(),
            land_surface_elevation: land[begin..=end].to_vec(),
        }))
    }

    fn compute_sampling_frequency(&self) -> Result<FieldValue, EngineError> {
        let time = &self.aligned().time_ms;
        if time.len() < 2 {
            return Err(EngineError::NonPositiveTimeStep);
        }
        let dt_s = (time[1] - time[0]) / 1000.0;
        if !(dt_s > 0.0) {
            return Err(EngineError::NonPositiveTimeStep);
        }
        Ok(FieldValue::Scalar(1.0 / dt_s))
    }

    fn compute_corrected_sea_pressure(&self) -> Result<FieldValue, EngineError> {
        let aligned = self.aligned();
        let corrected = aligned
            .sea_pressure
            .iter()
            .zip(aligned.air_pressure.iter())
            .map(|(&sea, &air)| sea - air)
            .collect();
        Ok(FieldValue::Series(corrected))
    }

    fn compute_sea_pressure_mean(&self) -> Result<FieldValue, EngineError> {
        let corrected = self.series(Field::CorrectedSeaPressure);
        Ok(FieldValue::Scalar(
            corrected.iter().sum::<f64>() / corrected.len() as f64,
        ))
    }

    fn compute_surge_sea_pressure(&self) -> Result<FieldValue, EngineError> {
        let fs = self.scalar(Field::SamplingFrequency);
        if fs < SURGE_MIN_HZ {
            return Err(EngineError::InsufficientSamplingRate {
                required: SURGE_MIN_HZ,
                actual: fs,
            });
        }
        let mean = self.scalar(Field::SeaPressureMean);
        let demeaned: Vec<f64> = self
            .series(Field::CorrectedSeaPressure)
            .iter()
            .map(|&p| p - mean)
            .collect();
        Ok(FieldValue::Series(lowpass_filter(&demeaned, fs)))
    }

    fn compute_wave_sea_pressure(&self) -> Result<FieldValue, EngineError> {
        let mean = self.scalar(Field::SeaPressureMean);
        let wave = self
            .series(Field::CorrectedSeaPressure)
            .iter()
            .zip(self.series(Field::SurgeSeaPressure).iter())
            .map(|(&p, &s)| p - mean - s)
            .collect();
        Ok(FieldValue::Series(wave))
    }

    fn compute_raw_water_level(&self) -> Result<FieldValue, EngineError> {
        let depth = hydrostatic_method(
            self.series(Field::CorrectedSeaPressure),
            self.deployment.salinity,
        );
        Ok(FieldValue::Series(self.add_orifice(&depth)))
    }

    fn compute_surge_water_level(&self) -> Result<FieldValue, EngineError> {
        let mean = self.scalar(Field::SeaPressureMean);
        let restored: Vec<f64> = self
            .series(Field::SurgeSeaPressure)
            .iter()
            .map(|&p| p + mean)
            .collect();
        let depth = hydrostatic_method(&restored, self.deployment.salinity);
        Ok(FieldValue::Series(self.add_orifice(&depth)))
    }

    fn compute_clipped_levels(&self) -> Result<FieldValue, EngineError> {
        let mut raw = self.series(Field::RawWaterLevel).to_vec();
        let mut surge = self.series(Field::SurgeWaterLevel).to_vec();

        let clip_scale = if !self.options.clip {
            0.0
        } else if self.options.international_units {
            CLIP_THRESHOLD / METER_TO_FEET
        } else {
            CLIP_THRESHOLD
        };
        let threshold = self.aligned().sensor_orifice_elevation[0] + clip_scale;

        let surge_low: Vec<usize> = below(&surge, threshold);
        let raw_low: Vec<usize> = below(&raw, threshold);

        // If the surge series never dips below the sensor only the raw
        // series is clipped.
        for &i in &raw_low {
            raw[i] = f64::NAN;
        }
        if !surge_low.is_empty() {
            for &i in &surge_low {
                surge[i] = f64::NAN;
            }
        }

        Ok(FieldValue::Levels { raw, surge })
    }

    fn compute_wave_water_level(&self) -> Result<FieldValue, EngineError> {
        let (raw, surge) = self.levels();
        let wave = raw
            .iter()
            .zip(surge.iter())
            .map(|(&r, &s)| r - s)
            .collect();
        Ok(FieldValue::Series(wave))
    }

    fn compute_wind_speed(&self) -> Result<FieldValue, EngineError> {
        let wind = self
            .wind
            .as_ref()
            .ok_or(EngineError::MissingInput("wind record"))?;
        if wind.time_ms.is_empty() || wind.u.is_empty() {
            return Err(EngineError::EmptyInput("wind record"));
        }
        if wind.time_ms.len() != wind.u.len() || wind.u.len() != wind.v.len() {
            return Err(EngineError::LengthMismatch("wind record"));
        }

        let speed = units::wind_speed(&wind.u, &wind.v);
        let wind_time: Vec<f64> = wind.time_ms.iter().map(|&t| t as f64).collect();
        // Edge samples clamp rather than NaN: wind gaps are tolerable in a
        // way pressure gaps are not.
        let interpolated = interp_linear(
            &self.aligned().time_ms,
            &wind_time,
            &speed,
            speed[0],
            speed[speed.len() - 1],
        );
        Ok(FieldValue::Series(interpolated))
    }

    fn compute_wave_statistics(&self) -> Result<FieldValue, EngineError> {
        let fs = self.scalar(Field::SamplingFrequency);
        if fs < WAVE_STATISTICS_MIN_HZ {
            return Err(EngineError::InsufficientSamplingRate {
                required: WAVE_STATISTICS_MIN_HZ,
                actual: fs,
            });
        }

        let aligned = self.aligned();
        let wind = self
            .wind
            .as_ref()
            .map(|_| self.series(Field::WindSpeed));
        let chunks: Vec<_> = Chunker::new(
            &aligned.time_ms,
            self.series(Field::CorrectedSeaPressure),
            &aligned.land_surface_elevation,
            &aligned.sensor_orifice_elevation,
            wind,
        )
        .collect();

        let analysis = SpectralAnalysis {
            low_cut: self.options.low_cut,
            high_cut: self.options.high_cut,
        };
        let unit_scale = if self.options.international_units {
            1.0
        } else {
            METER_TO_FEET
        };
        let stats = analysis.derive_statistics(
            &chunks,
            self.scalar(Field::CombinedLevelAccuracy),
            unit_scale,
            self.deployment.salinity,
        );
        Ok(FieldValue::Stats(Box::new(stats)))
    }

    // ------------------------------------------------------------------
    // Cache accessors
    // ------------------------------------------------------------------

    fn aligned(&self) -> &AlignedInputs {
        match self.cache.get(&Field::Alignment) {
            Some(FieldValue::Aligned(a)) => a,
            _ => unreachable!("alignment not cached"),
        }
    }

    fn series(&self, field: Field) -> &[f64] {
        match self.cache.get(&field) {
            Some(FieldValue::Series(v)) => v,
            _ => unreachable!("{:?} not cached as a series", field),
        }
    }

    fn scalar(&self, field: Field) -> f64 {
        match self.cache.get(&field) {
            Some(FieldValue::Scalar(v)) => *v,
            _ => unreachable!("{:?} not cached as a scalar", field),
        }
    }

    fn levels(&self) -> (&[f64], &[f64]) {
        match self.cache.get(&Field::ClippedLevels) {
            Some(FieldValue::Levels { raw, surge }) => (raw, surge),
            _ => unreachable!("clipped levels not cached"),
        }
    }

    fn add_orifice(&self, depth: &[f64]) -> Vec<f64> {
        self.aligned()
            .sensor_orifice_elevation
            .iter()
            .zip(depth.iter())
            .map(|(&orifice, &d)| orifice + d)
            .collect()
    }

    fn format_times(&self, times: &[i64]) -> Result<Vec<DateTime<FixedOffset>>, EngineError> {
        times
            .iter()
            .map(|&ms| {
                let dt = units::ms_to_datetime(ms).ok_or(EngineError::TimestampOutOfRange(ms))?;
                Ok(units::adjust_from_gmt(
                    dt,
                    self.options.timezone,
                    self.options.daylight_savings,
                ))
            })
            .collect()
    }
}

fn endpoints(times: &[i64]) -> Option<(i64, i64)> {
    Some((*times.first()?, *times.last()?))
}

fn below(series: &[f64], threshold: f64) -> Vec<usize> {
    series
        .iter()
        .enumerate()
        .filter(|(_, &v)| v < threshold)
        .map(|(i, _)| i)
        .collect()
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Linear interpolation of (`xp`, `fp`) onto `x`, with configurable
/// values outside the source range. `xp` must be strictly increasing.
fn interp_linear(x: &[f64], xp: &[f64], fp: &[f64], left: f64, right: f64) -> Vec<f64> {
    let last = xp.len() - 1;
    x.iter()
        .map(|&xi| {
            if xi < xp[0] {
                left
            } else if xi > xp[last] {
                right
            } else {
                let j = xp.partition_point(|&v| v <= xi);
                if j == 0 {
                    fp[0]
                } else if j > last {
                    fp[last]
                } else {
                    let (x0, x1) = (xp[j - 1], xp[j]);
                    let (y0, y1) = (fp[j - 1], fp[j]);
                    y0 + (y1 - y0) * (xi - x0) / (x1 - x0)
                }
            }
        })
        .collect()
}
