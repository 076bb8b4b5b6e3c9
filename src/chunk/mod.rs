//! Fixed-length overlapping analysis windows for spectral estimation.
//!
//! Wave statistics are computed per window, not per record: the record is
//! partitioned into 4096-sample chunks advancing by 2048 samples, so
//! consecutive chunks overlap by 50%. At the nominal 4 Hz sampling rate
//! that is a ~17-minute window every ~8.5 minutes.
//!
//! Records shorter than one window yield zero chunks; callers treat that
//! as "no statistics available", not as an error.

/// Samples per analysis window.
pub const CHUNK_LENGTH: usize = 4096;

/// Samples between consecutive window starts (50% overlap).
pub const CHUNK_STRIDE: usize = 2048;

/// Number of chunks produced from a record of `n` samples.
pub fn chunk_count(n: usize) -> usize {
    if n < CHUNK_LENGTH {
        0
    } else {
        1 + (n - CHUNK_LENGTH) / CHUNK_STRIDE
    }
}

/// One analysis window of the sliced record.
///
/// Owns its time and pressure sub-arrays plus the window means of the
/// interpolated elevations, which set the local water depth for the
/// spectral depth correction.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Sample times in seconds (UTC epoch seconds).
    pub time_s: Vec<f64>,
    /// Corrected sea pressure in decibars.
    pub pressure_dbar: Vec<f64>,
    /// Mean land-surface elevation over the window, meters above datum.
    pub land_surface_elevation: f64,
    /// Mean sensor-orifice elevation over the window, meters above datum.
    pub sensor_orifice_elevation: f64,
    /// Mean wind speed over the window in m/s, when a wind record exists.
    pub wind_speed: Option<f64>,
}

impl Chunk {
    /// Sample interval in seconds.
    pub fn dt(&self) -> f64 {
        if self.time_s.len() < 2 {
            0.0
        } else {
            self.time_s[1] - self.time_s[0]
        }
    }

    /// Whether any pressure sample in the window is NaN.
    ///
    /// A NaN window produces NaN for every statistic; there is no partial
    /// computation from partially valid windows.
    pub fn has_nan(&self) -> bool {
        self.pressure_dbar.iter().any(|v| v.is_nan())
    }
}

/// Lazy, restartable iterator over the analysis windows of a record.
///
/// Borrows the sliced arrays and materializes one [`Chunk`] at a time.
/// Cloning the iterator restarts the sequence.
#[derive(Clone, Debug)]
pub struct Chunker<'a> {
    time_ms: &'a [f64],
    pressure_dbar: &'a [f64],
    land_surface_elevation: &'a [f64],
    sensor_orifice_elevation: &'a [f64],
    wind_speed: Option<&'a [f64]>,
    start: usize,
}

impl<'a> Chunker<'a> {
    /// Window iterator over parallel time (ms), pressure, and elevation
    /// arrays, with an optional wind-speed array on the same time base.
    pub fn new(
        time_ms: &'a [f64],
        pressure_dbar: &'a [f64],
        land_surface_elevation: &'a [f64],
        sensor_orifice_elevation: &'a [f64],
        wind_speed: Option<&'a [f64]>,
    ) -> Self {
        Self {
            time_ms,
            pressure_dbar,
            land_surface_elevation,
            sensor_orifice_elevation,
            wind_speed,
            start: 0,
        }
    }

    /// Rewind to the first window.
    pub fn reset(&mut self) {
        self.start = 0;
    }

    /// Number of windows this iterator will produce in total.
    pub fn len_hint(&self) -> usize {
        chunk_count(self.pressure_dbar.len())
    }
}

impl<'a> Iterator for Chunker<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let end = self.start.checked_add(CHUNK_LENGTH)?;
        if end > self.pressure_dbar.len() {
            return None;
        }
        let range = self.start..end;

        let chunk = Chunk {
            time_s: self.time_ms[range.clone()].iter().map(|t| t / 1000.0).collect(),
            pressure_dbar: self.pressure_dbar[range.clone()].to_vec(),
            land_surface_elevation: mean(&self.land_surface_elevation[range.clone()]),
            sensor_orifice_elevation: mean(&self.sensor_orifice_elevation[range.clone()]),
            wind_speed: self.wind_speed.map(|w| mean(&w[range])),
        };

        self.start += CHUNK_STRIDE;
        Some(chunk)
    }
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        data.iter().sum::<f64>() / data.len() as f64
    }
}
