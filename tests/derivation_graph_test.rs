//! Integration tests for the derivation graph.
//!
//! Exercises the full pipeline from raw sea/air pressure records to water
//! levels: alignment and slicing, surge/wave separation, clipping, and the
//! memoization contract (idempotence, reset).

use std::f64::consts::PI;

use stormtide::{
    Deployment, DerivationGraph, EngineError, ProcessingOptions, Salinity, SensorRecord,
    TimeCoverage, WindRecord,
};
use stormtide::units::meters_to_dbar;

const FS: f64 = 4.0;
const AIR_PRESSURE_DBAR: f64 = 10.2;

/// Synthetic deployment: sensor 1.5 m above the bed, 3 m of still water,
/// a 0.2 m wave at 0.1 Hz riding on top.
fn sea_record(n: usize, still_depth_m: f64, wave_amp_m: f64) -> SensorRecord {
    let time_ms: Vec<i64> = (0..n).map(|i| (i as f64 * 1000.0 / FS) as i64).collect();
    let pressure_dbar = time_ms
        .iter()
        .map(|&ms| {
            let t = ms as f64 / 1000.0;
            AIR_PRESSURE_DBAR
                + meters_to_dbar(still_depth_m, Salinity::Salt)
                + meters_to_dbar(wave_amp_m, Salinity::Salt) * (2.0 * PI * 0.1 * t).sin()
        })
        .collect();
    SensorRecord {
        time_ms,
        pressure_dbar,
    }
}

/// Constant-pressure air record sampled every 10 s over [start_s, stop_s].
fn air_record(start_s: i64, stop_s: i64) -> SensorRecord {
    let time_ms: Vec<i64> = (start_s..=stop_s).step_by(10).map(|s| s * 1000).collect();
    let pressure_dbar = vec![AIR_PRESSURE_DBAR; time_ms.len()];
    SensorRecord {
        time_ms,
        pressure_dbar,
    }
}

fn deployment() -> Deployment {
    Deployment {
        latitude: 29.5,
        longitude: -89.9,
        station_id: "SSS-LA-JEF-001".into(),
        instrument_id: "WL-7100".into(),
        air_station_id: "SSS-LA-JEF-002".into(),
        air_instrument_id: "BP-7200".into(),
        datum: "NAVD88".into(),
        salinity: Salinity::Salt,
        sensor_orifice_elevation: (-1.5, -1.5),
        land_surface_elevation: (-3.0, -3.0),
        sea_accuracy_m: 0.0107,
        air_accuracy_m: 0.0107,
    }
}

fn graph(n: usize) -> DerivationGraph {
    let seconds = (n as f64 / FS) as i64;
    DerivationGraph::new(
        sea_record(n, 3.0, 0.2),
        air_record(-100, seconds + 100),
        deployment(),
        ProcessingOptions::default(),
    )
}

#[test]
fn test_surge_level_recovers_still_water() {
    let mut graph = graph(10_000);
    assert_eq!(graph.time_comparison().unwrap(), TimeCoverage::Full);

    // The 0.1 Hz wave is far above the surge cutoff: the surge level is
    // the still-water surface, orifice elevation plus 3 m of depth.
    let surge = graph.get_surge_water_level().unwrap().to_vec();
    for (i, &level) in surge.iter().enumerate() {
        assert!(
            (level - 1.5).abs() < 0.02,
            "surge level off at sample {}: {} m, expected 1.5 m",
            i,
            level
        );
    }

    let raw = graph.get_raw_water_level().unwrap();
    let raw_mean = raw.iter().sum::<f64>() / raw.len() as f64;
    assert!(
        (raw_mean - 1.5).abs() < 0.005,
        "raw level mean {} m, expected 1.5 m",
        raw_mean
    );
}

#[test]
fn test_wave_level_carries_the_wave_band() {
    let mut graph = graph(10_000);

    let wave = graph.get_wave_water_level().unwrap().to_vec();
    let rms = (wave.iter().map(|v| v * v).sum::<f64>() / wave.len() as f64).sqrt();
    let expected = 0.2 / 2.0_f64.sqrt();
    assert!(
        (rms - expected).abs() < 0.1 * expected,
        "wave RMS {} m, expected {} m",
        rms,
        expected
    );

    // Wave level is exactly raw minus surge, sample by sample.
    let raw = graph.get_raw_water_level().unwrap().to_vec();
    let surge = graph.get_surge_water_level().unwrap().to_vec();
    for i in 0..wave.len() {
        assert!((wave[i] - (raw[i] - surge[i])).abs() < 1e-12);
    }
}

#[test]
fn test_partial_overlap_truncates_the_record() {
    let sea = sea_record(10_000, 3.0, 0.2);
    let air = air_record(1250, 5000);
    let mut graph = DerivationGraph::new(sea, air, deployment(), ProcessingOptions::default());

    assert_eq!(graph.time_comparison().unwrap(), TimeCoverage::Partial);
    assert_eq!(graph.time_comparison().unwrap().code(), 1);

    let time = graph.get_sea_time().unwrap();
    assert!(
        time[0] >= 1_250_000.0,
        "sliced record starts at {} ms, before air coverage",
        time[0]
    );
    assert!(*time.last().unwrap() < 2_500_000.0);

    // Derived series shrink with the slice.
    let n = time.len();
    assert_eq!(graph.get_corrected_sea_pressure().unwrap().len(), n);
    assert_eq!(graph.get_surge_water_level().unwrap().len(), n);
}

#[test]
fn test_disjoint_records_are_fatal() {
    let sea = sea_record(4000, 3.0, 0.2);
    let air = air_record(10_000, 20_000);
    let mut graph = DerivationGraph::new(sea, air, deployment(), ProcessingOptions::default());

    assert_eq!(graph.time_comparison().unwrap(), TimeCoverage::Disjoint);
    assert_eq!(graph.time_comparison().unwrap().code(), 2);
    assert!(matches!(
        graph.get_surge_water_level(),
        Err(EngineError::DisjointSeries)
    ));
}

#[test]
fn test_getters_are_idempotent_bit_for_bit() {
    let mut graph = graph(10_000);

    let first: Vec<u64> = graph
        .get_surge_water_level()
        .unwrap()
        .iter()
        .map(|v| v.to_bits())
        .collect();
    let second: Vec<u64> = graph
        .get_surge_water_level()
        .unwrap()
        .iter()
        .map(|v| v.to_bits())
        .collect();
    assert_eq!(first, second, "repeated getter changed the cached series");
}

#[test]
fn test_reset_reproduces_the_same_results() {
    let mut graph = graph(10_000);

    let before: Vec<u64> = graph
        .get_raw_water_level()
        .unwrap()
        .iter()
        .map(|v| v.to_bits())
        .collect();
    graph.reset();
    let after: Vec<u64> = graph
        .get_raw_water_level()
        .unwrap()
        .iter()
        .map(|v| v.to_bits())
        .collect();
    assert_eq!(before, after, "reset changed deterministic output");
}

#[test]
fn test_clip_nulls_raw_but_not_surge() {
    // Shallow deployment: the wave trough dips below the orifice, the
    // surge level stays above it.
    let sea = sea_record(10_000, 0.2, 0.25);
    let air = air_record(-100, 2600);
    let options = ProcessingOptions {
        clip: true,
        ..ProcessingOptions::default()
    };
    let mut graph = DerivationGraph::new(sea, air, deployment(), options);

    let raw = graph.get_raw_water_level().unwrap().to_vec();
    let clipped = raw.iter().filter(|v| v.is_nan()).count();
    assert!(clipped > 0, "expected trough samples below the orifice");
    assert!(clipped < raw.len(), "crest samples must survive");

    let surge = graph.get_surge_water_level().unwrap();
    assert!(
        surge.iter().all(|v| !v.is_nan()),
        "surge level should not clip when it never dips below the sensor"
    );

    // Wave level inherits the raw NaNs.
    let wave = graph.get_wave_water_level().unwrap();
    for i in 0..wave.len() {
        assert_eq!(wave[i].is_nan(), raw[i].is_nan(), "sample {}", i);
    }
}

#[test]
fn test_wind_speed_interpolates_onto_sea_time() {
    let n = 4000;
    let wind = WindRecord {
        time_ms: vec![-100_000, 500_000, 1_200_000],
        u: vec![3.0, 3.0, 3.0],
        v: vec![4.0, 4.0, 4.0],
    };
    let mut graph = DerivationGraph::new(
        sea_record(n, 3.0, 0.2),
        air_record(-100, 1100),
        deployment(),
        ProcessingOptions::default(),
    )
    .with_wind(wind);

    let record_len = graph.get_sea_time().unwrap().len();
    let speed = graph.get_wind_speed().unwrap();
    assert_eq!(speed.len(), record_len);
    assert!(speed.iter().all(|&s| (s - 5.0).abs() < 1e-9));
}

#[test]
fn test_missing_wind_record_errors() {
    let mut graph = graph(4000);
    assert!(matches!(
        graph.get_wind_speed(),
        Err(EngineError::MissingInput("wind record"))
    ));
}

#[test]
fn test_slow_record_allows_surge_but_not_waves() {
    // 1 Hz record: fine for the storm-tide filter, too slow for wave
    // statistics.
    let time_ms: Vec<i64> = (0..5000).map(|i| i * 1000).collect();
    let pressure = time_ms
        .iter()
        .map(|_| AIR_PRESSURE_DBAR + meters_to_dbar(3.0, Salinity::Salt))
        .collect();
    let sea = SensorRecord {
        time_ms,
        pressure_dbar: pressure,
    };
    let mut graph = DerivationGraph::new(
        sea,
        air_record(-100, 5100),
        deployment(),
        ProcessingOptions::default(),
    );

    assert!(graph.get_surge_water_level().is_ok());
    match graph.get_wave_statistics() {
        Err(EngineError::InsufficientSamplingRate { required, actual }) => {
            assert_eq!(required, 4.0);
            assert!((actual - 1.0).abs() < 1e-9);
        }
        other => panic!("expected InsufficientSamplingRate, got {:?}", other.err()),
    }
}

#[test]
fn test_formatted_times_follow_display_timezone() {
    let options = ProcessingOptions {
        timezone: stormtide::Timezone::Eastern,
        daylight_savings: true,
        ..ProcessingOptions::default()
    };
    let graph = DerivationGraph::new(
        sea_record(100, 3.0, 0.0),
        air_record(-100, 200),
        deployment(),
        options,
    );

    let formatted = graph.get_formatted_sea_time().unwrap();
    assert_eq!(formatted.len(), 100);
    // EDT is UTC-4; the underlying instant is unchanged.
    assert_eq!(formatted[0].offset().local_minus_utc(), -4 * 3600);
    assert_eq!(formatted[0].timestamp_millis(), 0);
}
