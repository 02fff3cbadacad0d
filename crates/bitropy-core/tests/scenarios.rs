//! End-to-end estimator scenarios: full pipeline from raw record bytes
//! through preprocessing, tallying, and reporting.

use std::io::{BufRead, Cursor};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bitropy_core::config::EstimatorConfig;
use bitropy_core::entropy::{self, EntropyReport};
use bitropy_core::mapfile::RecordMap;
use bitropy_core::preprocess::Preprocessor;
use bitropy_core::reader::{RecordMode, RecordReader};
use bitropy_core::slice_set::SliceSet;

/// Drive the whole loop the way the CLI does and return the record count
/// and final report.
fn run_stream(
    data: impl BufRead,
    mode: RecordMode,
    preprocessor: &Preprocessor,
    config: EstimatorConfig,
) -> (u64, EntropyReport) {
    let mut reader = RecordReader::new(data, mode);
    let mut slices = SliceSet::new(config).unwrap();
    let mut raw = Vec::new();
    let mut bits = Vec::new();
    let mut records = 0u64;
    while reader.next_record(&mut raw).unwrap() > 0 {
        records += 1;
        if preprocessor.expand(&raw, &mut bits) > 0 {
            slices.record_bits(&bits).unwrap();
        }
    }
    (records, entropy::report(&mut slices, &config))
}

fn line_preprocessor() -> Preprocessor {
    Preprocessor::new(true, false, RecordMap::default())
}

fn binary_preprocessor() -> Preprocessor {
    Preprocessor::new(false, false, RecordMap::default())
}

// =============================================================================
// Scenario: all-zeros stream, line mode
// =============================================================================

#[test]
fn all_zero_lines_have_no_entropy() {
    let input = "0\n".repeat(100);
    let (records, report) = run_stream(
        Cursor::new(input.into_bytes()),
        RecordMode::Line,
        &line_preprocessor(),
        EstimatorConfig::default(),
    );

    assert_eq!(records, 100);
    let high = report.high.expect("high aggregate");
    let low = report.low.expect("low aggregate");
    assert_eq!(high.bit_count, 8, "octet 0x30 expands to 8 bit positions");
    assert_eq!(low.bit_count, 8);
    assert!(high.entropy.abs() < 1e-12);
    assert!(low.entropy.abs() < 1e-12);
    assert!(report.median_entropy.unwrap().abs() < 1e-12);
}

// =============================================================================
// Scenario: uniform random stream, binary mode
// =============================================================================

#[test]
fn uniform_random_bytes_are_near_one_bit_per_bit() {
    let mut rng = StdRng::seed_from_u64(0x0b17_0b17);
    let data: Vec<u8> = (0..5000).map(|_| rng.random()).collect();
    let (records, report) = run_stream(
        Cursor::new(data),
        RecordMode::Binary { record_size: 1 },
        &binary_preprocessor(),
        EstimatorConfig::default(),
    );

    assert_eq!(records, 5000);
    let high = report.high.expect("high aggregate");
    let low = report.low.expect("low aggregate");
    assert_eq!(high.bit_count, 8);
    for summary in &report.slices {
        let slice_high = summary.high.unwrap();
        let slice_low = summary.low.unwrap();
        assert!(
            (0.95..=1.0).contains(&slice_high),
            "bit {} high {slice_high} out of range",
            summary.bit_index
        );
        assert!(
            (0.95..=1.0).contains(&slice_low),
            "bit {} low {slice_low} out of range",
            summary.bit_index
        );
    }
    assert!(high.entropy > 7.6 && high.entropy <= 8.0);
    assert!(low.entropy > 7.6 && low.entropy <= 8.0);
    let median = report.median_entropy.unwrap();
    assert!(median > 7.6 && median <= 8.0);
}

// =============================================================================
// Scenario: constant byte + random byte
// =============================================================================

#[test]
fn constant_plus_noise_splits_cleanly() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut data = Vec::with_capacity(2 * 6000);
    for _ in 0..6000 {
        data.push(0xaa);
        data.push(rng.random());
    }
    let (_, report) = run_stream(
        Cursor::new(data),
        RecordMode::Binary { record_size: 2 },
        &binary_preprocessor(),
        EstimatorConfig::default(),
    );

    assert_eq!(report.slices.len(), 16);
    for summary in &report.slices[..8] {
        assert!(
            summary.high.unwrap() < 1e-12,
            "constant bit {} should carry no entropy",
            summary.bit_index
        );
    }
    for summary in &report.slices[8..] {
        let low = summary.low.unwrap();
        assert!(
            low > 0.95,
            "random bit {} low {low} should be near 1",
            summary.bit_index
        );
    }
    let high = report.high.unwrap();
    assert_eq!(high.bit_count, 16);
    assert!(
        (high.entropy - 8.0).abs() < 0.4,
        "aggregate high {} should be ~8",
        high.entropy
    );
}

// =============================================================================
// Scenario: map-file expansion feeding the tallies
// =============================================================================

#[test]
fn explicit_octet_map_drives_slice_width() {
    let map = RecordMap::parse("61=01001\n").unwrap();
    let preprocessor = Preprocessor::new(true, false, map);
    let input = "aaaa\n".repeat(200);
    let (records, report) = run_stream(
        Cursor::new(input.into_bytes()),
        RecordMode::Line,
        &preprocessor,
        EstimatorConfig::default(),
    );

    assert_eq!(records, 200);
    assert_eq!(report.slices.len(), 20, "5 bits per octet, 4 octets");
    // Every position is constant across records, so entropy collapses.
    let high = report.high.unwrap();
    assert_eq!(high.bit_count, 20);
    assert!(high.entropy.abs() < 1e-12);
}

// =============================================================================
// Scenario: cookie values only
// =============================================================================

#[test]
fn cookie_trim_measures_only_the_value() {
    let preprocessor = Preprocessor::new(true, true, RecordMap::default());
    // Constant cookie value; everything around it varies per record.
    let input: String = (0..120)
        .map(|i| format!("{i}: Set-Cookie: N=abcd1234; path=/{i}\n"))
        .collect();
    let (records, report) = run_stream(
        Cursor::new(input.into_bytes()),
        RecordMode::Line,
        &line_preprocessor(),
        EstimatorConfig::default(),
    );
    assert_eq!(records, 120);
    // Without cookie trim the varying prefix contributes entropy.
    assert!(report.high.unwrap().entropy > 0.1);

    let (_, trimmed) = run_stream(
        Cursor::new(
            (0..120)
                .map(|i| format!("{i}: Set-Cookie: N=abcd1234; path=/{i}\n"))
                .collect::<String>()
                .into_bytes(),
        ),
        RecordMode::Line,
        &preprocessor,
        EstimatorConfig::default(),
    );
    let high = trimmed.high.unwrap();
    assert_eq!(high.bit_count, 64, "8 constant value octets");
    assert!(high.entropy.abs() < 1e-12);
}

// =============================================================================
// Scenario: records widening mid-stream
// =============================================================================

#[test]
fn widening_records_leave_late_slices_undersampled() {
    let config = EstimatorConfig::new(2, 2, 1).unwrap();
    let mut slices = SliceSet::new(config).unwrap();
    for _ in 0..50 {
        slices.record_bits(&[1]).unwrap();
    }
    for _ in 0..50 {
        slices.record_bits(&[1, 0]).unwrap();
    }
    let report = entropy::report(&mut slices, &config);

    assert_eq!(report.slices.len(), 2);
    assert!(report.slices[0].samples > report.slices[1].samples);
    // Both slices are constant streams, so both estimates are zero; the
    // report still shows the sampling imbalance.
    assert_eq!(report.slices[0].samples, 97);
    assert_eq!(report.slices[1].samples, 47);
}
