//! bitropy CLI - measure the amount of entropy found within input records.
//!
//! Thin driver over `bitropy-core`: parse flags, open the input, then loop
//! read → preprocess → update, reporting periodically when asked and once
//! more at end of input. Reports go to stdout; diagnostics go to stderr
//! through `tracing`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use bitropy_core::config::EstimatorConfig;
use bitropy_core::entropy::{self, EntropyReport};
use bitropy_core::logging;
use bitropy_core::mapfile::RecordMap;
use bitropy_core::preprocess::Preprocessor;
use bitropy_core::reader::{RecordMode, RecordReader};
use bitropy_core::slice_set::SliceSet;

#[derive(Parser, Debug)]
#[command(
    name = "bitropy",
    version,
    about = "Measure the amount of entropy found within input records"
)]
struct Cli {
    /// Report entropy every N records (0 = final report only)
    #[arg(short = 'c', long, value_name = "N", default_value_t = 0)]
    report_cycle: u64,

    /// Tally depth for each record bit
    #[arg(
        short = 'b',
        long,
        value_name = "N",
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(1..=31)
    )]
    bit_depth: u32,

    /// Xor differences against history this many records back
    #[arg(
        short = 'B',
        long,
        value_name = "N",
        default_value_t = 32,
        value_parser = clap::value_parser!(u32).range(1..=32)
    )]
    back_history: u32,

    /// Average cell tally needed before a depth contributes to estimates
    #[arg(
        short = 'f',
        long,
        value_name = "N",
        default_value_t = 4,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    depth_factor: u64,

    /// Read fixed rec-size octet records instead of lines
    #[arg(
        short = 'r',
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
        conflicts_with_all = ["keep_newlines", "cookie_trim"]
    )]
    record_size: Option<u64>,

    /// Do not discard trailing newlines (line mode only)
    #[arg(short = 'k', long)]
    keep_newlines: bool,

    /// Map file: octet mask, octet-to-bit map, bit mask
    #[arg(short = 'm', long, value_name = "FILE")]
    map_file: Option<PathBuf>,

    /// Keep text after the first '=' and before the first ';' (line mode only)
    #[arg(short = 'C', long)]
    cookie_trim: bool,

    /// Increase diagnostic verbosity (repeatable)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit the final report as JSON
    #[arg(long)]
    json: bool,

    /// File to read records from (- = standard input)
    #[arg(value_name = "INPUT")]
    input: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(cli.verbose) {
        eprintln!("bitropy: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }
    if let Err(err) = run(&cli) {
        eprintln!("bitropy: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> Result<()> {
    let config = EstimatorConfig::new(cli.bit_depth, cli.back_history, cli.depth_factor)?;
    let map = match &cli.map_file {
        Some(path) => RecordMap::from_path(path)
            .with_context(|| format!("failed to load map file: {}", path.display()))?,
        None => RecordMap::default(),
    };

    let line_mode = cli.record_size.is_none();
    let preprocessor = Preprocessor::new(line_mode && !cli.keep_newlines, cli.cookie_trim, map);
    let mode = cli.record_size.map_or(RecordMode::Line, |size| {
        RecordMode::Binary {
            record_size: size as usize,
        }
    });

    let input: Box<dyn BufRead> = if cli.input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("unable to open for reading: {}", cli.input))?;
        Box::new(BufReader::new(file))
    };
    let mut reader = RecordReader::new(input, mode);
    let mut slices = SliceSet::new(config)?;

    let mut raw = Vec::new();
    let mut bits = Vec::new();
    let mut records: u64 = 0;
    loop {
        match reader.next_record(&mut raw) {
            Ok(0) => break,
            Ok(octets) => debug!(record = records, octets, "read record"),
            Err(err) => {
                // A mid-stream read error ends the run but whatever has
                // been accumulated is still reported.
                warn!(records, "read error: {err}");
                break;
            }
        }
        records += 1;

        if preprocessor.expand(&raw, &mut bits) == 0 {
            debug!(record = records, "record produced no bits");
            continue;
        }
        slices.record_bits(&bits)?;

        // Progress lines are text-only: in JSON mode stdout must stay a
        // single object.
        if !cli.json && cli.report_cycle > 0 && records % cli.report_cycle == 0 {
            let report = entropy::report(&mut slices, &config);
            print_progress(records, &report);
        }
    }

    if slices.is_empty() && !cli.json {
        println!("Error: nothing to process");
    }
    let report = entropy::report(&mut slices, &config);
    if cli.json {
        print_json(records, &report)?;
    } else {
        print_final(records, &report);
    }
    Ok(())
}

fn print_progress(records: u64, report: &EntropyReport) {
    if let Some(high) = report.high {
        println!(
            "after record {records} for {} bits: high entropy: {:.6}",
            high.bit_count, high.entropy
        );
    }
    if let Some(low) = report.low {
        println!(
            "after record {records} for {} bits: low entropy: {:.6}",
            low.bit_count, low.entropy
        );
    }
    if let (Some(low), Some(median)) = (report.low, report.median_entropy) {
        println!(
            "after record {records} for {} bits: median entropy: {median:.6}",
            low.bit_count
        );
    }
    if report.high.is_some() {
        println!();
    }
}

fn print_final(records: u64, report: &EntropyReport) {
    println!();
    println!("Entropy report:");
    if let Some(high) = report.high {
        println!(
            "record count: {records} with {} bits: high entropy: {:.6}",
            high.bit_count, high.entropy
        );
    } else {
        println!("Error: not enough data to calculate high entropy estimate");
    }
    if let Some(low) = report.low {
        println!(
            "record count: {records} with {} bits: low entropy: {:.6}",
            low.bit_count, low.entropy
        );
    } else {
        println!("Error: not enough data to calculate low entropy estimate");
    }
    match (report.high, report.low, report.median_entropy) {
        (Some(high), Some(low), Some(median)) => {
            println!(
                "high, median and low entropy: {:.6} {median:.6} {:.6}",
                high.entropy, low.entropy
            );
            println!();
        }
        _ => println!("Error: not enough data to calculate median entropy estimate"),
    }
}

fn print_json(records: u64, report: &EntropyReport) -> Result<()> {
    let mut value = serde_json::to_value(report).context("failed to serialize report")?;
    value["record_count"] = serde_json::Value::from(records);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
