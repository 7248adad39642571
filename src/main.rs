//! Pointstat CLI - Decode a point cloud and frame series, write the report.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use pointstat::{
    Statistic, ViewerConfig, ViewerSession,
    export::{CompressionType, write_snapshot},
};

fn print_usage(program: &str) {
    eprintln!("Usage: {program} <points.csv> <frames.csv> [report.txt] [options]");
    eprintln!();
    eprintln!("Decode a point cloud and its per-point frame series, then write");
    eprintln!("the per-point statistics report.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  points.csv   Comma separated x,y,z per line");
    eprintln!("  frames.csv   Comma separated readings per point per line");
    eprintln!("  report.txt   Output report path (default: stdout summary only)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <config.json>    Viewer configuration");
    eprintln!("  --snapshot <out.psts>     Also write a binary snapshot");
    eprintln!("  --example-config          Print the default configuration");
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("Error {context}: {err}");
    std::process::exit(1);
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pointstat");

    if args.iter().any(|a| a == "--example-config") {
        print_example_config();
        return;
    }

    let mut positional = Vec::new();
    let mut config_path: Option<PathBuf> = None;
    let mut snapshot_path: Option<PathBuf> = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" => config_path = rest.next().map(PathBuf::from),
            "--snapshot" => snapshot_path = rest.next().map(PathBuf::from),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    if positional.len() < 2 {
        print_usage(program);
        std::process::exit(1);
    }

    // Load configuration
    let config = match &config_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .unwrap_or_else(|e| fail("reading config file", e));
            ViewerConfig::from_json(&json).unwrap_or_else(|e| fail("parsing config", e))
        }
        None => ViewerConfig::default(),
    };

    let mut session = ViewerSession::new(config).unwrap_or_else(|e| fail("in config", e));

    let start = Instant::now();

    let point_bytes = fs::read(&positional[0]).unwrap_or_else(|e| fail("reading points", e));
    let point_count = session
        .load_geometry(&point_bytes)
        .unwrap_or_else(|e| fail("decoding points", e));

    let frame_bytes = fs::read(&positional[1]).unwrap_or_else(|e| fail("reading frames", e));
    session
        .load_frames(&frame_bytes)
        .unwrap_or_else(|e| fail("decoding frames", e));

    let elapsed = start.elapsed();

    println!("Pointstat");
    println!("=========");
    println!("Points: {point_count}");

    if let (Some(geometry), Some(dataset)) = (session.geometry(), session.dataset()) {
        let summary = dataset.summary();
        println!("Frames per point: {}", summary.frames_per_point);
        println!("Missing readings: {}", summary.missing_readings);
        if let (Some(lo), Some(hi)) = (summary.min_reading, summary.max_reading) {
            println!("Reading range: [{lo}, {hi}]");
        }
        for statistic in [Statistic::Mean, Statistic::StdDev] {
            let values = dataset.statistic(statistic);
            let valid: Vec<f32> = values.iter().copied().filter(|v| !v.is_nan()).collect();
            if !valid.is_empty() {
                let average = valid.iter().sum::<f32>() / valid.len() as f32;
                println!("Average {}: {average:.6}", statistic.label().to_lowercase());
            }
        }
        println!(
            "Decoded {} bytes in {:.2} ms",
            point_bytes.len() + frame_bytes.len(),
            elapsed.as_secs_f64() * 1000.0
        );

        if let Some(path) = &snapshot_path {
            let file = fs::File::create(path).unwrap_or_else(|e| fail("creating snapshot", e));
            let compression = if cfg!(feature = "lz4") {
                CompressionType::Lz4
            } else {
                CompressionType::None
            };
            write_snapshot(&mut BufWriter::new(file), geometry, dataset, compression)
                .unwrap_or_else(|e| fail("writing snapshot", e));
            println!("Snapshot written to {}", path.display());
        }
    }

    if let Some(report_path) = positional.get(2) {
        let report = session
            .export()
            .unwrap_or_else(|e| fail("serializing report", e));
        fs::write(report_path, report).unwrap_or_else(|e| fail("writing report", e));
        println!("Report written to {}", report_path.display());
    }
}

fn print_example_config() {
    let config = ViewerConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{json}"),
        Err(e) => fail("serializing config", e),
    }
}
