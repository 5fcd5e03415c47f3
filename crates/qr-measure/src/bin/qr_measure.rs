#[cfg(feature = "image")]
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use qr_measure::core::{calibrate_with, measure, CalibrationParams, ScaleModel};
use qr_measure::{parse_payload, Measurement, Rect};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "qr-measure", version)]
#[command(about = "Measure boxes in a photo using a QR marker that encodes its own size")]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace); defaults to
    /// `QR_MEASURE_LOG`, then `warn`
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calibrate on one marker and measure boxes given on the command line.
    Measure {
        /// Marker payload JSON, e.g. '{"width":5,"height":5,"units":"cm"}'
        #[arg(long)]
        payload: String,
        /// Marker rectangle in image pixels as x,y,w,h
        #[arg(long, value_parser = parse_rect)]
        marker: Rect,
        /// Box to measure as x,y,w,h (repeatable)
        #[arg(long = "box", value_parser = parse_rect)]
        boxes: Vec<Rect>,
        #[arg(long, value_enum, default_value_t = ModelArg::WidthOnly)]
        model: ModelArg,
        /// Print a JSON document instead of labels
        #[arg(long)]
        json: bool,
    },
    /// Detect markers in an image and measure the boxes from a JSON config.
    #[cfg(feature = "image")]
    Scan {
        config: PathBuf,
        /// Report path; overrides `output_path` from the config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelArg {
    WidthOnly,
    MeanOfAxes,
}

impl From<ModelArg> for ScaleModel {
    fn from(m: ModelArg) -> Self {
        match m {
            ModelArg::WidthOnly => ScaleModel::WidthOnly,
            ModelArg::MeanOfAxes => ScaleModel::MeanOfAxes,
        }
    }
}

#[derive(Serialize)]
struct MeasureOutput {
    scale_factor: f64,
    unit: String,
    boxes: Vec<BoxOutput>,
}

#[derive(Serialize)]
struct BoxOutput {
    rect: Rect,
    measurement: Measurement,
    label: String,
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in {s:?}: {e}"))?;
    let &[x, y, w, h] = parts.as_slice() else {
        return Err(format!("expected x,y,w,h, got {s:?}"));
    };
    Ok(Rect::new(x, y, w, h))
}

fn init_logging(level: Option<LevelFilter>) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    qr_measure::core::init_tracing(false, level)?;
    #[cfg(not(feature = "tracing"))]
    match level {
        Some(level) => qr_measure::core::init_with_level(level)?,
        None => qr_measure::core::init_from_env(LevelFilter::Warn)?,
    }
    Ok(())
}

fn run_measure(
    payload: &str,
    marker: &Rect,
    boxes: &[Rect],
    model: ModelArg,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let size = parse_payload(payload)?;
    let params = CalibrationParams {
        scale_model: model.into(),
    };
    let cal = calibrate_with(marker, &size, &params)?;
    log::info!("scale: {:.4} px per {}", cal.scale_factor(), cal.unit());

    let mut out = MeasureOutput {
        scale_factor: cal.scale_factor(),
        unit: cal.unit().to_string(),
        boxes: Vec::with_capacity(boxes.len()),
    };
    for rect in boxes {
        let m = measure(rect, &cal)?;
        out.boxes.push(BoxOutput {
            rect: *rect,
            label: m.label(),
            measurement: m,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for b in &out.boxes {
            println!("{}", b.label);
        }
    }
    Ok(())
}

#[cfg(feature = "image")]
fn run_scan(
    config: &std::path::Path,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    use qr_measure::detect::measure_image;
    use qr_measure::io::MeasureConfig;

    let cfg = MeasureConfig::load_json(config)?;
    let report = measure_image(&cfg)?;
    let out_path = output.unwrap_or_else(|| cfg.output_path());
    report.write_json(&out_path)?;
    println!(
        "{:?}: {} marker(s), {} box(es), 1 {} = {:.3} px -> {}",
        report.status,
        report.markers.len(),
        report.boxes.len(),
        report.unit,
        report.scale_factor,
        out_path.display()
    );
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(cli.log_level)?;

    match cli.command {
        Command::Measure {
            payload,
            marker,
            boxes,
            model,
            json,
        } => run_measure(&payload, &marker, &boxes, model, json),
        #[cfg(feature = "image")]
        Command::Scan { config, output } => run_scan(&config, output),
    }
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
