//! Measure boxes in a photo using a QR marker that encodes its own size.
//!
//! This crate provides:
//! - re-exports of the computational core (`qr-measure-core`)
//! - JSON config/report types for measurement runs ([`io`])
//! - (feature `image`) QR detection with `rqrr` and an end-to-end
//!   [`detect::measure_image`] helper
//! - (feature `cli`) the `qr-measure` binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use qr_measure::detect;
//! use qr_measure::io::MeasureConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = MeasureConfig::load_json("measure.json")?;
//! let report = detect::measure_image(&cfg)?;
//! for b in &report.boxes {
//!     println!("{}", b.label.as_deref().unwrap_or("-"));
//! }
//! # Ok(())
//! # }
//! ```

pub use qr_measure_core as core;

pub use qr_measure_core::{
    calibrate, measure, parse_payload, AffineMap, CalibrationState, MarkerObservation,
    Measurement, Rect, Size,
};

pub mod io;

#[cfg(feature = "image")]
pub mod detect;
