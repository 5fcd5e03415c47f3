//! Core of QR-marker photo measurement.
//!
//! A printed marker encodes its own physical size. Once a detector has found
//! the marker in a photo, [`calibrate`] turns its pixel width into a scale
//! factor and [`measure`] reports any other rectangle in the marker's units.
//!
//! This crate is purely computational: no image types, no decoding, no I/O.
//! Detectors plug in through [`MarkerDetector`].
//!
//! ```
//! use qr_measure_core::{calibrate, measure, parse_payload, Rect};
//!
//! let size = parse_payload(r#"{"width": 5, "height": 5, "units": "cm"}"#).unwrap();
//! let cal = calibrate(&Rect::new(0.0, 0.0, 200.0, 200.0), &size).unwrap();
//! let m = measure(&Rect::new(10.0, 10.0, 400.0, 80.0), &cal).unwrap();
//! assert_eq!(m.label(), "10.00 cm \n 2.00 cm");
//! ```

mod affine;
mod calibration;
mod error;
mod frame;
mod geometry;
mod logger;
mod measured_box;
mod payload;

pub use affine::AffineMap;
pub use calibration::{
    calibrate, calibrate_with, measure, CalibrationParams, CalibrationState, Measurement,
    ScaleModel, RAW_PIXEL_UNIT,
};
pub use error::{CalibrationError, PayloadError};
pub use frame::{
    apply_observations, FrameOutcome, FrameStatus, MarkerDetector, MarkerObservation,
    MarkerResult,
};
pub use geometry::{Rect, Size};
pub use measured_box::{
    BoxDrag, HorizontalHandle, MeasuredBox, VerticalHandle, DEFAULT_BOX_SIDE,
};
pub use payload::{parse_payload, MarkerPhysicalSize};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV};
