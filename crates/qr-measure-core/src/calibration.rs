//! Scale calibration from a marker and box measurement in physical units.
//!
//! All rectangles here are in the image's native pixel space. Mapping from a
//! scaled on-screen presentation is done beforehand with
//! [`AffineMap`](crate::AffineMap).

use serde::{Deserialize, Serialize};

use crate::{CalibrationError, MarkerPhysicalSize, Rect};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Unit label reported before any marker has been seen.
pub const RAW_PIXEL_UNIT: &str = "px";

/// How the marker's pixel extent is related to its physical size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleModel {
    /// Perimeter of a square with the marker's width, on both sides.
    /// The marker height is carried but does not affect the scale.
    #[default]
    WidthOnly,
    /// Full rectangle perimeter, using both width and height.
    MeanOfAxes,
}

/// Calibration settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    #[serde(default)]
    pub scale_model: ScaleModel,
}

/// Pixel-to-unit scale currently in effect.
///
/// Replaced as a whole on every successful calibration. The default is the
/// uncalibrated state: one pixel per unit, reported as `"px"`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalibrationState {
    scale_factor: f64,
    unit: String,
    calibrated: bool,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            unit: RAW_PIXEL_UNIT.to_string(),
            calibrated: false,
        }
    }
}

impl CalibrationState {
    /// Pixels per one physical unit. Always finite and positive.
    #[inline]
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    #[inline]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// `true` once a marker has produced this state, even one that encodes
    /// its size in `"px"` at one pixel per unit.
    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }
}

/// A rectangle's extent in physical units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub width: f64,
    pub height: f64,
    pub unit: String,
}

impl Measurement {
    /// Two-line label, e.g. `"10.00 cm \n 2.00 cm"`.
    pub fn label(&self) -> String {
        format!(
            "{:.2} {} \n {:.2} {}",
            self.width, self.unit, self.height, self.unit
        )
    }
}

/// Calibrate with [`ScaleModel::WidthOnly`].
pub fn calibrate(
    marker: &Rect,
    payload: &MarkerPhysicalSize,
) -> Result<CalibrationState, CalibrationError> {
    calibrate_with(marker, payload, &CalibrationParams::default())
}

/// Derive pixels-per-unit from a marker rectangle and its encoded size.
///
/// Fails without producing a state when the rectangle is invalid, the
/// physical size cannot be divided by, or the resulting scale is not a
/// finite positive number.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(payload, params), fields(unit = %payload.unit))
)]
pub fn calibrate_with(
    marker: &Rect,
    payload: &MarkerPhysicalSize,
    params: &CalibrationParams,
) -> Result<CalibrationState, CalibrationError> {
    if !marker.is_valid() {
        return Err(CalibrationError::InvalidRect(*marker));
    }
    let degenerate = || CalibrationError::Degenerate {
        marker_px: marker.width,
        physical: payload.width,
    };
    if !(payload.width.is_finite() && payload.width > 0.0) {
        return Err(degenerate());
    }

    let (pixel_perimeter, physical_perimeter) = match params.scale_model {
        ScaleModel::WidthOnly => (4.0 * marker.width, 4.0 * payload.width),
        ScaleModel::MeanOfAxes => {
            if !(payload.height.is_finite() && payload.height > 0.0) {
                return Err(degenerate());
            }
            (
                2.0 * (marker.width + marker.height),
                2.0 * (payload.width + payload.height),
            )
        }
    };

    let scale_factor = pixel_perimeter / physical_perimeter;
    if !(scale_factor.is_finite() && scale_factor > 0.0) {
        return Err(degenerate());
    }

    log::debug!(
        "1 {} is {:.4} px (marker {:.1}x{:.1} px)",
        payload.unit,
        scale_factor,
        marker.width,
        marker.height
    );

    Ok(CalibrationState {
        scale_factor,
        unit: payload.unit.clone(),
        calibrated: true,
    })
}

/// Convert a rectangle's width and height to physical units.
pub fn measure(
    rect: &Rect,
    calibration: &CalibrationState,
) -> Result<Measurement, CalibrationError> {
    if !rect.is_valid() {
        return Err(CalibrationError::InvalidRect(*rect));
    }
    Ok(Measurement {
        width: rect.width / calibration.scale_factor,
        height: rect.height / calibration.scale_factor,
        unit: calibration.unit.clone(),
    })
}
