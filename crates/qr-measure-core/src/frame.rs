//! Applying one detector result to the caller's calibration.

use serde::{Deserialize, Serialize};

use crate::{
    calibrate_with, parse_payload, AffineMap, CalibrationError, CalibrationParams,
    CalibrationState, Rect,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One marker reported by a detector.
///
/// `rect` is in whatever space the detector works in; `payload` is `None`
/// when the symbol was located but its content could not be read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerObservation {
    pub rect: Rect,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Source of marker observations for an image.
///
/// Implementations block until detection finishes. The core never calls a
/// detector itself; callers run it and pass the result to
/// [`apply_observations`].
pub trait MarkerDetector {
    type Image: ?Sized;

    fn detect(&self, image: &Self::Image) -> Vec<MarkerObservation>;
}

/// What happened to a single observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarkerResult {
    Applied { scale_factor: f64, unit: String },
    NoPayload,
    Skipped { reason: String },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// The detector reported no markers.
    NothingDetected,
    /// Markers were seen but none produced a calibration.
    NoUsableMarker,
    /// At least one marker was applied.
    Calibrated,
}

/// Result of [`apply_observations`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameOutcome {
    /// Calibration after the frame. Equal to the input when nothing applied.
    pub state: CalibrationState,
    pub status: FrameStatus,
    /// One entry per observation, in detector order.
    pub markers: Vec<MarkerResult>,
}

impl FrameOutcome {
    pub fn applied_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| matches!(m, MarkerResult::Applied { .. }))
            .count()
    }
}

/// Calibrate against every observation in order.
///
/// Each successful marker replaces the running calibration, so the last
/// usable marker in detector order determines the result. Observations that
/// fail (invalid rect, unreadable payload, degenerate size) are recorded and
/// leave the running calibration untouched.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(markers = observations.len()))
)]
pub fn apply_observations(
    state: CalibrationState,
    observations: &[MarkerObservation],
    to_image: &AffineMap,
    params: &CalibrationParams,
) -> FrameOutcome {
    if observations.is_empty() {
        log::info!("no markers detected; calibration unchanged");
        return FrameOutcome {
            state,
            status: FrameStatus::NothingDetected,
            markers: Vec::new(),
        };
    }

    let mut state = state;
    let mut markers = Vec::with_capacity(observations.len());
    for (idx, obs) in observations.iter().enumerate() {
        let Some(text) = obs.payload.as_deref() else {
            log::warn!("marker {idx}: no payload decoded");
            markers.push(MarkerResult::NoPayload);
            continue;
        };
        match calibrate_observation(&obs.rect, text, to_image, params) {
            Ok(next) => {
                log::debug!(
                    "marker {idx}: {:.4} px per {}",
                    next.scale_factor(),
                    next.unit()
                );
                markers.push(MarkerResult::Applied {
                    scale_factor: next.scale_factor(),
                    unit: next.unit().to_string(),
                });
                state = next;
            }
            Err(err) => {
                log::warn!("marker {idx}: skipped: {err}");
                markers.push(MarkerResult::Skipped {
                    reason: err.to_string(),
                });
            }
        }
    }

    let status = if markers
        .iter()
        .any(|m| matches!(m, MarkerResult::Applied { .. }))
    {
        FrameStatus::Calibrated
    } else {
        FrameStatus::NoUsableMarker
    };

    FrameOutcome {
        state,
        status,
        markers,
    }
}

fn calibrate_observation(
    rect: &Rect,
    payload: &str,
    to_image: &AffineMap,
    params: &CalibrationParams,
) -> Result<CalibrationState, CalibrationError> {
    if !rect.is_valid() {
        return Err(CalibrationError::InvalidRect(*rect));
    }
    let size = parse_payload(payload)?;
    calibrate_with(&to_image.map_rect(rect), &size, params)
}
