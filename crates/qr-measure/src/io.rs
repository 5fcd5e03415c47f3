//! JSON configuration and report for measuring boxes in one photo.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::core::{
    apply_observations, AffineMap, CalibrationParams, CalibrationState, FrameStatus,
    MarkerObservation, MarkerResult, MeasuredBox, Measurement, Rect, Size,
};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Input for one measurement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureConfig {
    pub image_path: String,
    /// Size of the view the boxes were drawn in. When absent, boxes are taken
    /// to be in image pixels.
    #[serde(default)]
    pub display: Option<Size>,
    #[serde(default)]
    pub boxes: Vec<Rect>,
    #[serde(default)]
    pub calibration: CalibrationParams,
    /// Downsample so the longer side is at most this many pixels before
    /// detection; 0 keeps full resolution.
    #[serde(default)]
    pub max_dim: u32,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl MeasureConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("qr_measure_report.json"))
    }

    /// Display-to-image map for the configured boxes.
    ///
    /// Identity when no display size is configured or either size is unusable.
    pub fn box_to_image(&self, image_size: Size) -> AffineMap {
        self.display
            .and_then(|display| AffineMap::display_to_image(image_size, display))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerReport {
    pub rect: Rect,
    #[serde(default)]
    pub payload: Option<String>,
    pub result: MarkerResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxReport {
    pub display_rect: Rect,
    pub image_rect: Rect,
    #[serde(default)]
    pub measurement: Option<Measurement>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureReport {
    pub image_path: String,
    pub image_size: Size,
    #[serde(default)]
    pub display: Option<Size>,
    pub status: FrameStatus,
    pub scale_factor: f64,
    pub unit: String,
    pub markers: Vec<MarkerReport>,
    pub boxes: Vec<BoxReport>,
}

impl MeasureReport {
    /// Calibrate on `observations` (image pixels) and measure every configured box.
    pub fn build(
        cfg: &MeasureConfig,
        image_size: Size,
        observations: &[MarkerObservation],
    ) -> Self {
        let outcome = apply_observations(
            CalibrationState::default(),
            observations,
            &AffineMap::identity(),
            &cfg.calibration,
        );
        let to_image = cfg.box_to_image(image_size);

        let boxes = cfg
            .boxes
            .iter()
            .map(|&rect| measure_box(rect, &outcome.state, &to_image))
            .collect();

        let markers = observations
            .iter()
            .zip(outcome.markers)
            .map(|(obs, result)| MarkerReport {
                rect: obs.rect,
                payload: obs.payload.clone(),
                result,
            })
            .collect();

        Self {
            image_path: cfg.image_path.clone(),
            image_size,
            display: cfg.display,
            status: outcome.status,
            scale_factor: outcome.state.scale_factor(),
            unit: outcome.state.unit().to_string(),
            markers,
            boxes,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn measure_box(rect: Rect, state: &CalibrationState, to_image: &AffineMap) -> BoxReport {
    let mut b = MeasuredBox::new(rect);
    let image_rect = to_image.map_rect(&rect);
    match b.relabel(state, to_image) {
        Ok(m) => BoxReport {
            display_rect: rect,
            image_rect,
            measurement: Some(m),
            label: b.label,
            error: None,
        },
        Err(err) => {
            log::warn!("box {rect:?} not measured: {err}");
            BoxReport {
                display_rect: rect,
                image_rect,
                measurement: None,
                label: None,
                error: Some(err.to_string()),
            }
        }
    }
}
