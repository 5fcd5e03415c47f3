use crate::Rect;

/// Marker payload could not be decoded into a physical size.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("marker payload is not valid JSON or has missing/ill-typed fields: {0}")]
    Json(#[from] serde_json::Error),
    #[error("marker payload is not a JSON object")]
    NotAnObject,
    #[error("marker payload has an empty unit label")]
    EmptyUnit,
}

/// Errors returned by calibration and measurement.
#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error("invalid rectangle {0:?}")]
    InvalidRect(Rect),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("degenerate calibration (marker width={marker_px}px, physical width={physical})")]
    Degenerate { marker_px: f64, physical: f64 },
}
