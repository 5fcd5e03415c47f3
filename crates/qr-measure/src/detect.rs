//! QR marker detection on `image` buffers via `rqrr`.

use std::borrow::Cow;
use std::path::Path;

use crate::core::{MarkerDetector, MarkerObservation, Rect, Size};
use crate::io::{IoError, MeasureConfig, MeasureReport};
use image::{imageops::FilterType, GrayImage, ImageReader};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Config(#[from] IoError),
}

/// QR detector backed by `rqrr`.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrDetector {
    /// Longest side to downsample to before searching; 0 disables downsampling.
    pub max_dim: u32,
}

impl QrDetector {
    pub fn new(max_dim: u32) -> Self {
        Self { max_dim }
    }
}

impl MarkerDetector for QrDetector {
    type Image = GrayImage;

    fn detect(&self, image: &GrayImage) -> Vec<MarkerObservation> {
        detect_qr_markers(image, self.max_dim)
    }
}

/// Reduced search buffer for a large image.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Downsample {
    width: u32,
    height: u32,
    /// Original pixels per search pixel along x.
    sx: f64,
    /// Original pixels per search pixel along y.
    sy: f64,
}

impl Downsample {
    /// `None` when the longest side already fits in `max_dim` or `max_dim` is 0.
    fn for_image(w: u32, h: u32, max_dim: u32) -> Option<Self> {
        let longest = w.max(h);
        if max_dim == 0 || longest <= max_dim {
            return None;
        }
        let factor = longest as f64 / max_dim as f64;
        // Rounded so the longest side lands on `max_dim` itself.
        let width = ((w as f64 / factor).round() as u32).max(1);
        let height = ((h as f64 / factor).round() as u32).max(1);
        Some(Self {
            width,
            height,
            sx: w as f64 / width as f64,
            sy: h as f64 / height as f64,
        })
    }

    fn to_original(&self, x: f64, y: f64) -> Point2<f64> {
        Point2::new(x * self.sx, y * self.sy)
    }
}

/// Find QR symbols and report their bounding boxes in full-resolution pixels.
///
/// Symbols that are located but fail to decode are reported with no payload.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img), fields(width = img.width(), height = img.height()))
)]
pub fn detect_qr_markers(img: &GrayImage, max_dim: u32) -> Vec<MarkerObservation> {
    let (w, h) = img.dimensions();
    let downsample = Downsample::for_image(w, h, max_dim);

    let search = match &downsample {
        Some(d) => Cow::Owned(image::imageops::resize(
            img,
            d.width,
            d.height,
            FilterType::Triangle,
        )),
        None => Cow::Borrowed(img),
    };

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        search.width() as usize,
        search.height() as usize,
        |x, y| search.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    log::debug!(
        "rqrr located {} grid(s) in {}x{} search buffer",
        grids.len(),
        search.width(),
        search.height()
    );

    grids
        .into_iter()
        .filter_map(|grid| {
            let corners = grid.bounds.map(|p| {
                let (x, y) = (p.x as f64, p.y as f64);
                match &downsample {
                    Some(d) => d.to_original(x, y),
                    None => Point2::new(x, y),
                }
            });
            let rect = Rect::bounding(&corners)?;
            let payload = match grid.decode() {
                Ok((_, content)) => Some(content),
                Err(err) => {
                    log::warn!("QR grid at {rect:?} did not decode: {err}");
                    None
                }
            };
            Some(MarkerObservation { rect, payload })
        })
        .collect()
}

pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, DetectError> {
    let reader = ImageReader::open(path).map_err(image::ImageError::IoError)?;
    Ok(reader.decode()?.to_luma8())
}

/// Size of an image buffer as floating-point extents.
pub fn image_size(img: &GrayImage) -> Size {
    Size::new(img.width() as f64, img.height() as f64)
}

/// Load the configured image, detect markers and measure the configured boxes.
pub fn measure_image(cfg: &MeasureConfig) -> Result<MeasureReport, DetectError> {
    let img = load_gray(&cfg.image_path)?;
    let observations = QrDetector::new(cfg.max_dim).detect(&img);
    Ok(MeasureReport::build(cfg, image_size(&img), &observations))
}
