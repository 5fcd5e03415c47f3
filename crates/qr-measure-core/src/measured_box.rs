//! User-drawn boxes over the displayed photo.
//!
//! Boxes live in display coordinates. They are measured by mapping them into
//! image pixels first, so the same calibration serves any display size.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{measure, AffineMap, CalibrationError, CalibrationState, Measurement, Rect, Size};

/// Side length of a freshly added box, in display units.
pub const DEFAULT_BOX_SIDE: f64 = 100.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalHandle {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalHandle {
    Top,
    Bottom,
}

/// A display-space box and the label from its last measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasuredBox {
    pub rect: Rect,
    #[serde(default)]
    pub label: Option<String>,
}

impl MeasuredBox {
    pub fn new(rect: Rect) -> Self {
        Self { rect, label: None }
    }

    /// Box of `size` centred in a display area.
    pub fn centered(display: Size, size: Size) -> Self {
        let x = 0.5 * display.width - 0.5 * size.width;
        let y = 0.5 * display.height - 0.5 * size.height;
        Self::new(Rect::new(x, y, size.width, size.height))
    }

    /// Default-sized square in the middle of the display.
    pub fn default_in(display: Size) -> Self {
        Self::centered(display, Size::new(DEFAULT_BOX_SIDE, DEFAULT_BOX_SIDE))
    }

    /// Start a resize drag at `location` (display coordinates).
    ///
    /// The corner nearest to the touch, by quadrant relative to the box centre,
    /// becomes the moving corner for the whole drag.
    pub fn begin_drag(&self, location: Point2<f64>) -> BoxDrag {
        let c = self.rect.center();
        let horizontal = if location.x > c.x {
            HorizontalHandle::Right
        } else {
            HorizontalHandle::Left
        };
        let vertical = if location.y > c.y {
            VerticalHandle::Bottom
        } else {
            VerticalHandle::Top
        };
        BoxDrag {
            horizontal,
            vertical,
            last: location,
        }
    }

    /// Measure this box and store the new label.
    ///
    /// On error the previous label is kept.
    pub fn relabel(
        &mut self,
        calibration: &CalibrationState,
        display_to_image: &AffineMap,
    ) -> Result<Measurement, CalibrationError> {
        if !self.rect.is_valid() {
            return Err(CalibrationError::InvalidRect(self.rect));
        }
        let m = measure(&display_to_image.map_rect(&self.rect), calibration)?;
        self.label = Some(m.label());
        Ok(m)
    }
}

/// An in-progress resize of a [`MeasuredBox`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxDrag {
    pub horizontal: HorizontalHandle,
    pub vertical: VerticalHandle,
    last: Point2<f64>,
}

impl BoxDrag {
    /// Apply the movement since the previous location to `target`.
    ///
    /// The edges opposite the grabbed corner stay put. Extents are clamped at
    /// zero; the box never flips. Non-finite locations are ignored.
    pub fn update(&mut self, target: &mut MeasuredBox, location: Point2<f64>) {
        if !(location.x.is_finite() && location.y.is_finite()) {
            log::debug!("ignoring drag to non-finite location {location:?}");
            return;
        }
        let dx = location.x - self.last.x;
        let dy = location.y - self.last.y;
        self.last = location;

        let r = &mut target.rect;
        match self.horizontal {
            HorizontalHandle::Left => {
                let right = r.x + r.width;
                r.width = (r.width - dx).max(0.0);
                r.x = right - r.width;
            }
            HorizontalHandle::Right => r.width = (r.width + dx).max(0.0),
        }
        match self.vertical {
            VerticalHandle::Top => {
                let bottom = r.y + r.height;
                r.height = (r.height - dy).max(0.0);
                r.y = bottom - r.height;
            }
            VerticalHandle::Bottom => r.height = (r.height + dy).max(0.0),
        }
    }
}
