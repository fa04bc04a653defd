//! Derives the CSS `clip-path` polygon that limits which part of the
//! full-bleed transparent iframe receives pointer events.
//!
//! Every region is the padded axis-aligned bounding box of the rectangles
//! involved, with its corners cut by a small fixed radius (8 points, since
//! polygons cannot express arcs). For the four corner placements the true
//! interactive area is L-shaped; the clip region still covers the whole
//! bounding box, including the dead corner between button and tooltip.

use std::fmt::{self, Write as _};

use super::{Rect, TooltipGeometry};
use crate::defaults::{CLIP_CORNER_RADIUS_PX, CLIP_PADDING_PX};
use crate::error::GeometryError;

/// A clip polygon together with the box it was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipPath {
    bounds: Rect,
    points: Vec<(i32, i32)>,
}

impl ClipPath {
    /// An 8-point rounded rectangle covering `bounds`.
    #[must_use]
    pub fn rounded_rect(bounds: Rect, radius: i32) -> Self {
        let Rect {
            x,
            y,
            width: w,
            height: h,
            ..
        } = bounds;
        let r = radius.min(w / 2).min(h / 2).max(0);
        let right = bounds.right();
        let bottom = bounds.bottom();
        Self {
            bounds,
            points: vec![
                (x.saturating_add(r), y),
                (right.saturating_sub(r), y),
                (right, y.saturating_add(r)),
                (right, bottom.saturating_sub(r)),
                (right.saturating_sub(r), bottom),
                (x.saturating_add(r), bottom),
                (x, bottom.saturating_sub(r)),
                (x, y.saturating_add(r)),
            ],
        }
    }

    /// The rectangle the polygon was built around.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Polygon vertices in order.
    #[must_use]
    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    /// CSS value, e.g. `polygon(4px 0px, ...)`.
    #[must_use]
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut css = String::from("polygon(");
        for (index, (x, y)) in self.points.iter().enumerate() {
            if index > 0 {
                css.push_str(", ");
            }
            write!(css, "{x}px {y}px")?;
        }
        css.push(')');
        f.write_str(&css)
    }
}

/// Builds clip paths for the host. A generator created for a platform without
/// clip-path support produces nothing, leaving the iframe fully interactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipPathGenerator {
    padding: i32,
    corner_radius: i32,
    supported: bool,
}

impl Default for ClipPathGenerator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ClipPathGenerator {
    /// Generator with the default padding and corner radius.
    #[must_use]
    pub const fn new(supported: bool) -> Self {
        Self {
            padding: CLIP_PADDING_PX,
            corner_radius: CLIP_CORNER_RADIUS_PX,
            supported,
        }
    }

    /// Overrides the outward padding.
    #[must_use]
    pub const fn with_padding(mut self, padding: i32) -> Self {
        self.padding = padding;
        self
    }

    /// Whether this generator emits anything at all.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.supported
    }

    /// Padded rounded rectangle around an arbitrary box.
    #[must_use]
    pub fn around(&self, rect: Rect) -> Option<ClipPath> {
        self.supported
            .then(|| ClipPath::rounded_rect(rect.expand(self.padding), self.corner_radius))
    }

    /// Clip region covering only the button.
    #[must_use]
    pub fn button_only(&self, geometry: &TooltipGeometry) -> Option<ClipPath> {
        self.around(geometry.button)
    }

    /// Clip region covering button and tooltip together.
    ///
    /// # Errors
    /// Returns [`GeometryError::DegenerateRect`] when either rectangle has no area.
    pub fn union(
        &self,
        geometry: &TooltipGeometry,
    ) -> Result<Option<ClipPath>, GeometryError> {
        if geometry.button.is_empty() {
            return Err(GeometryError::DegenerateRect(format!(
                "button {:?}",
                geometry.button
            )));
        }
        if geometry.tooltip.is_empty() {
            return Err(GeometryError::DegenerateRect(format!(
                "tooltip {:?}",
                geometry.tooltip
            )));
        }
        Ok(self.around(geometry.union()))
    }

    /// Clip region for the current interaction state: the union when the
    /// tooltip region must stay reachable, the button alone otherwise. A
    /// failed union falls back to the button-only region.
    #[must_use]
    pub fn for_state(
        &self,
        geometry: &TooltipGeometry,
        expanded: bool,
    ) -> Option<ClipPath> {
        if !expanded {
            return self.button_only(geometry);
        }
        match self.union(geometry) {
            Ok(clip) => clip,
            Err(err) => {
                log::warn!("clip-path union failed, using button-only region: {err}");
                self.button_only(geometry)
            }
        }
    }
}
