//! Geometry model shared by host and child: rectangles in the iframe's local
//! coordinate space, tooltip placement and the measured geometry snapshot.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

pub mod clip_path;
pub mod layout;
pub mod pixels;

pub use clip_path::{ClipPath, ClipPathGenerator};
pub use layout::{IframeLayout, TooltipConfig};
pub use pixels::{parse_px, Dimension};

/// A position in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Point {
    /// Horizontal offset from the iframe's left edge.
    pub x: f64,
    /// Vertical offset from the iframe's top edge.
    pub y: f64,
}

/// A width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum of two sizes.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// Rectangle snapshot, rounded to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Rect {
    /// Left edge.
    #[serde(deserialize_with = "round_px")]
    pub x: i32,
    /// Top edge.
    #[serde(deserialize_with = "round_px")]
    pub y: i32,
    /// Width.
    #[serde(deserialize_with = "round_px")]
    pub width: i32,
    /// Height.
    #[serde(deserialize_with = "round_px")]
    pub height: i32,
    /// Visual border radius of the measured element.
    #[serde(default, deserialize_with = "round_px")]
    pub border_radius: i32,
}

impl Rect {
    /// Creates a rectangle without border radius.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            border_radius: 0,
        }
    }

    /// Builds a rectangle from fractional layout values, rounding each field.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            x.round() as i32,
            y.round() as i32,
            width.round() as i32,
            height.round() as i32,
        )
    }

    /// Returns a copy with the given border radius.
    #[must_use]
    pub const fn with_border_radius(mut self, border_radius: i32) -> Self {
        self.border_radius = border_radius;
        self
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the rectangle covers no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Axis-aligned bounding box of both rectangles.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()).saturating_sub(x),
            self.bottom().max(other.bottom()).saturating_sub(y),
        )
    }

    /// Edges as `(left, top, right, bottom)`, or `None` when the far edges
    /// do not fit in `i32`.
    const fn checked_edges(&self) -> Option<(i32, i32, i32, i32)> {
        match (
            self.x.checked_add(self.width),
            self.y.checked_add(self.height),
        ) {
            (Some(right), Some(bottom)) => Some((self.x, self.y, right, bottom)),
            _ => None,
        }
    }

    /// Grows the rectangle by `padding` on every side. Edges saturate at the
    /// `i32` range.
    #[must_use]
    pub const fn expand(&self, padding: i32) -> Self {
        Self {
            x: self.x.saturating_sub(padding),
            y: self.y.saturating_sub(padding),
            width: self.width.saturating_add(padding.saturating_mul(2)),
            height: self.height.saturating_add(padding.saturating_mul(2)),
            border_radius: self.border_radius,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_px<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("pixel value must be finite"));
    }
    Ok(value.round() as i32)
}

/// Where the tooltip sits relative to the button.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum TooltipPosition {
    /// Above the button, extending towards the left.
    TopLeft,
    /// Above the button, horizontally centered.
    #[default]
    TopCenter,
    /// Above the button, extending towards the right.
    TopRight,
    /// Beside the button on its left.
    Left,
    /// Beside the button on its right.
    Right,
    /// Below the button, extending towards the left.
    BottomLeft,
    /// Below the button, horizontally centered.
    BottomCenter,
    /// Below the button, extending towards the right.
    BottomRight,
}

impl TooltipPosition {
    /// Tooltip is stacked above the button.
    #[must_use]
    pub const fn is_above(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }

    /// Tooltip is stacked below the button.
    #[must_use]
    pub const fn is_below(self) -> bool {
        matches!(
            self,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight
        )
    }

    /// Tooltip sits beside the button rather than above or below it.
    #[must_use]
    pub const fn is_beside(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// The four diagonal placements, whose true interactive area is L-shaped.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }
}

/// Latest measured layout of the widget, reported by the child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TooltipGeometry {
    /// Button bounding box.
    pub button: Rect,
    /// Tooltip bounding box (measured even while hidden).
    pub tooltip: Rect,
    /// Declared tooltip placement.
    pub position: TooltipPosition,
    /// Declared distance between button and tooltip.
    pub gap: f64,
    /// Whether the tooltip is currently shown.
    pub visible: bool,
}

impl TooltipGeometry {
    /// Bounding box of button and tooltip together.
    #[must_use]
    pub fn union(&self) -> Rect {
        self.button.union(&self.tooltip)
    }

    /// Bounding box of button and tooltip grown by `padding`, or `None` when
    /// any edge of it falls outside the `i32` range.
    #[must_use]
    pub fn checked_extent(&self, padding: i32) -> Option<Rect> {
        let (button_left, button_top, button_right, button_bottom) =
            self.button.checked_edges()?;
        let (tooltip_left, tooltip_top, tooltip_right, tooltip_bottom) =
            self.tooltip.checked_edges()?;
        let left = button_left.min(tooltip_left).checked_sub(padding)?;
        let top = button_top.min(tooltip_top).checked_sub(padding)?;
        let right = button_right.max(tooltip_right).checked_add(padding)?;
        let bottom = button_bottom.max(tooltip_bottom).checked_add(padding)?;
        Some(Rect::new(
            left,
            top,
            right.checked_sub(left)?,
            bottom.checked_sub(top)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_union_of_stacked_rects() {
        let button = Rect::new(100, 100, 200, 48);
        let tooltip = Rect::new(80, 20, 280, 150);
        assert_eq!(button.union(&tooltip), Rect::new(80, 20, 280, 150));
    }

    #[test]
    fn test_edges_saturate_instead_of_overflowing() {
        let far = Rect::new(2_147_483_000, 4, 100_000, 150);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(far.expand(4).right(), i32::MAX);
        assert_eq!(Rect::new(i32::MIN, 0, 10, 10).expand(4).x, i32::MIN);

        let geometry = TooltipGeometry {
            button: Rect::new(44, 308, 200, 48),
            tooltip: far,
            position: TooltipPosition::TopCenter,
            gap: 4.0,
            visible: true,
        };
        assert_eq!(geometry.checked_extent(4), None);
        assert_eq!(
            TooltipGeometry {
                tooltip: Rect::new(4, 4, 280, 150),
                ..geometry
            }
            .checked_extent(4),
            Some(Rect::new(0, 0, 288, 360))
        );
    }

    #[test]
    fn test_rect_rounds_fractional_json() {
        let rect: Rect = serde_json::from_str(
            r#"{"x":10.4,"y":10.6,"width":199.5,"height":48,"borderRadius":8}"#,
        )
        .unwrap();
        assert_eq!(rect, Rect::new(10, 11, 200, 48).with_border_radius(8));
    }

    #[test]
    fn test_rect_border_radius_defaults_to_zero() {
        let rect: Rect =
            serde_json::from_str(r#"{"x":0,"y":0,"width":1,"height":1}"#).unwrap();
        assert_eq!(rect.border_radius, 0);
    }

    #[test]
    fn test_position_string_forms() {
        assert_eq!(
            TooltipPosition::from_str("bottom-right").unwrap(),
            TooltipPosition::BottomRight
        );
        assert_eq!(TooltipPosition::TopCenter.to_string(), "top-center");
        assert_eq!(
            serde_json::to_string(&TooltipPosition::Left).unwrap(),
            "\"left\""
        );
        assert!(TooltipPosition::from_str("middle").is_err());
    }

    #[test]
    fn test_geometry_wire_shape() {
        let geometry = TooltipGeometry {
            button: Rect::new(1, 2, 3, 4),
            tooltip: Rect::new(5, 6, 7, 8),
            position: TooltipPosition::TopCenter,
            gap: 4.0,
            visible: false,
        };
        let value = serde_json::to_value(&geometry).unwrap();
        assert_eq!(value["button"]["borderRadius"], 0);
        assert_eq!(value["position"], "top-center");
        assert_eq!(value["visible"], false);
    }
}
