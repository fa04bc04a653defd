//! Host-side pre-layout: sizes the iframe for the worst-case tooltip extent
//! and places the button so the tooltip always fits inside it.

use serde::{Deserialize, Serialize};

use super::{Dimension, Point, Rect, Size, TooltipPosition};
use crate::defaults::{CLIP_PADDING_PX, DEFAULT_TOOLTIP_OFFSET_PX};
use crate::error::GeometryError;

/// Tooltip configuration as declared by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipConfig {
    /// Tooltip width.
    pub width: Dimension,
    /// Tooltip height.
    pub height: Dimension,
    /// Placement relative to the button.
    pub position: TooltipPosition,
    /// Gap between button and tooltip.
    pub offset: Dimension,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            width: Dimension::Px(280.0),
            height: Dimension::Px(300.0),
            position: TooltipPosition::TopCenter,
            offset: Dimension::Px(DEFAULT_TOOLTIP_OFFSET_PX),
        }
    }
}

/// Where everything goes inside the iframe before anything was measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IframeLayout {
    /// Base iframe size: button plus worst-case tooltip, plus margin.
    pub iframe_size: Size,
    /// Absolute position of the button container inside the iframe.
    pub button_position: Point,
    /// Expected button rectangle.
    pub button: Rect,
    /// Expected tooltip rectangle.
    pub tooltip: Rect,
    /// Resolved tooltip gap.
    pub gap: f64,
    /// Tooltip placement the layout was computed for.
    pub position: TooltipPosition,
}

impl IframeLayout {
    /// Computes the layout for a button of `button_size` and the given tooltip.
    ///
    /// # Errors
    /// Returns a [`GeometryError`] when a tooltip dimension is not a pixel value
    /// or when the button has no area.
    pub fn compute(
        button_size: Size,
        tooltip: &TooltipConfig,
    ) -> Result<Self, GeometryError> {
        if button_size.width <= 0.0 || button_size.height <= 0.0 {
            return Err(GeometryError::DegenerateRect(format!(
                "button size {}x{}",
                button_size.width, button_size.height
            )));
        }

        let (w, h) = (button_size.width, button_size.height);
        let tw = tooltip.width.to_px()?.max(0.0);
        let th = tooltip.height.to_px()?.max(0.0);
        let gap = tooltip.offset.to_px()?.max(0.0);
        let position = tooltip.position;

        // Positions relative to the content box, before the margin is added.
        let (content, button_at, tooltip_at) = if position.is_beside() {
            let content = Size::new(tw + gap + w, h.max(th));
            let button_y = (content.height - h) / 2.0;
            let tooltip_y = (content.height - th) / 2.0;
            if position == TooltipPosition::Left {
                (
                    content,
                    Point { x: tw + gap, y: button_y },
                    Point { x: 0.0, y: tooltip_y },
                )
            } else {
                (
                    content,
                    Point { x: 0.0, y: button_y },
                    Point { x: w + gap, y: tooltip_y },
                )
            }
        } else {
            let content = Size::new(w.max(tw), h + gap + th);
            let (button_x, tooltip_x) = match position {
                // Right edges aligned, tooltip grows leftwards.
                TooltipPosition::TopLeft | TooltipPosition::BottomLeft => {
                    (content.width - w, content.width - tw)
                }
                // Left edges aligned, tooltip grows rightwards.
                TooltipPosition::TopRight | TooltipPosition::BottomRight => (0.0, 0.0),
                _ => ((content.width - w) / 2.0, (content.width - tw) / 2.0),
            };
            let (button_y, tooltip_y) = if position.is_above() {
                (th + gap, 0.0)
            } else {
                (0.0, h + gap)
            };
            (
                content,
                Point { x: button_x, y: button_y },
                Point { x: tooltip_x, y: tooltip_y },
            )
        };

        let margin = f64::from(CLIP_PADDING_PX);
        let button_position = Point {
            x: (button_at.x + margin).round(),
            y: (button_at.y + margin).round(),
        };
        let tooltip_origin = Point {
            x: (tooltip_at.x + margin).round(),
            y: (tooltip_at.y + margin).round(),
        };

        Ok(Self {
            iframe_size: Size::new(
                (content.width + 2.0 * margin).ceil(),
                (content.height + 2.0 * margin).ceil(),
            ),
            button_position,
            button: Rect::from_f64(button_position.x, button_position.y, w, h),
            tooltip: Rect::from_f64(tooltip_origin.x, tooltip_origin.y, tw, th),
            gap,
            position,
        })
    }

    /// Whether `rect` lies entirely inside the iframe.
    #[must_use]
    pub fn contains(&self, rect: &Rect) -> bool {
        rect.x >= 0
            && rect.y >= 0
            && f64::from(rect.right()) <= self.iframe_size.width
            && f64::from(rect.bottom()) <= self.iframe_size.height
    }
}
