//! CSS pixel length parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A length as it appears in widget configuration: either a bare number of
/// pixels or a CSS string such as `"200px"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    /// Plain number of pixels.
    Px(f64),
    /// CSS length string; only `px` (or unit-less) values are understood.
    Css(String),
}

impl Dimension {
    /// Resolves the dimension to a number of pixels.
    ///
    /// # Errors
    /// Returns [`GeometryError::InvalidPixelValue`] for keywords such as `auto`,
    /// non-pixel units and malformed strings.
    pub fn to_px(&self) -> Result<f64, GeometryError> {
        match self {
            Self::Px(value) => {
                if value.is_finite() {
                    Ok(*value)
                } else {
                    Err(GeometryError::InvalidPixelValue {
                        value: value.to_string(),
                        reason: "not a finite number".to_string(),
                    })
                }
            }
            Self::Css(value) => parse_px(value),
        }
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::Px(value)
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        Self::Css(value.to_string())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(value) => write!(f, "{value}px"),
            Self::Css(value) => f.write_str(value),
        }
    }
}

/// Parses a CSS pixel string (`"123px"`, `"12.5px"`, `"48"`) into a number.
///
/// # Errors
/// Returns [`GeometryError::InvalidPixelValue`] describing why the input was rejected.
pub fn parse_px(input: &str) -> Result<f64, GeometryError> {
    let invalid = |reason: &str| GeometryError::InvalidPixelValue {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty string"));
    }
    if trimmed.eq_ignore_ascii_case("auto") {
        return Err(invalid("`auto` has no pixel value"));
    }

    let number = trimmed
        .strip_suffix("px")
        .or_else(|| trimmed.strip_suffix("PX"))
        .unwrap_or(trimmed)
        .trim_end();

    if number.is_empty() {
        return Err(invalid("missing numeric part"));
    }
    if !number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
    {
        return Err(invalid("expected a number optionally followed by `px`"));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| invalid("expected a number optionally followed by `px`"))?;
    if !value.is_finite() {
        return Err(invalid("not a finite number"));
    }
    Ok(value)
}
