//! Protocol timing and geometry constants shared by host and child.

use std::time::Duration;

/// Maximum attempts for DOM-readiness retries (shadow root, measurable nodes).
pub const DOM_RETRY_LIMIT: u32 = 10;

/// Delay between DOM-readiness retries.
pub const DOM_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Grace window between a pointer leaving the button/tooltip and the tooltip hiding.
pub const HIDE_GRACE: Duration = Duration::from_millis(100);

/// How long the host waits for `UI_INTENT_DIGEST` before giving up.
pub const DIGEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Maximum difference between measured and configured button size before the
/// configured size is trusted instead.
pub const SIZE_TOLERANCE_PX: i32 = 5;

/// Outward padding applied around every clip rectangle (shadow room).
///
/// The legacy button used 0 px and the handshake variant 4 px; the larger one is kept.
pub const CLIP_PADDING_PX: i32 = 4;

/// Radius of the 8-point corner cut applied to clip rectangles.
pub const CLIP_CORNER_RADIUS_PX: i32 = 2;

/// Re-measure interval used when the platform has no layout observers.
pub const LAYOUT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Tooltip gap used when the configuration does not declare one.
pub const DEFAULT_TOOLTIP_OFFSET_PX: f64 = 4.0;

/// Default widget tag for the button channel.
pub const BUTTON_TAG_NAME: &str = "iframe-button-with-tooltip-confirmer";

/// Default widget tag for the modal channel.
pub const MODAL_TAG_NAME: &str = "iframe-modal-tx-confirmer";
