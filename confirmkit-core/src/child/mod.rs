//! Iframe side of the protocol: the bootstrap script's state machines.
//!
//! One controller instance exists per widget. The DOM is reached only through
//! the [`ChildDom`] capability traits, which the wasm bindings implement over
//! the real document and the test platforms implement in memory.

use std::time::Duration;

use crate::channel::{
    encode, Channel, DigestResponse, IframeInitData, MessageSink, StylePayload, TrustedOrigin,
    TxData,
};
use crate::defaults::{BUTTON_TAG_NAME, LAYOUT_POLL_INTERVAL, MODAL_TAG_NAME};
use crate::digest::compute_ui_intent_digest;
use crate::error::ProtocolError;
use crate::geometry::{Point, Rect};
use crate::scheduler::Scheduler;

mod button;
mod modal;

pub use button::ButtonBootstrap;
pub use modal::ModalBootstrap;

/// Handshake progress as seen by the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildPhase {
    /// Script evaluated, nothing posted.
    Booted,
    /// `READY` posted.
    Ready,
    /// Init data received and origin captured.
    Initialized,
    /// Container positioned and acknowledged.
    Positioned,
    /// First geometry posted.
    Measured,
    /// Element defined and geometry posted.
    Interactive,
}

/// Timers owned by child controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildTimer {
    /// Retry positioning the shadow container.
    PositionRetry {
        /// Attempt number the retry runs as.
        attempt: u32,
    },
    /// Retry measuring button and tooltip.
    MeasureRetry {
        /// Attempt number the retry runs as.
        attempt: u32,
    },
    /// End of the hover-out grace period.
    HideTooltip,
    /// Observer fallback tick.
    LayoutPoll,
}

/// Element a pointer event happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTarget {
    /// The confirm button.
    Button,
    /// The tooltip panel.
    Tooltip,
}

/// Whether the platform can notify layout changes by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverSupport {
    /// Resize/mutation observers are attached and will call back.
    Native,
    /// No observers; the controller polls.
    Unsupported,
}

/// Per-widget settings of a bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildConfig {
    /// Custom element whose definition gates `ETX_DEFINED`.
    pub tag_name: String,
    /// Poll interval used when layout observers are unavailable.
    pub poll_interval: Duration,
}

impl ChildConfig {
    /// Settings for the button widget.
    #[must_use]
    pub fn button() -> Self {
        Self {
            tag_name: BUTTON_TAG_NAME.to_string(),
            poll_interval: LAYOUT_POLL_INTERVAL,
        }
    }

    /// Settings for the modal widget.
    #[must_use]
    pub fn modal() -> Self {
        Self {
            tag_name: MODAL_TAG_NAME.to_string(),
            poll_interval: LAYOUT_POLL_INTERVAL,
        }
    }

    /// Overrides the polling interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Browser capabilities shared by every bootstrap.
pub trait ChildDom: MessageSink + Scheduler<ChildTimer> {
    /// Attaches the single `message` handler.
    fn listen(&mut self);

    /// Starts awaiting `customElements.whenDefined(tag_name)`; the embedding
    /// calls the controller's `on_element_defined` once it resolves.
    fn wait_for_definition(&mut self, tag_name: &str);

    /// Requests one animation frame; the embedding calls
    /// `on_animation_frame` when it runs.
    fn request_animation_frame(&mut self);

    /// Pushes transactions into the widget element.
    fn apply_tx_data(&mut self, tx_data: &TxData);

    /// Pushes the loading flag into the widget element.
    fn apply_loading(&mut self, loading: bool);
}

/// DOM access needed by the button bootstrap.
pub trait ButtonDom: ChildDom {
    /// Applies color, size and tooltip configuration onto the element.
    fn apply_init(&mut self, init: &IframeInitData);

    /// Places the shadow container absolutely at `position` and forces a
    /// reflow. Returns `false` when the shadow root is not ready yet.
    fn position_container(&mut self, position: Point) -> bool;

    /// Bounding box of the button, `None` while it is not rendered.
    fn measure_button(&self) -> Option<Rect>;

    /// Bounding box of the tooltip, measured even while hidden.
    fn measure_tooltip(&self) -> Option<Rect>;

    /// Shows or hides the tooltip.
    fn set_tooltip_visible(&mut self, visible: bool);

    /// Attaches layout observers if the platform has them.
    fn observe_layout(&mut self) -> ObserverSupport;

    /// Applies `SET_STYLE`.
    fn apply_style(&mut self, style: &StylePayload);
}

/// State every bootstrap keeps regardless of widget.
#[derive(Debug, Default)]
struct ChildCore {
    origin: TrustedOrigin,
    element_defined: bool,
    tx_data: Option<TxData>,
}

impl ChildCore {
    /// Posts to the captured origin, or `'*'` before one is known.
    fn post<C: Channel>(
        &self,
        sink: &mut (impl MessageSink + ?Sized),
        message: &C::Message,
    ) -> Result<(), ProtocolError> {
        let raw = encode::<C>(message)?;
        log::trace!("{} iframe -> host: {raw}", C::NAME);
        sink.post_message(&raw, &self.origin.target());
        Ok(())
    }

    /// Whether a message from `origin` may be processed.
    fn accepts(&self, origin: &str) -> bool {
        let accepted = self.origin.accepts(origin);
        if !accepted {
            log::warn!("dropping message from untrusted origin {origin}");
        }
        accepted
    }

    /// Answer to `REQUEST_UI_DIGEST` for the data currently displayed.
    fn digest_response(&self) -> DigestResponse {
        let Some(tx_data) = self.tx_data.as_ref() else {
            return DigestResponse::failure("no transaction data displayed".to_string());
        };
        match compute_ui_intent_digest(&tx_data.tx_signing_requests) {
            Ok(digest) => DigestResponse::success(digest),
            Err(err) => DigestResponse::failure(err.to_string()),
        }
    }
}
