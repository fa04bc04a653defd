//! Bootstrap controller running inside the button iframe.

use super::{ButtonDom, ChildConfig, ChildCore, ChildPhase, ChildTimer, ObserverSupport, PointerTarget};
use crate::channel::{ButtonChannel, ButtonMessage, HoverPayload, IframeInitData};
use crate::defaults::{
    DEFAULT_TOOLTIP_OFFSET_PX, DOM_RETRY_DELAY, DOM_RETRY_LIMIT, HIDE_GRACE, SIZE_TOLERANCE_PX,
};
use crate::error::ProtocolError;
use crate::geometry::{Rect, TooltipGeometry};
use crate::scheduler::TimerHandle;

/// Keeps a measured length when it is within tolerance of the configured one,
/// otherwise trusts the configuration.
#[allow(clippy::cast_possible_truncation)]
fn reconcile(measured: i32, expected: f64) -> i32 {
    let expected = expected.round() as i32;
    if (measured - expected).abs() <= SIZE_TOLERANCE_PX {
        measured
    } else {
        log::debug!("measured {measured}px, configured {expected}px: using configured size");
        expected
    }
}

/// Child half of the button handshake plus the tooltip interaction loop.
#[derive(Debug)]
pub struct ButtonBootstrap<D: ButtonDom> {
    dom: D,
    config: ChildConfig,
    core: ChildCore,
    phase: ChildPhase,
    init: Option<IframeInitData>,
    position_timer: Option<TimerHandle>,
    measure_timer: Option<TimerHandle>,
    hide_timer: Option<TimerHandle>,
    poll_timer: Option<TimerHandle>,
    observing: bool,
    hiding: bool,
    frame_requested: bool,
    tooltip_visible: bool,
    last_posted: Option<TooltipGeometry>,
}

impl<D: ButtonDom> ButtonBootstrap<D> {
    /// Creates the controller; nothing happens until [`ButtonBootstrap::boot`].
    pub fn new(dom: D, config: ChildConfig) -> Self {
        Self {
            dom,
            config,
            core: ChildCore::default(),
            phase: ChildPhase::Booted,
            init: None,
            position_timer: None,
            measure_timer: None,
            hide_timer: None,
            poll_timer: None,
            observing: false,
            hiding: false,
            frame_requested: false,
            tooltip_visible: false,
            last_posted: None,
        }
    }

    /// Attaches the message handler, announces `READY` and starts waiting for
    /// the custom element definition.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if `READY` cannot be encoded.
    pub fn boot(&mut self) -> Result<(), ProtocolError> {
        if self.phase != ChildPhase::Booted {
            return Ok(());
        }
        self.dom.listen();
        self.post(&ButtonMessage::Ready)?;
        self.phase = ChildPhase::Ready;
        let tag_name = self.config.tag_name.clone();
        self.dom.wait_for_definition(&tag_name);
        Ok(())
    }

    /// The custom element finished upgrading. `ETX_DEFINED` is posted once,
    /// whatever the handshake state.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn on_element_defined(&mut self) -> Result<(), ProtocolError> {
        if self.core.element_defined {
            return Ok(());
        }
        self.core.element_defined = true;
        self.post(&ButtonMessage::ElementDefined)?;
        self.maybe_interactive();
        Ok(())
    }

    /// Handles one inbound `message` event from `origin`.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] only when a reply cannot be encoded.
    pub fn handle_message(&mut self, origin: &str, raw: &str) -> Result<(), ProtocolError> {
        if !self.core.accepts(origin) {
            return Ok(());
        }
        let message = match crate::channel::decode::<ButtonChannel>(raw) {
            Ok(message) => message,
            Err(err) => {
                log::debug!("dropping button message: {err}");
                return Ok(());
            }
        };

        match message {
            ButtonMessage::Init(init) => self.on_init(init),
            ButtonMessage::GeometryRequest => self.on_geometry_request(),
            ButtonMessage::SetTxData(tx_data) => {
                self.dom.apply_tx_data(&tx_data);
                self.core.tx_data = Some(tx_data);
                Ok(())
            }
            ButtonMessage::SetLoading(loading) => {
                self.dom.apply_loading(loading);
                Ok(())
            }
            ButtonMessage::SetStyle(style) => {
                self.dom.apply_style(&style);
                Ok(())
            }
            ButtonMessage::RequestUiDigest => {
                let response = self.core.digest_response();
                self.post(&ButtonMessage::UiIntentDigest(response))
            }
            other => {
                log::debug!("ignoring child-bound message {other:?}");
                Ok(())
            }
        }
    }

    fn on_init(&mut self, init: IframeInitData) -> Result<(), ProtocolError> {
        self.core.origin.capture(&init.target_origin);
        self.dom.apply_init(&init);
        self.init = Some(init);
        if self.phase < ChildPhase::Initialized {
            self.phase = ChildPhase::Initialized;
        }
        if let Some(handle) = self.position_timer.take() {
            self.dom.cancel(handle);
        }
        self.try_position(0)
    }

    fn try_position(&mut self, attempt: u32) -> Result<(), ProtocolError> {
        let Some(position) = self.init.as_ref().map(|init| init.button_position) else {
            return Ok(());
        };
        if self.dom.position_container(position) {
            if self.phase < ChildPhase::Positioned {
                self.phase = ChildPhase::Positioned;
            }
            return self.post(&ButtonMessage::Positioned(position));
        }
        if attempt + 1 < DOM_RETRY_LIMIT {
            let timer = ChildTimer::PositionRetry {
                attempt: attempt + 1,
            };
            self.position_timer = Some(self.dom.schedule(DOM_RETRY_DELAY, timer));
        } else {
            log::warn!("shadow root not ready after {DOM_RETRY_LIMIT} attempts, giving up positioning");
        }
        Ok(())
    }

    fn on_geometry_request(&mut self) -> Result<(), ProtocolError> {
        if let Some(handle) = self.measure_timer.take() {
            self.dom.cancel(handle);
        }
        self.try_measure(0)
    }

    fn try_measure(&mut self, attempt: u32) -> Result<(), ProtocolError> {
        if let Some(geometry) = self.measure(self.tooltip_visible) {
            self.post(&ButtonMessage::GeometryResult(geometry.clone()))?;
            self.last_posted = Some(geometry);
            if self.phase < ChildPhase::Measured {
                self.phase = ChildPhase::Measured;
            }
            self.start_observing();
            self.maybe_interactive();
            return Ok(());
        }
        if attempt + 1 < DOM_RETRY_LIMIT {
            let timer = ChildTimer::MeasureRetry {
                attempt: attempt + 1,
            };
            self.measure_timer = Some(self.dom.schedule(DOM_RETRY_DELAY, timer));
        } else {
            log::warn!("widget not measurable after {DOM_RETRY_LIMIT} attempts, giving up");
        }
        Ok(())
    }

    fn measure(&self, visible: bool) -> Option<TooltipGeometry> {
        let init = self.init.as_ref()?;
        let measured = self.dom.measure_button()?;
        let tooltip = self.dom.measure_tooltip()?;
        let button = Rect {
            width: reconcile(measured.width, init.size.width),
            height: reconcile(measured.height, init.size.height),
            ..measured
        };
        let gap = init
            .tooltip
            .offset
            .to_px()
            .unwrap_or(DEFAULT_TOOLTIP_OFFSET_PX);
        Some(TooltipGeometry {
            button,
            tooltip,
            position: init.tooltip.position,
            gap,
            visible,
        })
    }

    fn start_observing(&mut self) {
        if self.observing {
            return;
        }
        self.observing = true;
        if self.dom.observe_layout() == ObserverSupport::Unsupported {
            log::debug!("no layout observers, polling every {:?}", self.config.poll_interval);
            self.poll_timer = Some(self.dom.schedule(self.config.poll_interval, ChildTimer::LayoutPoll));
        }
    }

    fn maybe_interactive(&mut self) {
        if self.phase == ChildPhase::Measured && self.core.element_defined {
            self.phase = ChildPhase::Interactive;
        }
    }

    /// Something that may affect layout happened (observer callback, tree
    /// toggle). At most one `TOOLTIP_STATE` goes out per animation frame.
    pub fn on_layout_change(&mut self) {
        if self.last_posted.is_none() {
            return;
        }
        if self.hiding {
            log::trace!("layout change during hide transition suppressed");
            return;
        }
        self.request_frame();
    }

    fn request_frame(&mut self) {
        if !self.frame_requested {
            self.frame_requested = true;
            self.dom.request_animation_frame();
        }
    }

    /// Runs the pending animation frame: re-measures and posts
    /// `TOOLTIP_STATE` if the geometry changed since the last post.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn on_animation_frame(&mut self) -> Result<(), ProtocolError> {
        self.frame_requested = false;
        self.hiding = false;
        let Some(geometry) = self.measure(self.tooltip_visible) else {
            log::debug!("widget not measurable in animation frame");
            return Ok(());
        };
        if self.last_posted.as_ref() == Some(&geometry) {
            log::trace!("geometry unchanged, TOOLTIP_STATE skipped");
            return Ok(());
        }
        self.post(&ButtonMessage::TooltipState(geometry.clone()))?;
        self.last_posted = Some(geometry);
        Ok(())
    }

    /// Pointer entered `target`.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if `BUTTON_HOVER` cannot be encoded.
    pub fn on_pointer_enter(&mut self, target: PointerTarget) -> Result<(), ProtocolError> {
        self.cancel_hide();
        if target == PointerTarget::Button {
            self.post(&ButtonMessage::ButtonHover(HoverPayload { hovering: true }))?;
            if !self.tooltip_visible {
                self.tooltip_visible = true;
                self.dom.set_tooltip_visible(true);
                self.request_frame();
            }
        }
        Ok(())
    }

    /// Pointer left `target`; the tooltip hides after the grace period unless
    /// the pointer comes back.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if `BUTTON_HOVER` cannot be encoded.
    pub fn on_pointer_leave(&mut self, target: PointerTarget) -> Result<(), ProtocolError> {
        if target == PointerTarget::Button {
            self.post(&ButtonMessage::ButtonHover(HoverPayload { hovering: false }))?;
        }
        if self.tooltip_visible {
            self.cancel_hide();
            self.hide_timer = Some(self.dom.schedule(HIDE_GRACE, ChildTimer::HideTooltip));
        }
        Ok(())
    }

    fn cancel_hide(&mut self) {
        if let Some(handle) = self.hide_timer.take() {
            self.dom.cancel(handle);
        }
    }

    /// Handles a due timer.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if a resulting message cannot be encoded.
    pub fn on_timer(&mut self, timer: ChildTimer) -> Result<(), ProtocolError> {
        match timer {
            ChildTimer::PositionRetry { attempt } => {
                self.position_timer = None;
                self.try_position(attempt)
            }
            ChildTimer::MeasureRetry { attempt } => {
                self.measure_timer = None;
                self.try_measure(attempt)
            }
            ChildTimer::HideTooltip => {
                if self.hide_timer.take().is_none() {
                    return Ok(());
                }
                self.hiding = true;
                self.tooltip_visible = false;
                self.dom.set_tooltip_visible(false);
                self.request_frame();
                Ok(())
            }
            ChildTimer::LayoutPoll => {
                self.poll_timer = Some(self.dom.schedule(self.config.poll_interval, ChildTimer::LayoutPoll));
                self.on_layout_change();
                Ok(())
            }
        }
    }

    /// The user pressed the confirm button.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn confirm(&mut self) -> Result<(), ProtocolError> {
        self.post(&ButtonMessage::Confirm)
    }

    /// Forwards an uncaught error to the host.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn report_error(&mut self, error: &str) -> Result<(), ProtocolError> {
        self.post(&ButtonMessage::IframeError(error.to_string()))
    }

    /// Forwards an unhandled promise rejection to the host.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn report_unhandled_rejection(&mut self, reason: &str) -> Result<(), ProtocolError> {
        self.post(&ButtonMessage::IframeUnhandledRejection(reason.to_string()))
    }

    fn post(&mut self, message: &ButtonMessage) -> Result<(), ProtocolError> {
        self.core.post::<ButtonChannel>(&mut self.dom, message)
    }

    /// Current handshake phase.
    #[must_use]
    pub const fn phase(&self) -> ChildPhase {
        self.phase
    }

    /// Origin captured from the init message.
    #[must_use]
    pub fn trusted_origin(&self) -> Option<&str> {
        self.core.origin.get()
    }

    /// Whether the tooltip is currently shown.
    #[must_use]
    pub const fn is_tooltip_visible(&self) -> bool {
        self.tooltip_visible
    }

    /// The DOM the controller drives.
    #[must_use]
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access to the DOM, e.g. to drain due timers.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }
}
