//! Host controller for the button-with-tooltip widget.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::digest::{PendingDigests, UiDigestFuture};
use super::{build_srcdoc, ClipTarget, HostEvent, HostPhase, HostTimer};
use crate::channel::{
    decode, encode, ButtonChannel, ButtonMessage, Channel, CssProperties, HoverPayload, IframeInitData,
    MessageSource, StylePayload, TargetOrigin, TxData,
};
use crate::defaults::{BUTTON_TAG_NAME, CLIP_PADDING_PX};
use crate::error::{ConfirmKitError, GeometryError, ProtocolError};
use crate::geometry::{
    ClipPath, ClipPathGenerator, Dimension, IframeLayout, Point, Size, TooltipConfig,
    TooltipGeometry,
};
use crate::preferences::{ConfirmBehavior, Theme, UserPreferences};

const DEFAULT_BUTTON_WIDTH_PX: f64 = 200.0;
const DEFAULT_BUTTON_HEIGHT_PX: f64 = 48.0;
const DEFAULT_BACKGROUND_COLOR: &str = "#2563eb";

fn default_tag_name() -> String {
    BUTTON_TAG_NAME.to_string()
}

const fn default_width() -> Dimension {
    Dimension::Px(DEFAULT_BUTTON_WIDTH_PX)
}

const fn default_height() -> Dimension {
    Dimension::Px(DEFAULT_BUTTON_HEIGHT_PX)
}

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

/// Configuration of an embedded confirm button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonHostConfig {
    /// Custom element rendered inside the iframe.
    #[serde(default = "default_tag_name")]
    pub tag_name: String,
    /// URL of the child bootstrap module.
    pub bootstrap_url: String,
    /// Button width.
    #[serde(default = "default_width")]
    pub width: Dimension,
    /// Button height.
    #[serde(default = "default_height")]
    pub height: Dimension,
    /// Button background color.
    #[serde(default = "default_background_color")]
    pub background_color: String,
    /// Tooltip size, placement and gap.
    #[serde(default)]
    pub tooltip: TooltipConfig,
    /// Button CSS.
    #[serde(default)]
    pub button_style: CssProperties,
    /// Button CSS while hovered.
    #[serde(default)]
    pub button_hover_style: CssProperties,
    /// Styles for the transaction tree inside the tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip_tree_styles: Option<Value>,
}

impl ButtonHostConfig {
    /// Configuration with default sizes and styles.
    #[must_use]
    pub fn new(bootstrap_url: impl Into<String>) -> Self {
        Self {
            tag_name: default_tag_name(),
            bootstrap_url: bootstrap_url.into(),
            width: default_width(),
            height: default_height(),
            background_color: default_background_color(),
            tooltip: TooltipConfig::default(),
            button_style: CssProperties::new(),
            button_hover_style: CssProperties::new(),
            tooltip_tree_styles: None,
        }
    }

    /// Resolved button size.
    ///
    /// # Errors
    /// Returns a [`GeometryError`] when width or height is not a pixel value.
    pub fn button_size(&self) -> Result<Size, GeometryError> {
        Ok(Size::new(self.width.to_px()?, self.height.to_px()?))
    }

    /// Iframe layout for this configuration.
    ///
    /// # Errors
    /// Returns a [`GeometryError`] for unresolvable dimensions.
    pub fn layout(&self) -> Result<IframeLayout, GeometryError> {
        IframeLayout::compute(self.button_size()?, &self.tooltip)
    }
}

/// Drives one button iframe: handshake, clip-path, iframe size and the
/// application state forwarded to the widget.
///
/// The controller is sans-IO. Inbound messages enter through
/// [`ButtonHost::handle_message`], due timers through [`ButtonHost::on_timer`];
/// every effect goes out through the platform.
#[derive(Debug)]
pub struct ButtonHost<P: ClipTarget> {
    platform: P,
    config: ButtonHostConfig,
    button_size: Size,
    layout: IframeLayout,
    clip: ClipPathGenerator,
    phase: HostPhase,
    geometry: Option<TooltipGeometry>,
    hovering: bool,
    initial_state_sent: bool,
    announced_interactive: bool,
    tx_data: Option<TxData>,
    loading: bool,
    preferences: Option<UserPreferences>,
    digests: PendingDigests,
    applied_clip: Option<String>,
    iframe_size: Option<Size>,
    clip_warned: bool,
}

impl<P: ClipTarget> ButtonHost<P> {
    /// Creates a controller. The configuration is validated here so an
    /// unusable size fails before anything is mounted.
    ///
    /// # Errors
    /// Returns [`ConfirmKitError::Geometry`] for unresolvable dimensions.
    pub fn new(platform: P, config: ButtonHostConfig) -> Result<Self, ConfirmKitError> {
        let button_size = config.button_size()?;
        let layout = IframeLayout::compute(button_size, &config.tooltip)?;
        let clip = ClipPathGenerator::new(platform.supports_clip_path());
        Ok(Self {
            platform,
            config,
            button_size,
            layout,
            clip,
            phase: HostPhase::Idle,
            geometry: None,
            hovering: false,
            initial_state_sent: false,
            announced_interactive: false,
            tx_data: None,
            loading: false,
            preferences: None,
            digests: PendingDigests::default(),
            applied_clip: None,
            iframe_size: None,
            clip_warned: false,
        })
    }

    /// Uses the account's stored preferences for theme and behavior.
    #[must_use]
    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Attaches the message listener, then sets `srcdoc` and the base size.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidConfig`] for an unusable tag name or
    /// bootstrap URL.
    pub fn mount(&mut self) -> Result<(), ProtocolError> {
        if self.phase != HostPhase::Idle {
            log::debug!("button iframe already mounted");
            return Ok(());
        }
        let background = Some(self.config.background_color.as_str()).filter(|c| !c.is_empty());
        let html = build_srcdoc(&self.config.tag_name, &self.config.bootstrap_url, background)?;

        // The listener must exist before navigation starts or READY can be lost.
        self.platform.listen();
        self.platform.set_srcdoc(&html);
        self.resize(self.layout.iframe_size);
        self.phase = HostPhase::IframeMounted;
        Ok(())
    }

    /// Handles one inbound `message` event. Messages from other windows and
    /// unknown types are logged and dropped.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] only when an outbound message cannot be encoded.
    pub fn handle_message(&mut self, source: MessageSource, raw: &str) -> Result<(), ProtocolError> {
        if source == MessageSource::Foreign {
            log::debug!("ignoring message from a foreign window");
            return Ok(());
        }
        match decode::<ButtonChannel>(raw) {
            Ok(message) => self.dispatch(message),
            Err(err @ ProtocolError::UnknownMessageType { .. }) => {
                log::debug!("{err}");
                Ok(())
            }
            Err(err) => {
                log::warn!("dropping button message: {err}");
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, message: ButtonMessage) -> Result<(), ProtocolError> {
        match message {
            ButtonMessage::Ready => self.on_ready(),
            ButtonMessage::Positioned(position) => self.on_positioned(position),
            ButtonMessage::GeometryResult(geometry) => self.on_geometry_result(geometry),
            ButtonMessage::ElementDefined => self.on_element_defined(),
            ButtonMessage::TooltipState(geometry) => {
                self.on_tooltip_state(geometry);
                Ok(())
            }
            ButtonMessage::ButtonHover(HoverPayload { hovering }) => {
                self.on_hover(hovering);
                Ok(())
            }
            ButtonMessage::Confirm => {
                self.platform.emit(HostEvent::Confirmed);
                Ok(())
            }
            ButtonMessage::UiIntentDigest(response) => {
                self.digests.settle(&mut self.platform, response);
                Ok(())
            }
            ButtonMessage::IframeError(error) => {
                log::error!("button iframe error: {error}");
                self.platform.emit(HostEvent::ChildError(error));
                Ok(())
            }
            ButtonMessage::IframeUnhandledRejection(reason) => {
                log::error!("button iframe unhandled rejection: {reason}");
                self.platform.emit(HostEvent::ChildUnhandledRejection(reason));
                Ok(())
            }
            ButtonMessage::Init(_)
            | ButtonMessage::GeometryRequest
            | ButtonMessage::SetTxData(_)
            | ButtonMessage::SetLoading(_)
            | ButtonMessage::SetStyle(_)
            | ButtonMessage::RequestUiDigest => {
                log::debug!(
                    "ignoring host-bound {} sent by the iframe",
                    ButtonChannel::message_type(&message)
                );
                Ok(())
            }
        }
    }

    fn on_ready(&mut self) -> Result<(), ProtocolError> {
        if self.phase > HostPhase::IframeMounted {
            log::debug!("duplicate READY ignored");
            return Ok(());
        }
        self.send_init()?;
        self.platform.emit(HostEvent::Ready);
        Ok(())
    }

    fn send_init(&mut self) -> Result<(), ProtocolError> {
        let init = IframeInitData {
            size: self.button_size,
            tooltip: self.config.tooltip.clone(),
            button_position: self.layout.button_position,
            background_color: self.config.background_color.clone(),
            tag_name: self.config.tag_name.clone(),
            target_origin: self.platform.host_origin(),
        };
        self.post(&ButtonMessage::Init(init))?;
        // Optimistic region around where the button should land, replaced as
        // soon as the child reports real geometry.
        self.apply_clip(self.clip.around(self.layout.button));
        self.phase = HostPhase::InitSent;
        Ok(())
    }

    fn on_positioned(&mut self, position: Point) -> Result<(), ProtocolError> {
        if self.phase != HostPhase::InitSent {
            log::debug!("unexpected HS2_POSITIONED in phase {:?}", self.phase);
            return Ok(());
        }
        if position != self.layout.button_position {
            log::warn!(
                "child positioned button at {position:?}, expected {:?}",
                self.layout.button_position
            );
        }
        self.post(&ButtonMessage::GeometryRequest)?;
        self.phase = HostPhase::PositionAcked;
        Ok(())
    }

    fn on_geometry_result(&mut self, geometry: TooltipGeometry) -> Result<(), ProtocolError> {
        if self.phase != HostPhase::PositionAcked {
            log::debug!("unexpected HS5_GEOMETRY_RESULT in phase {:?}", self.phase);
            return Ok(());
        }
        if !in_range(&geometry) {
            return Ok(());
        }
        self.geometry = Some(geometry);
        self.phase = HostPhase::GeometryReceived;
        self.apply_interaction_state();
        self.maybe_interactive();
        Ok(())
    }

    fn on_element_defined(&mut self) -> Result<(), ProtocolError> {
        if self.initial_state_sent {
            log::debug!("duplicate ETX_DEFINED ignored");
            return Ok(());
        }
        if let Some(tx_data) = self.tx_data.clone() {
            self.post(&ButtonMessage::SetTxData(tx_data))?;
        }
        self.post(&ButtonMessage::SetLoading(self.loading))?;
        self.post(&ButtonMessage::SetStyle(self.style_payload()))?;
        self.initial_state_sent = true;
        self.maybe_interactive();
        Ok(())
    }

    fn maybe_interactive(&mut self) {
        if self.phase != HostPhase::GeometryReceived || !self.initial_state_sent {
            return;
        }
        self.phase = HostPhase::Interactive;
        if !self.announced_interactive {
            self.announced_interactive = true;
            log::debug!("button iframe interactive");
            self.platform.emit(HostEvent::Interactive);
        }
    }

    fn on_tooltip_state(&mut self, geometry: TooltipGeometry) {
        if self.geometry.as_ref() == Some(&geometry) {
            log::trace!("unchanged TOOLTIP_STATE ignored");
            return;
        }
        if !in_range(&geometry) {
            return;
        }
        self.geometry = Some(geometry);
        self.apply_interaction_state();
    }

    fn on_hover(&mut self, hovering: bool) {
        if self.hovering == hovering {
            return;
        }
        self.hovering = hovering;
        self.apply_interaction_state();
    }

    /// Widens while hovered or while the tooltip is visible; narrows only once
    /// both are false.
    fn apply_interaction_state(&mut self) {
        let Some(geometry) = self.geometry.as_ref() else {
            return;
        };
        let expanded = geometry.visible || self.hovering;
        let clip = self.clip.for_state(geometry, expanded);
        let size = match geometry.checked_extent(CLIP_PADDING_PX) {
            Some(extent) if expanded => self.layout.iframe_size.max(Size::new(
                f64::from(extent.right()),
                f64::from(extent.bottom()),
            )),
            _ => self.layout.iframe_size,
        };

        // Grow before widening the clip, narrow the clip before shrinking.
        if expanded {
            self.resize(size);
            self.apply_clip(clip);
        } else {
            self.apply_clip(clip);
            self.resize(size);
        }
    }

    fn apply_clip(&mut self, clip: Option<ClipPath>) {
        if !self.clip.is_supported() {
            if !self.clip_warned {
                self.clip_warned = true;
                log::warn!("clip-path polygon unsupported, leaving iframe uncropped");
                self.platform.set_clip_path(None);
            }
            return;
        }
        let css = clip.map(|clip| clip.to_css());
        if css != self.applied_clip {
            self.platform.set_clip_path(css.as_deref());
            self.applied_clip = css;
        }
    }

    fn resize(&mut self, size: Size) {
        if self.iframe_size != Some(size) {
            self.platform.set_iframe_size(size);
            self.iframe_size = Some(size);
        }
    }

    fn style_payload(&self) -> StylePayload {
        StylePayload {
            button_style: self.config.button_style.clone(),
            button_hover_style: self.config.button_hover_style.clone(),
            tooltip_position: self.config.tooltip.clone(),
            tooltip_tree_styles: self.config.tooltip_tree_styles.clone(),
            theme: self.preferences.map(|preferences| preferences.theme),
        }
    }

    fn post(&mut self, message: &ButtonMessage) -> Result<(), ProtocolError> {
        let raw = encode::<ButtonChannel>(message)?;
        log::trace!("host -> button iframe: {raw}");
        // srcdoc iframes have an opaque origin from the host's point of view.
        self.platform.post_message(&raw, &TargetOrigin::Any);
        Ok(())
    }

    /// Replaces the transactions shown in the tooltip.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the data cannot be encoded.
    pub fn set_tx_data(&mut self, tx_data: TxData) -> Result<(), ProtocolError> {
        if self.initial_state_sent {
            self.post(&ButtonMessage::SetTxData(tx_data.clone()))?;
        }
        self.tx_data = Some(tx_data);
        Ok(())
    }

    /// Toggles the loading indicator.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn set_loading(&mut self, loading: bool) -> Result<(), ProtocolError> {
        self.loading = loading;
        if self.initial_state_sent {
            self.post(&ButtonMessage::SetLoading(loading))?;
        }
        Ok(())
    }

    /// Applies a new configuration. Positioning re-runs only when the button
    /// size or the tooltip configuration changed; styles are re-sent whenever
    /// the element is defined.
    ///
    /// # Errors
    /// Returns a [`ConfirmKitError`] for unresolvable dimensions or encoding failures.
    pub fn update_config(&mut self, config: ButtonHostConfig) -> Result<(), ConfirmKitError> {
        let button_size = config.button_size()?;
        let layout = IframeLayout::compute(button_size, &config.tooltip)?;
        let reposition = button_size != self.button_size || config.tooltip != self.config.tooltip;

        self.config = config;
        self.button_size = button_size;
        self.layout = layout;

        if self.initial_state_sent {
            self.post(&ButtonMessage::SetStyle(self.style_payload()))?;
        }
        if !reposition {
            return Ok(());
        }
        if self.phase == HostPhase::Idle {
            return Ok(());
        }

        self.resize(self.layout.iframe_size);
        if self.phase >= HostPhase::InitSent {
            log::debug!("button layout changed, re-running positioning");
            self.geometry = None;
            self.send_init()?;
        }
        Ok(())
    }

    /// Asks the iframe for the digest of what it displays. A newer request
    /// supersedes this one.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the request cannot be encoded.
    pub fn request_ui_intent_digest(&mut self) -> Result<UiDigestFuture, ProtocolError> {
        let future = self.digests.issue(&mut self.platform);
        self.post(&ButtonMessage::RequestUiDigest)?;
        Ok(future)
    }

    /// Handles a due timer.
    pub fn on_timer(&mut self, timer: HostTimer) {
        match timer {
            HostTimer::DigestTimeout { request_id } => {
                self.digests.expire(request_id);
            }
        }
    }

    /// Current handshake phase.
    #[must_use]
    pub const fn phase(&self) -> HostPhase {
        self.phase
    }

    /// Latest geometry reported by the child.
    #[must_use]
    pub const fn geometry(&self) -> Option<&TooltipGeometry> {
        self.geometry.as_ref()
    }

    /// Pre-computed iframe layout.
    #[must_use]
    pub const fn layout(&self) -> &IframeLayout {
        &self.layout
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ButtonHostConfig {
        &self.config
    }

    /// Whether the pointer is over the button.
    #[must_use]
    pub const fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Clip-path currently applied to the iframe.
    #[must_use]
    pub fn clip_path(&self) -> Option<&str> {
        self.applied_clip.as_deref()
    }

    /// Confirmation behavior from the user's preferences.
    #[must_use]
    pub fn behavior(&self) -> ConfirmBehavior {
        self.preferences.map(|p| p.behavior).unwrap_or_default()
    }

    /// Theme from the user's preferences.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.preferences.map(|p| p.theme).unwrap_or_default()
    }

    /// The platform the controller drives.
    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the platform, e.g. to drain due timers.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

/// Geometry comes from the iframe; edges that overflow once padded are
/// dropped instead of being clamped into a bogus clip region.
fn in_range(geometry: &TooltipGeometry) -> bool {
    if geometry.checked_extent(CLIP_PADDING_PX).is_some() {
        return true;
    }
    log::warn!("dropping geometry with out-of-range edges: {geometry:?}");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::DigestResponse;
    use crate::digest::TransactionInput;
    use crate::error::DigestError;
    use crate::geometry::{Rect, TooltipPosition};
    use crate::test_support::MemoryIframe;

    const HOST: &str = "https://wallet.example";

    fn host() -> ButtonHost<MemoryIframe> {
        let config = ButtonHostConfig::new("https://wallet.example/button.js");
        let mut host = ButtonHost::new(MemoryIframe::new(HOST), config).unwrap();
        host.mount().unwrap();
        host
    }

    fn child(host: &mut ButtonHost<MemoryIframe>, message: ButtonMessage) {
        let raw = encode::<ButtonChannel>(&message).unwrap();
        host.handle_message(MessageSource::ContentWindow, &raw).unwrap();
    }

    fn measured(host: &ButtonHost<MemoryIframe>, visible: bool) -> TooltipGeometry {
        TooltipGeometry {
            button: host.layout().button,
            tooltip: Rect::new(4, 4, 280, 150),
            position: TooltipPosition::TopCenter,
            gap: 4.0,
            visible,
        }
    }

    fn handshake(host: &mut ButtonHost<MemoryIframe>) {
        child(host, ButtonMessage::Ready);
        let position = host.layout().button_position;
        child(host, ButtonMessage::Positioned(position));
        let geometry = measured(host, false);
        child(host, ButtonMessage::GeometryResult(geometry));
        child(host, ButtonMessage::ElementDefined);
    }

    fn expected_clip(rect: Rect) -> String {
        ClipPathGenerator::default().around(rect).unwrap().to_css()
    }

    #[test]
    fn test_mount_listens_before_navigation() {
        let host = host();
        assert_eq!(host.platform().calls[..2], ["listen", "set_srcdoc"]);
        assert!(host
            .platform()
            .srcdoc
            .as_deref()
            .unwrap()
            .contains("<iframe-button-with-tooltip-confirmer"));
        assert_eq!(host.platform().current_size(), Some(Size::new(288.0, 360.0)));
        assert_eq!(host.phase(), HostPhase::IframeMounted);
    }

    #[test]
    fn test_ready_sends_init_and_optimistic_clip() {
        let mut host = host();
        child(&mut host, ButtonMessage::Ready);

        let sent = host.platform().sent::<ButtonChannel>();
        let [ButtonMessage::Init(init)] = sent.as_slice() else {
            panic!("expected a single init, got {sent:?}");
        };
        assert_eq!(init.target_origin, HOST);
        assert_eq!(init.button_position, Point { x: 44.0, y: 308.0 });
        assert_eq!(init.size, Size::new(200.0, 48.0));
        assert_eq!(
            host.platform().current_clip_path(),
            Some(expected_clip(Rect::new(44, 308, 200, 48)).as_str())
        );
        assert_eq!(host.platform().events, vec![HostEvent::Ready]);
        assert_eq!(host.phase(), HostPhase::InitSent);
        assert!(host.platform().outbox.iter().all(|(_, target)| *target == TargetOrigin::Any));
    }

    #[test]
    fn test_duplicate_ready_is_ignored() {
        let mut host = host();
        child(&mut host, ButtonMessage::Ready);
        child(&mut host, ButtonMessage::Ready);
        assert_eq!(host.platform().sent_types(), vec!["HS1_INIT"]);
    }

    #[test]
    fn test_full_handshake_reaches_interactive() {
        let mut host = host();
        host.set_loading(true).unwrap();
        handshake(&mut host);

        assert_eq!(
            host.platform().sent_types(),
            vec!["HS1_INIT", "HS3_GEOMETRY_REQUEST", "SET_LOADING", "SET_STYLE"]
        );
        assert_eq!(host.phase(), HostPhase::Interactive);
        assert_eq!(
            host.platform().events,
            vec![HostEvent::Ready, HostEvent::Interactive]
        );
        assert_eq!(
            host.clip_path(),
            Some(expected_clip(Rect::new(44, 308, 200, 48)).as_str())
        );
    }

    #[test]
    fn test_visible_tooltip_expands_and_hidden_shrinks() {
        let mut host = host();
        handshake(&mut host);

        let visible = measured(&host, true);
        child(&mut host, ButtonMessage::TooltipState(visible.clone()));
        assert_eq!(host.clip_path(), Some(expected_clip(visible.union()).as_str()));

        let msg = ButtonMessage::TooltipState(measured(&host, false));
        child(&mut host, msg);
        assert_eq!(
            host.clip_path(),
            Some(expected_clip(Rect::new(44, 308, 200, 48)).as_str())
        );
        assert_eq!(host.platform().current_size(), Some(Size::new(288.0, 360.0)));
    }

    #[test]
    fn test_out_of_range_geometry_is_dropped() {
        let mut host = host();
        child(&mut host, ButtonMessage::Ready);
        let position = host.layout().button_position;
        child(&mut host, ButtonMessage::Positioned(position));

        let mut overflowing = measured(&host, false);
        overflowing.button = Rect::new(i32::MAX - 10, 308, 200, 48);
        child(&mut host, ButtonMessage::GeometryResult(overflowing));
        assert_eq!(host.phase(), HostPhase::PositionAcked);

        let msg = ButtonMessage::GeometryResult(measured(&host, false));
        child(&mut host, msg);
        child(&mut host, ButtonMessage::ElementDefined);
        let clip = host.clip_path().map(ToString::to_string);
        let size = host.platform().current_size();

        let mut overflowing = measured(&host, true);
        overflowing.tooltip = Rect::new(2_147_483_000, 4, 100_000, 150);
        child(&mut host, ButtonMessage::TooltipState(overflowing));

        assert!(host.geometry().is_some_and(|geometry| !geometry.visible));
        assert_eq!(host.clip_path().map(ToString::to_string), clip);
        assert_eq!(host.platform().current_size(), size);
        assert_eq!(host.phase(), HostPhase::Interactive);
    }

    #[test]
    fn test_iframe_grows_to_cover_overflowing_tooltip() {
        let mut host = host();
        handshake(&mut host);

        let mut tall = measured(&host, true);
        tall.tooltip = Rect::new(4, 4, 400, 420);
        child(&mut host, ButtonMessage::TooltipState(tall));
        assert_eq!(host.platform().current_size(), Some(Size::new(408.0, 428.0)));
    }

    #[test]
    fn test_hover_keeps_region_until_both_flags_clear() {
        let mut host = host();
        handshake(&mut host);
        let union_clip = expected_clip(measured(&host, true).union());
        let button_clip = expected_clip(Rect::new(44, 308, 200, 48));

        child(&mut host, ButtonMessage::ButtonHover(HoverPayload { hovering: true }));
        assert_eq!(host.clip_path(), Some(union_clip.as_str()));

        let msg = ButtonMessage::TooltipState(measured(&host, true));
        child(&mut host, msg);
        child(&mut host, ButtonMessage::ButtonHover(HoverPayload { hovering: false }));
        assert_eq!(host.clip_path(), Some(union_clip.as_str()));

        let msg = ButtonMessage::TooltipState(measured(&host, false));
        child(&mut host, msg);
        assert_eq!(host.clip_path(), Some(button_clip.as_str()));
    }

    #[test]
    fn test_unsupported_clip_path_degrades_once() {
        let config = ButtonHostConfig::new("/button.js");
        let mut host =
            ButtonHost::new(MemoryIframe::new(HOST).without_clip_path(), config).unwrap();
        host.mount().unwrap();
        handshake(&mut host);
        let msg = ButtonMessage::TooltipState(measured(&host, true));
        child(&mut host, msg);

        assert_eq!(host.platform().clip_paths, vec![None]);
        assert_eq!(host.phase(), HostPhase::Interactive);
    }

    #[test]
    fn test_foreign_messages_are_dropped() {
        let mut host = host();
        let raw = encode::<ButtonChannel>(&ButtonMessage::Ready).unwrap();
        host.handle_message(MessageSource::Foreign, &raw).unwrap();
        host.handle_message(MessageSource::ContentWindow, r#"{"type":"CANCEL"}"#)
            .unwrap();
        host.handle_message(MessageSource::ContentWindow, "garbage").unwrap();
        assert!(host.platform().outbox.is_empty());
        assert_eq!(host.phase(), HostPhase::IframeMounted);
    }

    #[test]
    fn test_tx_data_is_buffered_until_element_defined() {
        let mut host = host();
        let tx_data = TxData {
            near_account_id: "alice.near".to_string(),
            tx_signing_requests: vec![TransactionInput {
                receiver_id: "bob.near".to_string(),
                actions: vec![],
            }],
        };
        host.set_tx_data(tx_data.clone()).unwrap();
        assert!(host.platform().outbox.is_empty());

        handshake(&mut host);
        let sent = host.platform().sent::<ButtonChannel>();
        assert_eq!(
            sent.iter()
                .filter(|m| matches!(m, ButtonMessage::SetTxData(data) if *data == tx_data))
                .count(),
            1
        );

        host.set_loading(true).unwrap();
        assert_eq!(host.platform().sent_types().last(), Some(&"SET_LOADING".to_string()));
    }

    #[test]
    fn test_style_carries_theme_from_preferences() {
        let config = ButtonHostConfig::new("/button.js");
        let mut host = ButtonHost::new(MemoryIframe::new(HOST), config)
            .unwrap()
            .with_preferences(UserPreferences {
                behavior: ConfirmBehavior::AutoProceed,
                theme: Theme::Light,
            });
        host.mount().unwrap();
        handshake(&mut host);

        let style = host
            .platform()
            .sent::<ButtonChannel>()
            .into_iter()
            .find_map(|m| match m {
                ButtonMessage::SetStyle(style) => Some(style),
                _ => None,
            })
            .unwrap();
        assert_eq!(style.theme, Some(Theme::Light));
        assert_eq!(host.behavior(), ConfirmBehavior::AutoProceed);
    }

    #[test]
    fn test_update_config_reinitializes_only_on_layout_change() {
        let mut host = host();
        handshake(&mut host);

        let mut restyled = host.config().clone();
        restyled
            .button_style
            .insert("color".to_string(), "white".to_string());
        host.update_config(restyled.clone()).unwrap();
        assert_eq!(host.platform().sent_types().last(), Some(&"SET_STYLE".to_string()));
        assert_eq!(host.phase(), HostPhase::Interactive);

        let mut resized = restyled;
        resized.width = Dimension::from("240px");
        host.update_config(resized).unwrap();
        assert_eq!(host.platform().sent_types().last(), Some(&"HS1_INIT".to_string()));
        assert_eq!(host.phase(), HostPhase::InitSent);

        let position = host.layout().button_position;
        child(&mut host, ButtonMessage::Positioned(position));
        let geometry = measured(&host, false);
        child(&mut host, ButtonMessage::GeometryResult(geometry));
        assert_eq!(host.phase(), HostPhase::Interactive);
        assert_eq!(
            host.platform()
                .events
                .iter()
                .filter(|e| **e == HostEvent::Interactive)
                .count(),
            1
        );
    }

    #[test]
    fn test_invalid_dimensions_fail_fast() {
        let mut config = ButtonHostConfig::new("/button.js");
        config.height = Dimension::from("auto");
        assert!(matches!(
            ButtonHost::new(MemoryIframe::new(HOST), config),
            Err(ConfirmKitError::Geometry(GeometryError::InvalidPixelValue { .. }))
        ));
    }

    #[test]
    fn test_digest_round_trip_and_timeout() {
        let mut host = host();
        handshake(&mut host);

        let first = host.request_ui_intent_digest().unwrap();
        child(
            &mut host,
            ButtonMessage::UiIntentDigest(DigestResponse::success("abc".to_string())),
        );
        assert_eq!(tokio_test::block_on(first), Ok("abc".to_string()));

        let mut second = host.request_ui_intent_digest().unwrap();
        for timer in host.platform_mut().timers.advance(crate::defaults::DIGEST_TIMEOUT) {
            host.on_timer(timer);
        }
        assert_eq!(second.try_result(), Some(Err(DigestError::Timeout)));
    }

    #[test]
    fn test_child_errors_are_forwarded() {
        let mut host = host();
        child(&mut host, ButtonMessage::IframeError("boom".to_string()));
        child(&mut host, ButtonMessage::Confirm);
        assert_eq!(
            host.platform().events,
            vec![HostEvent::ChildError("boom".to_string()), HostEvent::Confirmed]
        );
    }
}
