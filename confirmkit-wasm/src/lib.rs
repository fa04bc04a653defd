//! WebAssembly bindings for `confirmkit_core`.
//!
//! Each controller is wrapped in a handle class for browser usage through
//! `wasm-bindgen`. Browser capabilities are supplied by a plain JS "bridge"
//! object whose methods the core invokes through `Reflect`. Timers are
//! identified by numeric tokens: the bridge's `setTimeout(token, delayMs)`
//! must call the handle's `fireTimer(token)` once the delay elapsed.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use js_sys::{Array, Function, Promise, Reflect};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

use confirmkit_core::channel::{IframeInitData, StylePayload};
use confirmkit_core::logger::{set_logger, LogLevel, Logger};
use confirmkit_core::{
    compute_ui_intent_digest, parse_px, verify_ui_digest, ButtonBootstrap, ButtonDom, ButtonHost,
    ButtonHostConfig, ChildConfig, ChildDom, ChildTimer, ClipPathGenerator, ClipTarget,
    ConfirmKitError, HostEvent, HostTimer, IframeHost, MessageSink, MessageSource,
    ModalBootstrap, ModalHost, ModalHostConfig, ObserverSupport, Point, PointerTarget,
    ProtocolError, Rect, Scheduler, Size, TargetOrigin, TimerHandle, TransactionInput, TxData,
    UiDigestFuture, UserPreferences,
};

// ----------------------------------------------------------------------------
// Bridge plumbing
// ----------------------------------------------------------------------------

/// A JS object whose methods implement a platform capability.
struct Bridge(JsValue);

impl Bridge {
    fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
        let function = Reflect::get(&self.0, &JsValue::from_str(method))?.dyn_into::<Function>()?;
        let args: Array = args.iter().collect();
        function.apply(&self.0, &args)
    }

    /// Calls a method whose result is not needed. Failures are logged.
    fn notify(&self, method: &str, args: &[JsValue]) {
        if let Err(err) = self.call(method, args) {
            log::warn!("bridge method {method} failed: {}", describe(&err));
        }
    }

    /// Like [`Bridge::notify`] with a single serialized argument.
    fn notify_with<T: Serialize + ?Sized>(&self, method: &str, value: &T) {
        match to_js(value) {
            Ok(value) => self.notify(method, &[value]),
            Err(err) => log::warn!("cannot serialize {method} argument: {err}"),
        }
    }

    fn is_truthy(&self, method: &str, args: &[JsValue]) -> bool {
        self.call(method, args)
            .map(|value| value.is_truthy())
            .unwrap_or_else(|err| {
                log::warn!("bridge method {method} failed: {}", describe(&err));
                false
            })
    }
}

/// Timers scheduled through the bridge, keyed by the token JS hands back.
struct TokenTimers<T> {
    next: u32,
    pending: HashMap<u32, T>,
}

impl<T> Default for TokenTimers<T> {
    fn default() -> Self {
        Self {
            next: 0,
            pending: HashMap::new(),
        }
    }
}

impl<T> TokenTimers<T> {
    fn schedule(&mut self, bridge: &Bridge, delay: Duration, timer: T) -> TimerHandle {
        self.next = self.next.wrapping_add(1);
        let token = self.next;
        self.pending.insert(token, timer);
        bridge.notify(
            "setTimeout",
            &[
                JsValue::from(token),
                JsValue::from_f64(delay.as_secs_f64() * 1000.0),
            ],
        );
        TimerHandle(u64::from(token))
    }

    fn cancel(&mut self, bridge: &Bridge, handle: TimerHandle) {
        let Ok(token) = u32::try_from(handle.0) else {
            return;
        };
        if self.pending.remove(&token).is_some() {
            bridge.notify("clearTimeout", &[JsValue::from(token)]);
        }
    }

    fn take(&mut self, token: u32) -> Option<T> {
        self.pending.remove(&token)
    }
}

/// Host-page platform: the iframe element and the page's `message` listener.
///
/// Bridge methods: `postMessage(message, targetOrigin)`, `listen()`,
/// `setSrcdoc(html)`, `emit(event)`, `supportsClipPath()`,
/// `setClipPath(css | null)`, `setIframeSize(width, height)`,
/// `setTimeout(token, delayMs)`, `clearTimeout(token)`.
struct JsIframeHost {
    bridge: Bridge,
    host_origin: String,
    timers: TokenTimers<HostTimer>,
}

impl JsIframeHost {
    fn new(bridge: JsValue, host_origin: String) -> Self {
        Self {
            bridge: Bridge(bridge),
            host_origin,
            timers: TokenTimers::default(),
        }
    }
}

impl MessageSink for JsIframeHost {
    fn post_message(&mut self, message: &str, target_origin: &TargetOrigin) {
        self.bridge.notify(
            "postMessage",
            &[
                JsValue::from_str(message),
                JsValue::from_str(target_origin.as_str()),
            ],
        );
    }
}

impl Scheduler<HostTimer> for JsIframeHost {
    fn schedule(&mut self, delay: Duration, timer: HostTimer) -> TimerHandle {
        self.timers.schedule(&self.bridge, delay, timer)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(&self.bridge, handle);
    }
}

impl IframeHost for JsIframeHost {
    fn host_origin(&self) -> String {
        self.host_origin.clone()
    }

    fn listen(&mut self) {
        self.bridge.notify("listen", &[]);
    }

    fn set_srcdoc(&mut self, html: &str) {
        self.bridge.notify("setSrcdoc", &[JsValue::from_str(html)]);
    }

    fn emit(&mut self, event: HostEvent) {
        self.bridge.notify_with("emit", &event);
    }
}

impl ClipTarget for JsIframeHost {
    fn supports_clip_path(&self) -> bool {
        self.bridge.is_truthy("supportsClipPath", &[])
    }

    fn set_clip_path(&mut self, clip_path: Option<&str>) {
        let value = clip_path.map_or(JsValue::NULL, JsValue::from_str);
        self.bridge.notify("setClipPath", &[value]);
    }

    fn set_iframe_size(&mut self, size: Size) {
        self.bridge.notify(
            "setIframeSize",
            &[JsValue::from_f64(size.width), JsValue::from_f64(size.height)],
        );
    }
}

/// Iframe document platform shared by both bootstraps.
///
/// Bridge methods: `postMessage(message, targetOrigin)`, `listen()`,
/// `waitForDefinition(tagName)`, `requestAnimationFrame()`,
/// `applyTxData(txData)`, `applyLoading(loading)`, `setTimeout(token, delayMs)`,
/// `clearTimeout(token)`; and for the button only `applyInit(init)`,
/// `positionContainer(point)`, `measureButton()`, `measureTooltip()`,
/// `setTooltipVisible(visible)`, `observeLayout()`, `applyStyle(style)`.
struct JsDom {
    bridge: Bridge,
    timers: TokenTimers<ChildTimer>,
}

impl JsDom {
    fn new(bridge: JsValue) -> Self {
        Self {
            bridge: Bridge(bridge),
            timers: TokenTimers::default(),
        }
    }

    fn measure(&self, method: &str) -> Option<Rect> {
        let value = match self.bridge.call(method, &[]) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("bridge method {method} failed: {}", describe(&err));
                return None;
            }
        };
        if value.is_null() || value.is_undefined() {
            return None;
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| log::warn!("{method} returned an invalid rect: {err}"))
            .ok()
    }
}

impl MessageSink for JsDom {
    fn post_message(&mut self, message: &str, target_origin: &TargetOrigin) {
        self.bridge.notify(
            "postMessage",
            &[
                JsValue::from_str(message),
                JsValue::from_str(target_origin.as_str()),
            ],
        );
    }
}

impl Scheduler<ChildTimer> for JsDom {
    fn schedule(&mut self, delay: Duration, timer: ChildTimer) -> TimerHandle {
        self.timers.schedule(&self.bridge, delay, timer)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(&self.bridge, handle);
    }
}

impl ChildDom for JsDom {
    fn listen(&mut self) {
        self.bridge.notify("listen", &[]);
    }

    fn wait_for_definition(&mut self, tag_name: &str) {
        self.bridge
            .notify("waitForDefinition", &[JsValue::from_str(tag_name)]);
    }

    fn request_animation_frame(&mut self) {
        self.bridge.notify("requestAnimationFrame", &[]);
    }

    fn apply_tx_data(&mut self, tx_data: &TxData) {
        self.bridge.notify_with("applyTxData", tx_data);
    }

    fn apply_loading(&mut self, loading: bool) {
        self.bridge
            .notify("applyLoading", &[JsValue::from_bool(loading)]);
    }
}

impl ButtonDom for JsDom {
    fn apply_init(&mut self, init: &IframeInitData) {
        self.bridge.notify_with("applyInit", init);
    }

    fn position_container(&mut self, position: Point) -> bool {
        match to_js(&position) {
            Ok(point) => self.bridge.is_truthy("positionContainer", &[point]),
            Err(err) => {
                log::warn!("cannot serialize container position: {err}");
                false
            }
        }
    }

    fn measure_button(&self) -> Option<Rect> {
        self.measure("measureButton")
    }

    fn measure_tooltip(&self) -> Option<Rect> {
        self.measure("measureTooltip")
    }

    fn set_tooltip_visible(&mut self, visible: bool) {
        self.bridge
            .notify("setTooltipVisible", &[JsValue::from_bool(visible)]);
    }

    fn observe_layout(&mut self) -> ObserverSupport {
        if self.bridge.is_truthy("observeLayout", &[]) {
            ObserverSupport::Native
        } else {
            ObserverSupport::Unsupported
        }
    }

    fn apply_style(&mut self, style: &StylePayload) {
        self.bridge.notify_with("applyStyle", style);
    }
}

// ----------------------------------------------------------------------------
// Host handles
// ----------------------------------------------------------------------------

/// Host-page controller of the button iframe.
#[wasm_bindgen]
pub struct ButtonHostHandle(ButtonHost<JsIframeHost>);

#[wasm_bindgen]
impl ButtonHostHandle {
    /// Creates the controller. `preferences` may be `null`.
    ///
    /// # Errors
    /// Throws when the configuration cannot be parsed or has unusable sizes.
    #[wasm_bindgen(constructor)]
    pub fn new(
        bridge: JsValue,
        host_origin: String,
        config: JsValue,
        preferences: JsValue,
    ) -> Result<Self, JsValue> {
        let config: ButtonHostConfig = from_js(config)?;
        let mut host = ButtonHost::new(JsIframeHost::new(bridge, host_origin), config)
            .map_err(|err| confirmkit_error_to_jsvalue(&err))?;
        if !preferences.is_null() && !preferences.is_undefined() {
            let preferences: UserPreferences = from_js(preferences)?;
            host = host.with_preferences(preferences);
        }
        Ok(Self(host))
    }

    /// Attaches the listener and loads the iframe document.
    ///
    /// # Errors
    /// Throws for an unusable tag name or bootstrap URL.
    pub fn mount(&mut self) -> Result<(), JsValue> {
        self.0.mount().map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Feeds a `message` event. `fromIframe` is
    /// `event.source === iframe.contentWindow`.
    ///
    /// # Errors
    /// Throws when an outbound reply cannot be encoded.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, from_iframe: bool, data: JsValue) -> Result<(), JsValue> {
        let raw = message_text(data)?;
        self.0
            .handle_message(message_source(from_iframe), &raw)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Hands a due timer back to the controller.
    #[wasm_bindgen(js_name = fireTimer)]
    pub fn fire_timer(&mut self, token: u32) {
        if let Some(timer) = self.0.platform_mut().timers.take(token) {
            self.0.on_timer(timer);
        }
    }

    /// # Errors
    /// Throws when `txData` has the wrong shape.
    #[wasm_bindgen(js_name = setTxData)]
    pub fn set_tx_data(&mut self, tx_data: JsValue) -> Result<(), JsValue> {
        let tx_data: TxData = from_js(tx_data)?;
        self.0
            .set_tx_data(tx_data)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when the message cannot be encoded.
    #[wasm_bindgen(js_name = setLoading)]
    pub fn set_loading(&mut self, loading: bool) -> Result<(), JsValue> {
        self.0
            .set_loading(loading)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Applies a new configuration, re-initializing the child when the size
    /// or tooltip changed.
    ///
    /// # Errors
    /// Throws when the configuration cannot be parsed or has unusable sizes.
    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: ButtonHostConfig = from_js(config)?;
        self.0
            .update_config(config)
            .map_err(|err| confirmkit_error_to_jsvalue(&err))
    }

    /// Asks the iframe for the digest of what it displays.
    ///
    /// # Errors
    /// Throws when the request cannot be encoded; the promise rejects on
    /// timeout, supersession or a failed answer.
    #[wasm_bindgen(js_name = requestUiIntentDigest)]
    pub fn request_ui_intent_digest(&mut self) -> Result<Promise, JsValue> {
        let future = self
            .0
            .request_ui_intent_digest()
            .map_err(|err| protocol_error_to_jsvalue(&err))?;
        Ok(digest_promise(future))
    }

    /// Current handshake phase, e.g. `"Interactive"`.
    #[must_use]
    pub fn phase(&self) -> String {
        format!("{:?}", self.0.phase())
    }

    /// CSS `clip-path` currently applied to the iframe.
    #[wasm_bindgen(js_name = clipPath)]
    #[must_use]
    pub fn clip_path(&self) -> Option<String> {
        self.0.clip_path().map(ToString::to_string)
    }

    /// Last tooltip geometry reported by the iframe, or `undefined`.
    ///
    /// # Errors
    /// Throws when the geometry cannot be converted.
    pub fn geometry(&self) -> Result<JsValue, JsValue> {
        self.0.geometry().map_or(Ok(JsValue::UNDEFINED), |geometry| {
            to_js(geometry).map_err(|err| JsValue::from_str(&err.to_string()))
        })
    }
}

/// Host-page controller of the modal iframe.
#[wasm_bindgen]
pub struct ModalHostHandle(ModalHost<JsIframeHost>);

#[wasm_bindgen]
impl ModalHostHandle {
    /// # Errors
    /// Throws when the configuration cannot be parsed.
    #[wasm_bindgen(constructor)]
    pub fn new(bridge: JsValue, host_origin: String, config: JsValue) -> Result<Self, JsValue> {
        let config: ModalHostConfig = from_js(config)?;
        Ok(Self(ModalHost::new(
            JsIframeHost::new(bridge, host_origin),
            config,
        )))
    }

    /// # Errors
    /// Throws for an unusable tag name or bootstrap URL.
    pub fn mount(&mut self) -> Result<(), JsValue> {
        self.0.mount().map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when an outbound reply cannot be encoded.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, from_iframe: bool, data: JsValue) -> Result<(), JsValue> {
        let raw = message_text(data)?;
        self.0
            .handle_message(message_source(from_iframe), &raw)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Hands a due timer back to the controller.
    #[wasm_bindgen(js_name = fireTimer)]
    pub fn fire_timer(&mut self, token: u32) {
        if let Some(timer) = self.0.platform_mut().timers.take(token) {
            self.0.on_timer(timer);
        }
    }

    /// # Errors
    /// Throws when `txData` has the wrong shape.
    #[wasm_bindgen(js_name = setTxData)]
    pub fn set_tx_data(&mut self, tx_data: JsValue) -> Result<(), JsValue> {
        let tx_data: TxData = from_js(tx_data)?;
        self.0
            .set_tx_data(tx_data)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when the message cannot be encoded.
    #[wasm_bindgen(js_name = setLoading)]
    pub fn set_loading(&mut self, loading: bool) -> Result<(), JsValue> {
        self.0
            .set_loading(loading)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when the request cannot be encoded.
    #[wasm_bindgen(js_name = requestUiIntentDigest)]
    pub fn request_ui_intent_digest(&mut self) -> Result<Promise, JsValue> {
        let future = self
            .0
            .request_ui_intent_digest()
            .map_err(|err| protocol_error_to_jsvalue(&err))?;
        Ok(digest_promise(future))
    }

    /// Current handshake phase, e.g. `"Interactive"`.
    #[must_use]
    pub fn phase(&self) -> String {
        format!("{:?}", self.0.phase())
    }
}

// ----------------------------------------------------------------------------
// Iframe handles
// ----------------------------------------------------------------------------

/// Bootstrap of the button iframe document.
#[wasm_bindgen]
pub struct ButtonBootstrapHandle(ButtonBootstrap<JsDom>);

#[wasm_bindgen]
impl ButtonBootstrapHandle {
    /// `pollIntervalMs` overrides the layout polling used without observers.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(bridge: JsValue, poll_interval_ms: Option<u32>) -> Self {
        let mut config = ChildConfig::button();
        if let Some(ms) = poll_interval_ms {
            config = config.with_poll_interval(Duration::from_millis(u64::from(ms)));
        }
        Self(ButtonBootstrap::new(JsDom::new(bridge), config))
    }

    /// Announces `READY` and waits for the widget element.
    ///
    /// # Errors
    /// Throws when the announcement cannot be encoded.
    pub fn boot(&mut self) -> Result<(), JsValue> {
        self.0.boot().map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Call when `customElements.whenDefined(tagName)` resolves.
    ///
    /// # Errors
    /// Throws when `ETX_DEFINED` cannot be encoded.
    #[wasm_bindgen(js_name = onElementDefined)]
    pub fn on_element_defined(&mut self) -> Result<(), JsValue> {
        self.0
            .on_element_defined()
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Feeds a `message` event with its `event.origin`.
    ///
    /// # Errors
    /// Throws when a reply cannot be encoded.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, origin: &str, data: JsValue) -> Result<(), JsValue> {
        let raw = message_text(data)?;
        self.0
            .handle_message(origin, &raw)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Call from resize/mutation observers.
    #[wasm_bindgen(js_name = onLayoutChange)]
    pub fn on_layout_change(&mut self) {
        self.0.on_layout_change();
    }

    /// Call from the `requestAnimationFrame` callback.
    ///
    /// # Errors
    /// Throws when `TOOLTIP_STATE` cannot be encoded.
    #[wasm_bindgen(js_name = onAnimationFrame)]
    pub fn on_animation_frame(&mut self) -> Result<(), JsValue> {
        self.0
            .on_animation_frame()
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// `target` is `"button"` or `"tooltip"`.
    ///
    /// # Errors
    /// Throws for an unknown target.
    #[wasm_bindgen(js_name = onPointerEnter)]
    pub fn on_pointer_enter(&mut self, target: &str) -> Result<(), JsValue> {
        let target = pointer_target(target)?;
        self.0
            .on_pointer_enter(target)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// `target` is `"button"` or `"tooltip"`.
    ///
    /// # Errors
    /// Throws for an unknown target.
    #[wasm_bindgen(js_name = onPointerLeave)]
    pub fn on_pointer_leave(&mut self, target: &str) -> Result<(), JsValue> {
        let target = pointer_target(target)?;
        self.0
            .on_pointer_leave(target)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when a resulting message cannot be encoded.
    #[wasm_bindgen(js_name = fireTimer)]
    pub fn fire_timer(&mut self, token: u32) -> Result<(), JsValue> {
        match self.0.dom_mut().timers.take(token) {
            Some(timer) => self
                .0
                .on_timer(timer)
                .map_err(|err| protocol_error_to_jsvalue(&err)),
            None => Ok(()),
        }
    }

    /// # Errors
    /// Throws when the message cannot be encoded.
    pub fn confirm(&mut self) -> Result<(), JsValue> {
        self.0.confirm().map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Forwards an uncaught error to the host.
    ///
    /// # Errors
    /// Throws when the message cannot be encoded.
    #[wasm_bindgen(js_name = reportError)]
    pub fn report_error(&mut self, error: &str) -> Result<(), JsValue> {
        self.0
            .report_error(error)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Forwards an unhandled rejection to the host.
    ///
    /// # Errors
    /// Throws when the message cannot be encoded.
    #[wasm_bindgen(js_name = reportUnhandledRejection)]
    pub fn report_unhandled_rejection(&mut self, reason: &str) -> Result<(), JsValue> {
        self.0
            .report_unhandled_rejection(reason)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Current handshake phase, e.g. `"Positioned"`.
    #[must_use]
    pub fn phase(&self) -> String {
        format!("{:?}", self.0.phase())
    }

    /// Whether the tooltip is currently shown.
    #[wasm_bindgen(js_name = isTooltipVisible)]
    #[must_use]
    pub fn is_tooltip_visible(&self) -> bool {
        self.0.is_tooltip_visible()
    }
}

/// Bootstrap of the modal iframe document.
#[wasm_bindgen]
pub struct ModalBootstrapHandle(ModalBootstrap<JsDom>);

#[wasm_bindgen]
impl ModalBootstrapHandle {
    /// Creates the bootstrap; nothing happens until `boot`.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(bridge: JsValue) -> Self {
        Self(ModalBootstrap::new(JsDom::new(bridge), ChildConfig::modal()))
    }

    /// # Errors
    /// Throws when the announcement cannot be encoded.
    pub fn boot(&mut self) -> Result<(), JsValue> {
        self.0.boot().map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when `ETX_DEFINED` cannot be encoded.
    #[wasm_bindgen(js_name = onElementDefined)]
    pub fn on_element_defined(&mut self) -> Result<(), JsValue> {
        self.0
            .on_element_defined()
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when a reply cannot be encoded.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, origin: &str, data: JsValue) -> Result<(), JsValue> {
        let raw = message_text(data)?;
        self.0
            .handle_message(origin, &raw)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when the message cannot be encoded.
    pub fn confirm(&mut self) -> Result<(), JsValue> {
        self.0.confirm().map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when the message cannot be encoded.
    pub fn cancel(&mut self) -> Result<(), JsValue> {
        self.0.cancel().map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Closes the modal. `confirmed` defaults to whether `confirm` was called.
    ///
    /// # Errors
    /// Throws when the message cannot be encoded.
    pub fn close(&mut self, confirmed: Option<bool>) -> Result<(), JsValue> {
        self.0
            .close(confirmed)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when the message cannot be encoded.
    #[wasm_bindgen(js_name = reportError)]
    pub fn report_error(&mut self, error: &str) -> Result<(), JsValue> {
        self.0
            .report_error(error)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// # Errors
    /// Throws when the message cannot be encoded.
    #[wasm_bindgen(js_name = reportUnhandledRejection)]
    pub fn report_unhandled_rejection(&mut self, reason: &str) -> Result<(), JsValue> {
        self.0
            .report_unhandled_rejection(reason)
            .map_err(|err| protocol_error_to_jsvalue(&err))
    }

    /// Current handshake phase, e.g. `"Interactive"`.
    #[must_use]
    pub fn phase(&self) -> String {
        format!("{:?}", self.0.phase())
    }
}

// ----------------------------------------------------------------------------
// Free functions
// ----------------------------------------------------------------------------

/// Digest of the transactions the wallet is about to sign.
///
/// # Errors
/// Throws when `inputs` is not an array of transactions.
#[wasm_bindgen(js_name = computeUiDigest)]
pub fn compute_ui_digest(inputs: JsValue) -> Result<String, JsValue> {
    let inputs: Vec<TransactionInput> = from_js(inputs)?;
    compute_ui_intent_digest(&inputs).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Checks a digest reported by the iframe against the transactions to sign.
///
/// # Errors
/// Throws on mismatch or when `inputs` has the wrong shape.
#[wasm_bindgen(js_name = verifyUiDigest)]
pub fn verify_digest(digest: &str, inputs: JsValue) -> Result<(), JsValue> {
    let inputs: Vec<TransactionInput> = from_js(inputs)?;
    verify_ui_digest(digest, &inputs).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Parses a CSS pixel length such as `"48px"` or `"12.5"`.
///
/// # Errors
/// Throws for non-pixel values, including `"auto"`.
#[wasm_bindgen(js_name = parsePx)]
pub fn parse_pixels(input: &str) -> Result<f64, JsValue> {
    parse_px(input).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Padded, corner-cut `clip-path` around `rect`.
///
/// # Errors
/// Throws when `rect` is not a rectangle.
#[wasm_bindgen(js_name = clipPathFor)]
pub fn clip_path_for(rect: JsValue) -> Result<Option<String>, JsValue> {
    let rect: Rect = from_js(rect)?;
    Ok(ClipPathGenerator::default()
        .around(rect)
        .map(|clip_path| clip_path.to_css()))
}

/// Routes core logging to the browser console.
#[wasm_bindgen(js_name = initConsoleLogger)]
pub fn init_console_logger() {
    set_logger(Arc::new(ConsoleLogger));
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: String) {
        let message = JsValue::from(message);
        match level {
            LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&message),
            LogLevel::Info => web_sys::console::info_1(&message),
            LogLevel::Warn => web_sys::console::warn_1(&message),
            LogLevel::Error => web_sys::console::error_1(&message),
        }
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Message data may arrive as a JSON string or as a structured-clone object.
fn message_text(data: JsValue) -> Result<String, JsValue> {
    if let Some(text) = data.as_string() {
        return Ok(text);
    }
    let value: serde_json::Value = from_js(data)?;
    Ok(value.to_string())
}

const fn message_source(from_iframe: bool) -> MessageSource {
    if from_iframe {
        MessageSource::ContentWindow
    } else {
        MessageSource::Foreign
    }
}

fn pointer_target(target: &str) -> Result<PointerTarget, JsValue> {
    match target {
        "button" => Ok(PointerTarget::Button),
        "tooltip" => Ok(PointerTarget::Tooltip),
        other => Err(JsValue::from_str(&format!("unknown pointer target {other:?}"))),
    }
}

fn digest_promise(future: UiDigestFuture) -> Promise {
    future_to_promise(async move {
        future
            .await
            .map(|digest| JsValue::from_str(&digest))
            .map_err(|err| JsValue::from_str(&err.to_string()))
    })
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn protocol_error_to_jsvalue(error: &ProtocolError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn confirmkit_error_to_jsvalue(error: &ConfirmKitError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen(typescript_custom_section)]
const TYPESCRIPT_DEFS: &str = r#"
export interface HostBridge {
    postMessage(message: string, targetOrigin: string): void;
    listen(): void;
    setSrcdoc(html: string): void;
    emit(event: { type: string; detail?: unknown }): void;
    supportsClipPath(): boolean;
    setClipPath(clipPath: string | null): void;
    setIframeSize(width: number, height: number): void;
    setTimeout(token: number, delayMs: number): void;
    clearTimeout(token: number): void;
}

export interface Rect {
    x: number;
    y: number;
    width: number;
    height: number;
    borderRadius?: number;
}

export interface IframeBridge {
    postMessage(message: string, targetOrigin: string): void;
    listen(): void;
    waitForDefinition(tagName: string): void;
    requestAnimationFrame(): void;
    applyTxData(txData: unknown): void;
    applyLoading(loading: boolean): void;
    setTimeout(token: number, delayMs: number): void;
    clearTimeout(token: number): void;
    applyInit?(init: unknown): void;
    positionContainer?(point: { x: number; y: number }): boolean;
    measureButton?(): Rect | null;
    measureTooltip?(): Rect | null;
    setTooltipVisible?(visible: boolean): void;
    observeLayout?(): boolean;
    applyStyle?(style: unknown): void;
}
"#;
