//! In-memory implementations of the platform traits for testing.
//!
//! These record every effect a controller produces (posted messages,
//! clip-paths, iframe sizes, emitted events) and run timers on a virtual
//! clock that only moves when [`MemoryTimers::advance`] is called.

// Allow certain clippy lints for test-only code
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]

use std::collections::BTreeMap;
use std::time::Duration;

use crate::channel::{
    decode, Channel, IframeInitData, MessageSink, StylePayload, TargetOrigin, TxData,
};
use crate::child::{ButtonDom, ChildDom, ChildTimer, ObserverSupport};
use crate::geometry::{Point, Rect, Size};
use crate::host::{ClipTarget, HostEvent, HostTimer, IframeHost};
use crate::scheduler::{Scheduler, TimerHandle};

/// Posted messages with their target origin.
pub type Outbox = Vec<(String, TargetOrigin)>;

fn decode_outbox<C: Channel>(outbox: &Outbox) -> Vec<C::Message> {
    outbox
        .iter()
        .map(|(raw, _)| decode::<C>(raw).expect("recorded message decodes"))
        .collect()
}

fn outbox_types(outbox: &Outbox) -> Vec<String> {
    outbox
        .iter()
        .map(|(raw, _)| {
            let value: serde_json::Value =
                serde_json::from_str(raw).expect("recorded message is JSON");
            value["type"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

// =============================================================================
// Memory Timers
// =============================================================================

/// Timers on a virtual clock.
///
/// **FOR TESTING ONLY**: nothing fires on its own; tests move the clock
/// with [`MemoryTimers::advance`] and feed the returned timers back into the
/// controller.
#[derive(Debug)]
pub struct MemoryTimers<T> {
    now: Duration,
    next_handle: u64,
    pending: BTreeMap<TimerHandle, (Duration, T)>,
}

impl<T> Default for MemoryTimers<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> MemoryTimers<T> {
    /// Empty timer set at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timer is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Moves the clock forward and removes every timer that became due,
    /// returned in firing order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;
        let mut due: Vec<(Duration, TimerHandle)> = self
            .pending
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= self.now)
            .map(|(handle, (deadline, _))| (*deadline, *handle))
            .collect();
        due.sort();
        due.into_iter()
            .filter_map(|(_, handle)| self.pending.remove(&handle).map(|(_, timer)| timer))
            .collect()
    }
}

impl<T> Scheduler<T> for MemoryTimers<T> {
    fn schedule(&mut self, delay: Duration, timer: T) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.insert(handle, (self.now + delay, timer));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.remove(&handle);
    }
}

// =============================================================================
// Memory Iframe (host side)
// =============================================================================

/// Recording host platform around a single iframe.
#[derive(Debug)]
pub struct MemoryIframe {
    /// Origin reported by `host_origin`.
    pub origin: String,
    /// Whether clip-path polygons are reported as supported.
    pub clip_supported: bool,
    /// Platform calls in order, by method name.
    pub calls: Vec<&'static str>,
    /// Last `srcdoc` set.
    pub srcdoc: Option<String>,
    /// Messages posted to the iframe.
    pub outbox: Outbox,
    /// Every clip-path write.
    pub clip_paths: Vec<Option<String>>,
    /// Every size write.
    pub sizes: Vec<Size>,
    /// Events emitted to the application.
    pub events: Vec<HostEvent>,
    /// Host timers.
    pub timers: MemoryTimers<HostTimer>,
}

impl MemoryIframe {
    /// Platform for a host page at `origin`.
    #[must_use]
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            clip_supported: true,
            calls: Vec::new(),
            srcdoc: None,
            outbox: Vec::new(),
            clip_paths: Vec::new(),
            sizes: Vec::new(),
            events: Vec::new(),
            timers: MemoryTimers::new(),
        }
    }

    /// Reports clip-path polygons as unsupported.
    #[must_use]
    pub fn without_clip_path(mut self) -> Self {
        self.clip_supported = false;
        self
    }

    /// Drains the posted messages.
    pub fn take_outbox(&mut self) -> Outbox {
        std::mem::take(&mut self.outbox)
    }

    /// Posted messages decoded for channel `C`.
    #[must_use]
    pub fn sent<C: Channel>(&self) -> Vec<C::Message> {
        decode_outbox::<C>(&self.outbox)
    }

    /// `type` tags of the posted messages.
    #[must_use]
    pub fn sent_types(&self) -> Vec<String> {
        outbox_types(&self.outbox)
    }

    /// Clip-path currently set on the iframe.
    #[must_use]
    pub fn current_clip_path(&self) -> Option<&str> {
        self.clip_paths.last().and_then(Option::as_deref)
    }

    /// Size currently set on the iframe.
    #[must_use]
    pub fn current_size(&self) -> Option<Size> {
        self.sizes.last().copied()
    }
}

impl MessageSink for MemoryIframe {
    fn post_message(&mut self, message: &str, target_origin: &TargetOrigin) {
        self.outbox.push((message.to_string(), target_origin.clone()));
    }
}

impl Scheduler<HostTimer> for MemoryIframe {
    fn schedule(&mut self, delay: Duration, timer: HostTimer) -> TimerHandle {
        self.timers.schedule(delay, timer)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }
}

impl IframeHost for MemoryIframe {
    fn host_origin(&self) -> String {
        self.origin.clone()
    }

    fn listen(&mut self) {
        self.calls.push("listen");
    }

    fn set_srcdoc(&mut self, html: &str) {
        self.calls.push("set_srcdoc");
        self.srcdoc = Some(html.to_string());
    }

    fn emit(&mut self, event: HostEvent) {
        self.events.push(event);
    }
}

impl ClipTarget for MemoryIframe {
    fn supports_clip_path(&self) -> bool {
        self.clip_supported
    }

    fn set_clip_path(&mut self, clip_path: Option<&str>) {
        self.calls.push("set_clip_path");
        self.clip_paths.push(clip_path.map(str::to_string));
    }

    fn set_iframe_size(&mut self, size: Size) {
        self.calls.push("set_iframe_size");
        self.sizes.push(size);
    }
}

// =============================================================================
// Memory Button DOM (child side)
// =============================================================================

/// Recording DOM of the button iframe.
#[derive(Debug)]
pub struct MemoryButtonDom {
    /// Whether the message handler is attached.
    pub listening: bool,
    /// Messages posted to the host.
    pub outbox: Outbox,
    /// Tags awaited through `wait_for_definition`.
    pub awaited_definitions: Vec<String>,
    /// Animation frames requested so far.
    pub frames_requested: usize,
    /// Child timers.
    pub timers: MemoryTimers<ChildTimer>,
    /// Number of positioning attempts that fail before the shadow root is ready.
    pub shadow_failures: u32,
    /// Positioning attempts made.
    pub position_attempts: u32,
    /// Where the container was placed.
    pub positioned_at: Option<Point>,
    /// Button box returned by measurement.
    pub button: Option<Rect>,
    /// Tooltip box returned by measurement.
    pub tooltip: Option<Rect>,
    /// Tooltip visibility as last set.
    pub tooltip_visible: bool,
    /// Observer support reported by `observe_layout`.
    pub observers: ObserverSupport,
    /// Last init data applied.
    pub init: Option<IframeInitData>,
    /// Last transactions applied.
    pub tx_data: Option<TxData>,
    /// Last loading flag applied.
    pub loading: bool,
    /// Last style applied.
    pub style: Option<StylePayload>,
}

impl Default for MemoryButtonDom {
    fn default() -> Self {
        Self {
            listening: false,
            outbox: Vec::new(),
            awaited_definitions: Vec::new(),
            frames_requested: 0,
            timers: MemoryTimers::new(),
            shadow_failures: 0,
            position_attempts: 0,
            positioned_at: None,
            button: None,
            tooltip: None,
            tooltip_visible: false,
            observers: ObserverSupport::Native,
            init: None,
            tx_data: None,
            loading: false,
            style: None,
        }
    }
}

impl MemoryButtonDom {
    /// A DOM whose button and tooltip render where the default layout
    /// (200x48 button, 280-wide tooltip on top) puts them.
    #[must_use]
    pub fn rendered() -> Self {
        Self {
            button: Some(Rect::new(44, 308, 200, 48).with_border_radius(8)),
            tooltip: Some(Rect::new(4, 4, 280, 150).with_border_radius(12)),
            ..Self::default()
        }
    }

    /// Fails the first `failures` positioning attempts.
    #[must_use]
    pub fn shadow_ready_after(mut self, failures: u32) -> Self {
        self.shadow_failures = failures;
        self
    }

    /// Reports no native layout observers.
    #[must_use]
    pub fn without_observers(mut self) -> Self {
        self.observers = ObserverSupport::Unsupported;
        self
    }

    /// Drains the posted messages.
    pub fn take_outbox(&mut self) -> Outbox {
        std::mem::take(&mut self.outbox)
    }

    /// Posted messages decoded for channel `C`.
    #[must_use]
    pub fn sent<C: Channel>(&self) -> Vec<C::Message> {
        decode_outbox::<C>(&self.outbox)
    }

    /// `type` tags of the posted messages.
    #[must_use]
    pub fn sent_types(&self) -> Vec<String> {
        outbox_types(&self.outbox)
    }
}

impl MessageSink for MemoryButtonDom {
    fn post_message(&mut self, message: &str, target_origin: &TargetOrigin) {
        self.outbox.push((message.to_string(), target_origin.clone()));
    }
}

impl Scheduler<ChildTimer> for MemoryButtonDom {
    fn schedule(&mut self, delay: Duration, timer: ChildTimer) -> TimerHandle {
        self.timers.schedule(delay, timer)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }
}

impl ChildDom for MemoryButtonDom {
    fn listen(&mut self) {
        self.listening = true;
    }

    fn wait_for_definition(&mut self, tag_name: &str) {
        self.awaited_definitions.push(tag_name.to_string());
    }

    fn request_animation_frame(&mut self) {
        self.frames_requested += 1;
    }

    fn apply_tx_data(&mut self, tx_data: &TxData) {
        self.tx_data = Some(tx_data.clone());
    }

    fn apply_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

impl ButtonDom for MemoryButtonDom {
    fn apply_init(&mut self, init: &IframeInitData) {
        self.init = Some(init.clone());
    }

    fn position_container(&mut self, position: Point) -> bool {
        self.position_attempts += 1;
        if self.position_attempts <= self.shadow_failures {
            return false;
        }
        self.positioned_at = Some(position);
        true
    }

    fn measure_button(&self) -> Option<Rect> {
        self.button
    }

    fn measure_tooltip(&self) -> Option<Rect> {
        self.tooltip
    }

    fn set_tooltip_visible(&mut self, visible: bool) {
        self.tooltip_visible = visible;
    }

    fn observe_layout(&mut self) -> ObserverSupport {
        self.observers
    }

    fn apply_style(&mut self, style: &StylePayload) {
        self.style = Some(style.clone());
    }
}

// =============================================================================
// Memory Modal DOM (child side)
// =============================================================================

/// Recording DOM of the modal iframe.
#[derive(Debug, Default)]
pub struct MemoryModalDom {
    /// Whether the message handler is attached.
    pub listening: bool,
    /// Messages posted to the host.
    pub outbox: Outbox,
    /// Tags awaited through `wait_for_definition`.
    pub awaited_definitions: Vec<String>,
    /// Child timers.
    pub timers: MemoryTimers<ChildTimer>,
    /// Last transactions applied.
    pub tx_data: Option<TxData>,
    /// Last loading flag applied.
    pub loading: bool,
}

impl MemoryModalDom {
    /// Drains the posted messages.
    pub fn take_outbox(&mut self) -> Outbox {
        std::mem::take(&mut self.outbox)
    }

    /// Posted messages decoded for channel `C`.
    #[must_use]
    pub fn sent<C: Channel>(&self) -> Vec<C::Message> {
        decode_outbox::<C>(&self.outbox)
    }

    /// `type` tags of the posted messages.
    #[must_use]
    pub fn sent_types(&self) -> Vec<String> {
        outbox_types(&self.outbox)
    }
}

impl MessageSink for MemoryModalDom {
    fn post_message(&mut self, message: &str, target_origin: &TargetOrigin) {
        self.outbox.push((message.to_string(), target_origin.clone()));
    }
}

impl Scheduler<ChildTimer> for MemoryModalDom {
    fn schedule(&mut self, delay: Duration, timer: ChildTimer) -> TimerHandle {
        self.timers.schedule(delay, timer)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.cancel(handle);
    }
}

impl ChildDom for MemoryModalDom {
    fn listen(&mut self) {
        self.listening = true;
    }

    fn wait_for_definition(&mut self, tag_name: &str) {
        self.awaited_definitions.push(tag_name.to_string());
    }

    fn request_animation_frame(&mut self) {}

    fn apply_tx_data(&mut self, tx_data: &TxData) {
        self.tx_data = Some(tx_data.clone());
    }

    fn apply_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut timers = MemoryTimers::new();
        timers.schedule(Duration::from_millis(30), "late");
        let cancelled = timers.schedule(Duration::from_millis(10), "cancelled");
        timers.schedule(Duration::from_millis(20), "early");
        timers.cancel(cancelled);

        assert!(timers.advance(Duration::from_millis(19)).is_empty());
        assert_eq!(timers.advance(Duration::from_millis(20)), vec!["early", "late"]);
        assert!(timers.is_empty());
        assert_eq!(timers.now(), Duration::from_millis(39));
    }
}
