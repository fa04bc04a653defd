//! Host-page side of the protocol: owns the iframe element, drives the
//! handshake and applies the clip-path.

use serde::Serialize;

use crate::channel::MessageSink;
use crate::geometry::Size;
use crate::scheduler::Scheduler;

mod button;
mod digest;
mod modal;
mod srcdoc;

pub use button::{ButtonHost, ButtonHostConfig};
pub use digest::UiDigestFuture;
pub use modal::{ModalHost, ModalHostConfig};
pub use srcdoc::build_srcdoc;

/// Handshake progress as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostPhase {
    /// Nothing mounted yet.
    Idle,
    /// Listener attached and `srcdoc` set.
    IframeMounted,
    /// `READY` received, init data posted.
    InitSent,
    /// Child confirmed positioning, geometry requested.
    PositionAcked,
    /// First geometry applied.
    GeometryReceived,
    /// Geometry applied and initial application state delivered.
    Interactive,
}

/// Timers owned by host controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostTimer {
    /// The digest request `request_id` ran out of time.
    DigestTimeout {
        /// Request the timeout belongs to.
        request_id: u64,
    },
}

/// Notifications for the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "camelCase")]
pub enum HostEvent {
    /// The child bootstrap announced itself.
    Ready,
    /// Handshake complete: geometry applied and initial state delivered.
    Interactive,
    /// The user confirmed.
    Confirmed,
    /// The user cancelled (modal only).
    Cancelled,
    /// The modal closed.
    Closed {
        /// Whether it closed after a confirmation.
        confirmed: bool,
    },
    /// Uncaught error forwarded from the iframe.
    ChildError(String),
    /// Unhandled rejection forwarded from the iframe.
    ChildUnhandledRejection(String),
}

/// Browser capabilities a host controller needs around its iframe.
pub trait IframeHost: MessageSink + Scheduler<HostTimer> {
    /// Origin of the host page, declared to the child as its target origin.
    fn host_origin(&self) -> String;

    /// Attaches the `message` listener, filtered to the iframe's content window.
    fn listen(&mut self);

    /// Sets the iframe's `srcdoc`, starting navigation.
    fn set_srcdoc(&mut self, html: &str);

    /// Delivers an event to the application.
    fn emit(&mut self, event: HostEvent);
}

/// Iframe styling owned by the host: clip-path and box size.
pub trait ClipTarget: IframeHost {
    /// Whether `CSS.supports('clip-path', 'polygon(...)')` holds.
    fn supports_clip_path(&self) -> bool;

    /// Sets or clears the iframe's `clip-path`.
    fn set_clip_path(&mut self, clip_path: Option<&str>);

    /// Sets the iframe's width and height.
    fn set_iframe_size(&mut self, size: Size);
}
