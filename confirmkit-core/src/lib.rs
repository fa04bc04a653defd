//! `confirmkit-core` implements the iframe handshake that embeds the wallet's
//! transaction confirmer into third-party pages.
//!
//! The host page owns a full-bleed transparent iframe and uses a CSS
//! `clip-path` so that only the button (and, while shown, its tooltip)
//! receives pointer events. Host and iframe agree on geometry through a short
//! `postMessage` handshake, and the host can ask the iframe for a digest of
//! the transactions it displays before signing them.
//!
//! Everything here is sans-IO: controllers are plain structs driven by
//! inbound messages and due timers, and every browser capability is a trait
//! implemented by the embedding (see `confirmkit-wasm`).
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod channel;
pub mod child;
pub mod defaults;
pub mod digest;
pub mod geometry;
pub mod host;
pub mod logger;
pub mod preferences;
pub mod scheduler;
pub mod test_support;

mod error;
pub use error::*;

pub use channel::{
    ButtonChannel, ButtonMessage, Channel, MessageSink, MessageSource, ModalChannel,
    ModalMessage, TargetOrigin, TxData,
};
pub use child::{
    ButtonBootstrap, ButtonDom, ChildConfig, ChildDom, ChildPhase, ChildTimer, ModalBootstrap,
    ObserverSupport, PointerTarget,
};
pub use digest::{compute_ui_intent_digest, verify_ui_digest, TransactionInput};
pub use geometry::{
    parse_px, ClipPath, ClipPathGenerator, Dimension, IframeLayout, Point, Rect, Size,
    TooltipConfig, TooltipGeometry, TooltipPosition,
};
pub use host::{
    ButtonHost, ButtonHostConfig, ClipTarget, HostEvent, HostPhase, HostTimer, IframeHost,
    ModalHost, ModalHostConfig, UiDigestFuture,
};
pub use preferences::{ConfirmBehavior, PreferenceStore, Theme, UserPreferences};
pub use scheduler::{Scheduler, TimerHandle};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!("confirmkit_core");
