//! `confirmkit` is the distributable entry point of the confirmer SDK.
//!
//! It re-exports [`confirmkit_core`] and, with the `ffi` feature, the UniFFI
//! scaffolding so a single native library carries the whole surface.

pub use confirmkit_core::*;

#[cfg(feature = "ffi")]
confirmkit_core::uniffi_reexport_scaffolding!();
