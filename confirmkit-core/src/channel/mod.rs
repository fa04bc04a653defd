//! `postMessage` envelopes: `{type, payload?}` objects whose `type` is drawn
//! from a closed per-channel set.
//!
//! Each channel is a sum type with one payload shape per tag. Decoding first
//! checks the tag against the channel's set, so callers can tell an unknown
//! message (logged and ignored) from a malformed one.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::digest::TransactionInput;
use crate::error::ProtocolError;

pub mod button;
pub mod modal;

pub use button::{ButtonChannel, ButtonMessage, IframeInitData, StylePayload};
pub use modal::{ModalChannel, ModalMessage};

/// CSS declarations keyed by property name.
pub type CssProperties = BTreeMap<String, String>;

/// A closed message vocabulary.
pub trait Channel {
    /// Sum type of every message on the channel.
    type Message: Serialize + DeserializeOwned;

    /// Channel name used in logs and errors.
    const NAME: &'static str;

    /// Every accepted `type` tag, including legacy aliases.
    const MESSAGE_TYPES: &'static [&'static str];

    /// Wire tag of a message.
    fn message_type(message: &Self::Message) -> &'static str;
}

/// Decodes a raw `postMessage` payload for channel `C`.
///
/// # Errors
/// - [`ProtocolError::InvalidEnvelope`] when `raw` is not an object with a string `type`.
/// - [`ProtocolError::UnknownMessageType`] when the tag is outside the channel's set.
/// - [`ProtocolError::MalformedPayload`] when the payload does not match the tag.
pub fn decode<C: Channel>(raw: &str) -> Result<C::Message, ProtocolError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| ProtocolError::InvalidEnvelope(err.to_string()))?;
    let message_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::InvalidEnvelope("missing string `type`".to_string()))?
        .to_string();

    if !C::MESSAGE_TYPES.contains(&message_type.as_str()) {
        return Err(ProtocolError::UnknownMessageType {
            channel: C::NAME.to_string(),
            message_type,
        });
    }

    serde_json::from_value(value).map_err(|err| ProtocolError::MalformedPayload {
        message_type,
        reason: err.to_string(),
    })
}

/// Encodes a message of channel `C` as a JSON envelope.
///
/// # Errors
/// Returns [`ProtocolError::Serialization`] if the payload cannot be serialized.
pub fn encode<C: Channel>(message: &C::Message) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(|err| ProtocolError::Serialization(err.to_string()))
}

/// Target origin argument of `postMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOrigin {
    /// `'*'`: used only before the peer's origin is known.
    Any,
    /// An exact origin.
    Exact(String),
}

impl TargetOrigin {
    /// The string passed to `postMessage`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Exact(origin) => origin,
        }
    }
}

/// "Send a message to a target window" capability.
pub trait MessageSink {
    /// Posts an encoded envelope.
    fn post_message(&mut self, message: &str, target_origin: &TargetOrigin);
}

/// Which window an inbound message came from, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// `event.source === iframe.contentWindow`.
    ContentWindow,
    /// Any other window; never trusted.
    Foreign,
}

/// Origin of the host, captured by the child from the first init message and
/// immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedOrigin(Option<String>);

impl TrustedOrigin {
    /// Captures `origin` unless one was already captured. Returns whether the
    /// origin was captured by this call.
    pub fn capture(&mut self, origin: &str) -> bool {
        match &self.0 {
            Some(existing) => {
                if existing != origin {
                    log::warn!(
                        "ignoring target origin {origin}: already bound to {existing}"
                    );
                }
                false
            }
            None => {
                self.0 = Some(origin.to_string());
                true
            }
        }
    }

    /// The captured origin, if any.
    #[must_use]
    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Target for outbound posts: the captured origin, or `'*'` before capture.
    #[must_use]
    pub fn target(&self) -> TargetOrigin {
        self.0
            .as_ref()
            .map_or(TargetOrigin::Any, |origin| TargetOrigin::Exact(origin.clone()))
    }

    /// Whether an inbound message from `origin` is acceptable. Everything is
    /// accepted until an origin is captured.
    #[must_use]
    pub fn accepts(&self, origin: &str) -> bool {
        match self.0.as_deref() {
            Some(trusted) => trusted == origin,
            None => true,
        }
    }
}

/// `SET_TX_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    /// Signing account.
    pub near_account_id: String,
    /// Transactions shown to the user.
    pub tx_signing_requests: Vec<TransactionInput>,
}

/// `BUTTON_HOVER` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverPayload {
    /// Whether the pointer is over the button.
    pub hovering: bool,
}

/// `UI_INTENT_DIGEST` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestResponse {
    /// Whether the child produced a digest.
    pub ok: bool,
    /// The digest when `ok`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Failure reason when not `ok`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DigestResponse {
    /// A successful response.
    #[must_use]
    pub const fn success(digest: String) -> Self {
        Self {
            ok: true,
            digest: Some(digest),
            error: None,
        }
    }

    /// A failed response.
    #[must_use]
    pub const fn failure(error: String) -> Self {
        Self {
            ok: false,
            digest: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_origin_is_set_once() {
        let mut origin = TrustedOrigin::default();
        assert_eq!(origin.target(), TargetOrigin::Any);
        assert!(origin.accepts("https://anything.example"));

        assert!(origin.capture("https://wallet.example"));
        assert!(!origin.capture("https://evil.example"));
        assert_eq!(origin.get(), Some("https://wallet.example"));
        assert_eq!(origin.target().as_str(), "https://wallet.example");
        assert!(origin.accepts("https://wallet.example"));
        assert!(!origin.accepts("https://evil.example"));
    }

    #[test]
    fn test_digest_response_omits_absent_fields() {
        let json = serde_json::to_string(&DigestResponse::success("abc".to_string())).unwrap();
        assert_eq!(json, r#"{"ok":true,"digest":"abc"}"#);
        let decoded: DigestResponse = serde_json::from_str(r#"{"ok":false}"#).unwrap();
        assert_eq!(decoded.error, None);
    }
}
