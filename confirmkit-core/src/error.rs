use thiserror::Error;

/// Errors raised while parsing pixel values or building geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum GeometryError {
    /// The value cannot be interpreted as a CSS pixel length.
    #[error("invalid pixel value {value:?}: {reason}")]
    InvalidPixelValue {
        /// The raw input as received.
        value: String,
        /// Why the input was rejected.
        reason: String,
    },
    /// A rectangle required for the computation has no area.
    #[error("degenerate rectangle: {0}")]
    DegenerateRect(String),
}

/// Errors raised while encoding or decoding channel messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum ProtocolError {
    /// The envelope `type` is not part of the channel's closed set.
    #[error("unknown {channel} message type: {message_type}")]
    UnknownMessageType {
        /// Channel the message was decoded for.
        channel: String,
        /// The unrecognized tag.
        message_type: String,
    },
    /// The envelope is known but its payload has the wrong shape.
    #[error("malformed {message_type} payload: {reason}")]
    MalformedPayload {
        /// The recognized tag.
        message_type: String,
        /// Decoder error.
        reason: String,
    },
    /// The raw message is not a `{type, payload}` envelope at all.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
    /// Unexpected error serializing an outbound message.
    #[error("serialization_error: {0}")]
    Serialization(String),
    /// The widget configuration cannot be used to build the iframe.
    #[error("invalid_config: {0}")]
    InvalidConfig(String),
}

/// Errors raised by the UI intent digest round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum DigestError {
    /// A newer digest request replaced this one before it was answered.
    #[error("digest request superseded")]
    Superseded,
    /// The child did not answer within the digest timeout.
    #[error("digest request timed out")]
    Timeout,
    /// The digest shown in the UI differs from the digest about to be signed.
    #[error("ui digest mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Digest computed by the host from the data it will sign.
        expected: String,
        /// Digest reported by the child for what it displayed.
        actual: String,
    },
    /// The child answered with `ok: false`.
    #[error("digest rejected by iframe: {0}")]
    Rejected(String),
    /// The payload could not be canonicalized.
    #[error("digest serialization error: {0}")]
    Serialization(String),
    /// The controller owning the request went away.
    #[error("digest request cancelled")]
    Cancelled,
}

/// Error outputs from `ConfirmKit`
#[derive(Debug, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error))]
#[cfg_attr(feature = "ffi", uniffi(flat_error))]
pub enum ConfirmKitError {
    /// Geometry or configuration error
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// Message channel error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// Digest round trip error
    #[error(transparent)]
    Digest(#[from] DigestError),
}

/// Result alias used across the crate.
pub type ConfirmKitResult<T, E = ConfirmKitError> = std::result::Result<T, E>;
