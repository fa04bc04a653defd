//! UI intent digest: a deterministic hash of the transaction payload used to
//! check that what the confirmer displayed is what the host is about to sign.
//!
//! The digest is `base64url(sha256(json(canonicalize(payload))))` without padding.
//! Object keys are sorted recursively, arrays keep their order.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::error::DigestError;

mod actions;

pub use actions::{Action, ActionArgs, TransactionInput};

/// Returns a copy of `value` with every object's keys sorted.
///
/// Whole floats are written as integers so the serialization matches what a
/// JavaScript producer would emit for the same value.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(object.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&object[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(number) => Value::Number(normalize_number(number)),
        other => other.clone(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn normalize_number(number: &Number) -> Number {
    match number.as_f64() {
        Some(float)
            if number.is_f64()
                && float.fract() == 0.0
                && float.abs() < 9_007_199_254_740_992.0 =>
        {
            Number::from(float as i64)
        }
        _ => number.clone(),
    }
}

/// Digest of an arbitrary JSON value.
///
/// # Errors
/// Returns [`DigestError::Serialization`] if the canonical form cannot be written.
pub fn digest_value(value: &Value) -> Result<String, DigestError> {
    let canonical = serde_json::to_string(&canonicalize(value))
        .map_err(|err| DigestError::Serialization(err.to_string()))?;
    let hash = Sha256::digest(canonical.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(hash))
}

/// Digest of any serializable payload.
///
/// # Errors
/// Returns [`DigestError::Serialization`] if the payload cannot be converted to JSON.
pub fn digest_of<T: Serialize + ?Sized>(payload: &T) -> Result<String, DigestError> {
    let value = serde_json::to_value(payload)
        .map_err(|err| DigestError::Serialization(err.to_string()))?;
    digest_value(&value)
}

/// Digest of the transactions a user is asked to confirm.
///
/// # Errors
/// Returns [`DigestError::Serialization`] if an action cannot be converted to JSON.
pub fn compute_ui_intent_digest(inputs: &[TransactionInput]) -> Result<String, DigestError> {
    digest_of(inputs)
}

/// Checks the digest reported by the confirmer against the transactions about
/// to be signed.
///
/// # Errors
/// Returns [`DigestError::Mismatch`] when the two differ.
pub fn verify_ui_digest(
    displayed: &str,
    intended: &[TransactionInput],
) -> Result<(), DigestError> {
    let expected = compute_ui_intent_digest(intended)?;
    if expected == displayed {
        Ok(())
    } else {
        Err(DigestError::Mismatch {
            expected,
            actual: displayed.to_string(),
        })
    }
}
