//! Transaction intent payloads as displayed by the confirmer and signed by the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One transaction the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// Account receiving the transaction.
    pub receiver_id: String,
    /// Actions executed against the receiver, in order.
    pub actions: Vec<Action>,
}

/// An action as received from a producer. Known action types are projected
/// onto their canonical field set; anything else is hashed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    /// A recognized action type.
    Known(ActionArgs),
    /// Action type this crate does not model.
    Other(Value),
}

/// Canonical per-type action fields. Field declaration order is the canonical
/// order; it matches the sorted order applied before hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum ActionArgs {
    /// Create the receiver account.
    CreateAccount,
    /// Deploy contract code to the receiver.
    DeployContract {
        /// Contract bytes (array or encoded string, kept as given).
        code: Value,
    },
    /// Call a contract method.
    FunctionCall {
        /// Method arguments.
        args: Value,
        /// Attached deposit in yocto units.
        deposit: String,
        /// Prepaid gas.
        gas: String,
        /// Method name.
        method_name: String,
    },
    /// Transfer tokens.
    Transfer {
        /// Amount in yocto units.
        deposit: String,
    },
    /// Stake tokens.
    Stake {
        /// Validator public key.
        public_key: String,
        /// Amount staked.
        stake: String,
    },
    /// Add an access key.
    AddKey {
        /// Access key permission descriptor.
        access_key: Value,
        /// Key being added.
        public_key: String,
    },
    /// Delete an access key.
    DeleteKey {
        /// Key being removed.
        public_key: String,
    },
    /// Delete the receiver account.
    DeleteAccount {
        /// Account receiving the remaining balance.
        beneficiary_id: String,
    },
}

impl Action {
    /// The `action_type` tag, when present.
    #[must_use]
    pub fn action_type(&self) -> Option<&str> {
        match self {
            Self::Known(args) => Some(args.action_type()),
            Self::Other(value) => value.get("action_type").and_then(Value::as_str),
        }
    }
}

impl ActionArgs {
    /// The wire tag of this action.
    #[must_use]
    pub const fn action_type(&self) -> &'static str {
        match self {
            Self::CreateAccount => "CreateAccount",
            Self::DeployContract { .. } => "DeployContract",
            Self::FunctionCall { .. } => "FunctionCall",
            Self::Transfer { .. } => "Transfer",
            Self::Stake { .. } => "Stake",
            Self::AddKey { .. } => "AddKey",
            Self::DeleteKey { .. } => "DeleteKey",
            Self::DeleteAccount { .. } => "DeleteAccount",
        }
    }
}
