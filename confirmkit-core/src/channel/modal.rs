//! Full-screen modal channel.

use serde::{Deserialize, Serialize};

use super::{Channel, DigestResponse, TxData};

/// `SET_INIT` payload of the modal channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalInit {
    /// Origin the child must use for every later post.
    pub target_origin: String,
}

/// `CLOSE_MODAL` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseModal {
    /// Whether the modal closed after a confirmation.
    pub confirmed: bool,
}

/// Every message on the modal channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ModalMessage {
    /// child→host: bootstrap script loaded.
    #[serde(rename = "READY")]
    Ready,
    /// host→child: trusted origin.
    #[serde(rename = "SET_INIT")]
    Init(ModalInit),
    /// child→host: the custom element finished upgrading.
    #[serde(rename = "ETX_DEFINED")]
    ElementDefined,
    /// host→child: transactions to display.
    #[serde(rename = "SET_TX_DATA")]
    SetTxData(TxData),
    /// host→child: loading indicator.
    #[serde(rename = "SET_LOADING")]
    SetLoading(bool),
    /// host→child: report the digest of what is displayed.
    #[serde(rename = "REQUEST_UI_DIGEST")]
    RequestUiDigest,
    /// child→host: digest of what is displayed.
    #[serde(rename = "UI_INTENT_DIGEST")]
    UiIntentDigest(DigestResponse),
    /// child→host: user confirmed.
    #[serde(rename = "CONFIRM")]
    Confirm,
    /// child→host: user cancelled.
    #[serde(rename = "CANCEL")]
    Cancel,
    /// child→host: modal closed.
    #[serde(rename = "CLOSE_MODAL")]
    CloseModal(CloseModal),
    /// child→host: uncaught error inside the iframe.
    #[serde(rename = "IFRAME_ERROR")]
    IframeError(String),
    /// child→host: unhandled promise rejection inside the iframe.
    #[serde(rename = "IFRAME_UNHANDLED_REJECTION")]
    IframeUnhandledRejection(String),
}

/// Marker for the modal channel vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct ModalChannel;

impl Channel for ModalChannel {
    type Message = ModalMessage;

    const NAME: &'static str = "modal";

    const MESSAGE_TYPES: &'static [&'static str] = &[
        "READY",
        "SET_INIT",
        "ETX_DEFINED",
        "SET_TX_DATA",
        "SET_LOADING",
        "REQUEST_UI_DIGEST",
        "UI_INTENT_DIGEST",
        "CONFIRM",
        "CANCEL",
        "CLOSE_MODAL",
        "IFRAME_ERROR",
        "IFRAME_UNHANDLED_REJECTION",
    ];

    fn message_type(message: &ModalMessage) -> &'static str {
        match message {
            ModalMessage::Ready => "READY",
            ModalMessage::Init(_) => "SET_INIT",
            ModalMessage::ElementDefined => "ETX_DEFINED",
            ModalMessage::SetTxData(_) => "SET_TX_DATA",
            ModalMessage::SetLoading(_) => "SET_LOADING",
            ModalMessage::RequestUiDigest => "REQUEST_UI_DIGEST",
            ModalMessage::UiIntentDigest(_) => "UI_INTENT_DIGEST",
            ModalMessage::Confirm => "CONFIRM",
            ModalMessage::Cancel => "CANCEL",
            ModalMessage::CloseModal(_) => "CLOSE_MODAL",
            ModalMessage::IframeError(_) => "IFRAME_ERROR",
            ModalMessage::IframeUnhandledRejection(_) => "IFRAME_UNHANDLED_REJECTION",
        }
    }
}
