//! Button-with-tooltip channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Channel, CssProperties, DigestResponse, HoverPayload, TxData};
use crate::geometry::{Point, Size, TooltipConfig, TooltipGeometry};
use crate::preferences::Theme;

/// Init data telling the child where to put its interactive container and
/// which origin to answer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IframeInitData {
    /// Configured button size.
    pub size: Size,
    /// Tooltip configuration.
    pub tooltip: TooltipConfig,
    /// Absolute position of the button container inside the iframe.
    pub button_position: Point,
    /// Button background color.
    pub background_color: String,
    /// Custom element tag of the widget.
    pub tag_name: String,
    /// Origin the child must use for every later post.
    pub target_origin: String,
}

/// `SET_STYLE` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StylePayload {
    /// Button CSS.
    pub button_style: CssProperties,
    /// Button CSS while hovered.
    pub button_hover_style: CssProperties,
    /// Tooltip configuration.
    pub tooltip_position: TooltipConfig,
    /// Styles for the transaction tree inside the tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip_tree_styles: Option<Value>,
    /// Theme read from user preferences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

/// Every message on the button channel. The `HS*` names are written on the
/// wire; the older names are still accepted when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ButtonMessage {
    /// child→host: bootstrap script loaded.
    #[serde(rename = "READY")]
    Ready,
    /// host→child: positioning and trusted origin.
    #[serde(rename = "HS1_INIT", alias = "SET_INIT")]
    Init(IframeInitData),
    /// child→host: positioning applied, echoing the position.
    #[serde(rename = "HS2_POSITIONED", alias = "POSITIONING_APPLIED")]
    Positioned(Point),
    /// host→child: measure the rendered layout.
    #[serde(rename = "HS3_GEOMETRY_REQUEST", alias = "REQUEST_GEOMETRY")]
    GeometryRequest,
    /// child→host: first measured geometry.
    #[serde(rename = "HS5_GEOMETRY_RESULT", alias = "INIT_GEOMETRY")]
    GeometryResult(TooltipGeometry),
    /// child→host: the custom element finished upgrading.
    #[serde(rename = "ETX_DEFINED")]
    ElementDefined,
    /// host→child: transactions to display.
    #[serde(rename = "SET_TX_DATA")]
    SetTxData(TxData),
    /// host→child: loading indicator.
    #[serde(rename = "SET_LOADING")]
    SetLoading(bool),
    /// host→child: styling.
    #[serde(rename = "SET_STYLE")]
    SetStyle(StylePayload),
    /// child→host: geometry or visibility changed.
    #[serde(rename = "TOOLTIP_STATE")]
    TooltipState(TooltipGeometry),
    /// child→host: pointer entered or left the button.
    #[serde(rename = "BUTTON_HOVER")]
    ButtonHover(HoverPayload),
    /// child→host: user confirmed.
    #[serde(rename = "CONFIRM")]
    Confirm,
    /// host→child: report the digest of what is displayed.
    #[serde(rename = "REQUEST_UI_DIGEST")]
    RequestUiDigest,
    /// child→host: digest of what is displayed.
    #[serde(rename = "UI_INTENT_DIGEST")]
    UiIntentDigest(DigestResponse),
    /// child→host: uncaught error inside the iframe.
    #[serde(rename = "IFRAME_ERROR")]
    IframeError(String),
    /// child→host: unhandled promise rejection inside the iframe.
    #[serde(rename = "IFRAME_UNHANDLED_REJECTION")]
    IframeUnhandledRejection(String),
}

/// Marker for the button channel vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct ButtonChannel;

impl Channel for ButtonChannel {
    type Message = ButtonMessage;

    const NAME: &'static str = "button";

    const MESSAGE_TYPES: &'static [&'static str] = &[
        "READY",
        "HS1_INIT",
        "SET_INIT",
        "HS2_POSITIONED",
        "POSITIONING_APPLIED",
        "HS3_GEOMETRY_REQUEST",
        "REQUEST_GEOMETRY",
        "HS5_GEOMETRY_RESULT",
        "INIT_GEOMETRY",
        "ETX_DEFINED",
        "SET_TX_DATA",
        "SET_LOADING",
        "SET_STYLE",
        "TOOLTIP_STATE",
        "BUTTON_HOVER",
        "CONFIRM",
        "REQUEST_UI_DIGEST",
        "UI_INTENT_DIGEST",
        "IFRAME_ERROR",
        "IFRAME_UNHANDLED_REJECTION",
    ];

    fn message_type(message: &ButtonMessage) -> &'static str {
        match message {
            ButtonMessage::Ready => "READY",
            ButtonMessage::Init(_) => "HS1_INIT",
            ButtonMessage::Positioned(_) => "HS2_POSITIONED",
            ButtonMessage::GeometryRequest => "HS3_GEOMETRY_REQUEST",
            ButtonMessage::GeometryResult(_) => "HS5_GEOMETRY_RESULT",
            ButtonMessage::ElementDefined => "ETX_DEFINED",
            ButtonMessage::SetTxData(_) => "SET_TX_DATA",
            ButtonMessage::SetLoading(_) => "SET_LOADING",
            ButtonMessage::SetStyle(_) => "SET_STYLE",
            ButtonMessage::TooltipState(_) => "TOOLTIP_STATE",
            ButtonMessage::ButtonHover(_) => "BUTTON_HOVER",
            ButtonMessage::Confirm => "CONFIRM",
            ButtonMessage::RequestUiDigest => "REQUEST_UI_DIGEST",
            ButtonMessage::UiIntentDigest(_) => "UI_INTENT_DIGEST",
            ButtonMessage::IframeError(_) => "IFRAME_ERROR",
            ButtonMessage::IframeUnhandledRejection(_) => "IFRAME_UNHANDLED_REJECTION",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::channel::{decode, encode};
    use crate::error::ProtocolError;
    use crate::geometry::{Rect, TooltipPosition};

    #[test]
    fn test_unit_messages_have_no_payload() {
        assert_eq!(
            encode::<ButtonChannel>(&ButtonMessage::Ready).unwrap(),
            r#"{"type":"READY"}"#
        );
        assert_eq!(
            decode::<ButtonChannel>(r#"{"type":"CONFIRM"}"#).unwrap(),
            ButtonMessage::Confirm
        );
    }

    #[test]
    fn test_legacy_names_decode_to_handshake_messages() {
        assert_eq!(
            decode::<ButtonChannel>(r#"{"type":"POSITIONING_APPLIED","payload":{"x":4,"y":158}}"#)
                .unwrap(),
            ButtonMessage::Positioned(Point { x: 4.0, y: 158.0 })
        );
        assert_eq!(
            decode::<ButtonChannel>(r#"{"type":"REQUEST_GEOMETRY"}"#).unwrap(),
            ButtonMessage::GeometryRequest
        );
        let geometry = json!({
            "type": "INIT_GEOMETRY",
            "payload": {
                "button": {"x": 44, "y": 158, "width": 200, "height": 48, "borderRadius": 8},
                "tooltip": {"x": 4, "y": 4, "width": 280, "height": 150, "borderRadius": 12},
                "position": "top-center",
                "gap": 4,
                "visible": false
            }
        });
        let decoded = decode::<ButtonChannel>(&geometry.to_string()).unwrap();
        let ButtonMessage::GeometryResult(geometry) = decoded else {
            panic!("expected geometry result, got {decoded:?}");
        };
        assert_eq!(geometry.button, Rect::new(44, 158, 200, 48).with_border_radius(8));
        assert_eq!(geometry.position, TooltipPosition::TopCenter);
    }

    #[test]
    fn test_handshake_names_are_written() {
        let encoded =
            encode::<ButtonChannel>(&ButtonMessage::Positioned(Point { x: 1.0, y: 2.0 })).unwrap();
        assert!(encoded.starts_with(r#"{"type":"HS2_POSITIONED""#));
    }

    #[test]
    fn test_unknown_type_is_distinguished() {
        let err = decode::<ButtonChannel>(r#"{"type":"CANCEL"}"#).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::UnknownMessageType {
                channel: "button".to_string(),
                message_type: "CANCEL".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_payload_is_reported() {
        let err =
            decode::<ButtonChannel>(r#"{"type":"BUTTON_HOVER","payload":{"hovering":"yes"}}"#)
                .unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedPayload { ref message_type, .. } if message_type == "BUTTON_HOVER"));
    }

    #[test]
    fn test_non_envelope_is_rejected() {
        assert!(matches!(
            decode::<ButtonChannel>("42"),
            Err(ProtocolError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            decode::<ButtonChannel>("not json"),
            Err(ProtocolError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_message_type_matches_wire_tag() {
        let message = ButtonMessage::SetLoading(true);
        let encoded: Value =
            serde_json::from_str(&encode::<ButtonChannel>(&message).unwrap()).unwrap();
        assert_eq!(encoded["type"], ButtonChannel::message_type(&message));
        assert_eq!(encoded["payload"], true);
    }
}
