//! Integration tests for the host/child handshake.
mod common;

use std::time::Duration;

use common::{ButtonHarness, Direction, ModalHarness};
use confirmkit_core::defaults::{DIGEST_TIMEOUT, HIDE_GRACE};
use confirmkit_core::DigestError;
use confirmkit_core::test_support::MemoryButtonDom;
use confirmkit_core::{
    compute_ui_intent_digest, verify_ui_digest, ChildPhase, ClipPathGenerator, HostEvent,
    HostPhase, MessageSource, PointerTarget, Rect, Size, TransactionInput, TxData,
};
use serde_json::json;

fn button_clip() -> String {
    ClipPathGenerator::default()
        .around(Rect::new(44, 308, 200, 48))
        .expect("supported")
        .to_css()
}

fn union_clip() -> String {
    ClipPathGenerator::default()
        .around(Rect::new(4, 4, 280, 352))
        .expect("supported")
        .to_css()
}

fn tx_data() -> TxData {
    let inputs: Vec<TransactionInput> = serde_json::from_value(json!([{
        "receiverId": "market.near",
        "actions": [{
            "action_type": "FunctionCall",
            "method_name": "buy",
            "args": {"token_id": "42", "price": "1000"},
            "gas": "30000000000000",
            "deposit": "1"
        }]
    }]))
    .expect("valid inputs");
    TxData {
        near_account_id: "alice.near".to_string(),
        tx_signing_requests: inputs,
    }
}

#[test]
fn test_handshake_end_to_end() {
    let harness = ButtonHarness::interactive();

    assert_eq!(harness.host.phase(), HostPhase::Interactive);
    assert_eq!(harness.child.phase(), ChildPhase::Interactive);
    assert_eq!(
        harness.transcript.types(Direction::ToChild),
        vec!["HS1_INIT", "HS3_GEOMETRY_REQUEST", "SET_LOADING", "SET_STYLE"]
    );
    assert_eq!(
        harness.transcript.types(Direction::ToHost),
        vec!["READY", "HS2_POSITIONED", "HS5_GEOMETRY_RESULT", "ETX_DEFINED"]
    );
    assert_eq!(harness.host.clip_path(), Some(button_clip().as_str()));
    assert_eq!(
        harness.host.platform().current_size(),
        Some(Size::new(288.0, 360.0))
    );
    assert_eq!(
        harness.host.platform().events,
        vec![HostEvent::Ready, HostEvent::Interactive]
    );
    assert_eq!(
        harness.child.trusted_origin(),
        Some(common::HOST_ORIGIN)
    );
}

#[test]
fn test_initial_state_sent_once_when_element_defined_early() {
    let mut harness = ButtonHarness::new();
    harness.host.set_tx_data(tx_data()).expect("tx data");
    harness.start();
    // Definition resolves before the host answered READY.
    harness.define_element();
    harness.pump();
    harness.define_element();
    harness.pump();

    assert_eq!(harness.transcript.count(Direction::ToChild, "SET_TX_DATA"), 1);
    assert_eq!(harness.transcript.count(Direction::ToChild, "SET_STYLE"), 1);
    assert_eq!(harness.transcript.count(Direction::ToHost, "ETX_DEFINED"), 1);
    assert_eq!(harness.host.phase(), HostPhase::Interactive);
    assert_eq!(harness.child.dom().tx_data, Some(tx_data()));
}

#[test]
fn test_initial_state_sent_once_when_element_defined_late() {
    let mut harness = ButtonHarness::new();
    harness.host.set_tx_data(tx_data()).expect("tx data");
    harness.start();
    harness.pump();
    assert_eq!(harness.transcript.count(Direction::ToChild, "SET_TX_DATA"), 0);

    harness.define_element();
    harness.pump();

    assert_eq!(harness.transcript.count(Direction::ToChild, "SET_TX_DATA"), 1);
    assert_eq!(harness.transcript.count(Direction::ToChild, "SET_STYLE"), 1);
    assert_eq!(harness.host.phase(), HostPhase::Interactive);
}

#[test]
fn test_identical_tooltip_state_posted_once() {
    let mut harness = ButtonHarness::interactive();
    harness.child.dom_mut().tooltip = Some(Rect::new(4, 4, 280, 170));

    for _ in 0..3 {
        harness.child.on_layout_change();
        harness.run_frame();
        harness.pump();
    }

    assert_eq!(harness.transcript.count(Direction::ToHost, "TOOLTIP_STATE"), 1);
    assert_eq!(
        harness.host.geometry().map(|g| g.tooltip),
        Some(Rect::new(4, 4, 280, 170))
    );
}

#[test]
fn test_hover_expands_then_grace_period_collapses() {
    let mut harness = ButtonHarness::interactive();

    harness
        .child
        .on_pointer_enter(PointerTarget::Button)
        .expect("enter");
    harness.pump();
    // Hover alone widens the region before the tooltip is reported visible.
    assert_eq!(harness.host.clip_path(), Some(union_clip().as_str()));
    harness.run_frame();
    harness.pump();
    assert!(harness.host.geometry().is_some_and(|g| g.visible));

    harness
        .child
        .on_pointer_leave(PointerTarget::Button)
        .expect("leave");
    harness.pump();
    assert_eq!(harness.host.clip_path(), Some(union_clip().as_str()));

    harness.advance(HIDE_GRACE);
    harness.run_frame();
    harness.pump();
    assert_eq!(harness.host.clip_path(), Some(button_clip().as_str()));
    assert_eq!(
        harness.host.platform().current_size(),
        Some(Size::new(288.0, 360.0))
    );
}

#[test]
fn test_tooltip_stays_visible_when_pointer_moves_into_it() {
    let mut harness = ButtonHarness::interactive();
    harness
        .child
        .on_pointer_enter(PointerTarget::Button)
        .expect("enter");
    harness.run_frame();
    harness.pump();

    harness
        .child
        .on_pointer_leave(PointerTarget::Button)
        .expect("leave");
    harness.advance(Duration::from_millis(60));
    harness
        .child
        .on_pointer_enter(PointerTarget::Tooltip)
        .expect("enter tooltip");
    harness.advance(HIDE_GRACE);
    harness.child.on_layout_change();
    harness.run_frame();
    harness.pump();

    assert!(harness.child.is_tooltip_visible());
    assert!(harness.host.geometry().is_some_and(|g| g.visible));
    assert_eq!(harness.host.clip_path(), Some(union_clip().as_str()));
    assert_eq!(harness.transcript.count(Direction::ToHost, "TOOLTIP_STATE"), 1);
}

#[test]
fn test_quick_digest_requests_supersede() {
    let mut harness = ButtonHarness::interactive();
    harness.host.set_tx_data(tx_data()).expect("tx data");
    harness.pump();

    let first = harness.host.request_ui_intent_digest().expect("first");
    let second = harness.host.request_ui_intent_digest().expect("second");
    harness.pump();

    assert_eq!(tokio_test::block_on(first), Err(DigestError::Superseded));
    let digest = tokio_test::block_on(second).expect("digest");
    let intended = tx_data().tx_signing_requests;
    assert_eq!(digest, compute_ui_intent_digest(&intended).expect("host digest"));
    verify_ui_digest(&digest, &intended).expect("displayed matches intended");
}

#[test]
fn test_digest_times_out_without_answer() {
    let mut harness = ButtonHarness::interactive();
    let mut pending = harness.host.request_ui_intent_digest().expect("request");
    // Never delivered to the child.
    harness.host.platform_mut().take_outbox();

    harness.advance(DIGEST_TIMEOUT - Duration::from_millis(1));
    assert_eq!(pending.try_result(), None);
    harness.advance(Duration::from_millis(1));
    assert_eq!(pending.try_result(), Some(Err(DigestError::Timeout)));
}

#[test]
fn test_digest_detects_changed_intent() {
    let mut harness = ButtonHarness::interactive();
    harness.host.set_tx_data(tx_data()).expect("tx data");
    harness.pump();

    let request = harness.host.request_ui_intent_digest().expect("request");
    harness.pump();
    let displayed = tokio_test::block_on(request).expect("digest");

    let mut tampered = tx_data().tx_signing_requests;
    tampered[0].receiver_id = "evil.near".to_string();
    assert!(matches!(
        verify_ui_digest(&displayed, &tampered),
        Err(DigestError::Mismatch { .. })
    ));
}

#[test]
fn test_slow_shadow_root_still_completes() {
    let mut harness = ButtonHarness::with_dom(MemoryButtonDom::rendered().shadow_ready_after(4));
    harness.start();
    harness.pump();
    assert_eq!(harness.host.phase(), HostPhase::InitSent);

    for _ in 0..4 {
        harness.advance(confirmkit_core::defaults::DOM_RETRY_DELAY);
    }
    harness.pump();
    harness.define_element();
    harness.pump();
    assert_eq!(harness.host.phase(), HostPhase::Interactive);
}

#[test]
fn test_legacy_message_names_drive_the_host() {
    let mut legacy = ButtonHarness::new();
    legacy.host.mount().expect("mount");
    legacy
        .host
        .handle_message(MessageSource::ContentWindow, r#"{"type":"READY"}"#)
        .expect("ready");
    legacy
        .host
        .handle_message(
            MessageSource::ContentWindow,
            r#"{"type":"POSITIONING_APPLIED","payload":{"x":44,"y":308}}"#,
        )
        .expect("positioned");
    assert_eq!(legacy.host.phase(), HostPhase::PositionAcked);

    legacy
        .host
        .handle_message(
            MessageSource::ContentWindow,
            r#"{"type":"INIT_GEOMETRY","payload":{
                "button":{"x":44,"y":308,"width":200,"height":48},
                "tooltip":{"x":4,"y":4,"width":280,"height":150},
                "position":"top-center","gap":4,"visible":false}}"#,
        )
        .expect("geometry");
    assert_eq!(legacy.host.phase(), HostPhase::GeometryReceived);
    assert_eq!(legacy.host.clip_path(), Some(button_clip().as_str()));
}

#[test]
fn test_modal_flow() {
    let mut harness = ModalHarness::new();
    harness.host.set_tx_data(tx_data()).expect("tx data");
    harness.start();
    harness.pump();
    harness.child.on_element_defined().expect("defined");
    harness.pump();

    assert_eq!(harness.host.phase(), HostPhase::Interactive);
    assert_eq!(harness.child.phase(), ChildPhase::Interactive);
    assert_eq!(harness.child.dom().tx_data, Some(tx_data()));

    let request = harness.host.request_ui_intent_digest().expect("request");
    harness.pump();
    let displayed = tokio_test::block_on(request).expect("digest");
    verify_ui_digest(&displayed, &tx_data().tx_signing_requests).expect("match");

    harness.child.confirm().expect("confirm");
    harness.child.close(None).expect("close");
    harness.pump();
    assert_eq!(
        harness.host.platform().events,
        vec![
            HostEvent::Ready,
            HostEvent::Interactive,
            HostEvent::Confirmed,
            HostEvent::Closed { confirmed: true },
        ]
    );
}
