//! Common test utilities shared across integration tests.
#![allow(dead_code, missing_docs)]

use std::time::Duration;

use confirmkit_core::test_support::{MemoryButtonDom, MemoryIframe, MemoryModalDom};
use confirmkit_core::{
    ButtonBootstrap, ButtonHost, ButtonHostConfig, ChildConfig, MessageSource, ModalBootstrap,
    ModalHost, ModalHostConfig, TargetOrigin,
};

pub const HOST_ORIGIN: &str = "https://dapp.example";

/// Direction of a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToChild,
    ToHost,
}

/// Every message delivered by a harness, with its `type` tag.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<(Direction, String)>,
}

impl Transcript {
    fn record(&mut self, direction: Direction, raw: &str) {
        let value: serde_json::Value = serde_json::from_str(raw).expect("delivered JSON");
        let message_type = value["type"].as_str().expect("string type").to_string();
        self.entries.push((direction, message_type));
    }

    pub fn count(&self, direction: Direction, message_type: &str) -> usize {
        self.entries
            .iter()
            .filter(|(d, t)| *d == direction && t == message_type)
            .count()
    }

    pub fn types(&self, direction: Direction) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(d, _)| *d == direction)
            .map(|(_, t)| t.as_str())
            .collect()
    }
}

fn assert_reaches_host(target: &TargetOrigin) {
    if let TargetOrigin::Exact(origin) = target {
        assert_eq!(origin, HOST_ORIGIN, "child posted to a foreign origin");
    }
}

/// A button host and its iframe bootstrap connected through in-memory
/// platforms.
pub struct ButtonHarness {
    pub host: ButtonHost<MemoryIframe>,
    pub child: ButtonBootstrap<MemoryButtonDom>,
    pub transcript: Transcript,
}

impl ButtonHarness {
    pub fn new() -> Self {
        Self::with_dom(MemoryButtonDom::rendered())
    }

    pub fn with_dom(dom: MemoryButtonDom) -> Self {
        let config = ButtonHostConfig::new("https://wallet.example/sdk/button-bootstrap.js");
        let host = ButtonHost::new(MemoryIframe::new(HOST_ORIGIN), config).expect("valid config");
        Self {
            host,
            child: ButtonBootstrap::new(dom, ChildConfig::button()),
            transcript: Transcript::default(),
        }
    }

    /// Mounts the iframe and boots the child script.
    pub fn start(&mut self) {
        self.host.mount().expect("mount");
        self.child.boot().expect("boot");
    }

    /// Delivers queued messages both ways until both sides are idle.
    pub fn pump(&mut self) {
        loop {
            let to_child = self.host.platform_mut().take_outbox();
            let to_host = self.child.dom_mut().take_outbox();
            if to_child.is_empty() && to_host.is_empty() {
                break;
            }
            for (raw, _) in to_child {
                self.transcript.record(Direction::ToChild, &raw);
                self.child.handle_message(HOST_ORIGIN, &raw).expect("child handles");
            }
            for (raw, target) in to_host {
                assert_reaches_host(&target);
                self.transcript.record(Direction::ToHost, &raw);
                self.host
                    .handle_message(MessageSource::ContentWindow, &raw)
                    .expect("host handles");
            }
        }
    }

    /// Resolves `customElements.whenDefined` inside the iframe.
    pub fn define_element(&mut self) {
        self.child.on_element_defined().expect("element defined");
    }

    /// Runs a pending animation frame, if one was requested.
    pub fn run_frame(&mut self) {
        self.child.on_animation_frame().expect("animation frame");
    }

    /// Moves both clocks forward and fires due timers.
    pub fn advance(&mut self, elapsed: Duration) {
        for timer in self.child.dom_mut().timers.advance(elapsed) {
            self.child.on_timer(timer).expect("child timer");
        }
        for timer in self.host.platform_mut().timers.advance(elapsed) {
            self.host.on_timer(timer);
        }
    }

    /// Full handshake with the element defined after positioning.
    pub fn interactive() -> Self {
        let mut harness = Self::new();
        harness.start();
        harness.pump();
        harness.define_element();
        harness.pump();
        harness
    }
}

/// A modal host and its bootstrap.
pub struct ModalHarness {
    pub host: ModalHost<MemoryIframe>,
    pub child: ModalBootstrap<MemoryModalDom>,
    pub transcript: Transcript,
}

impl ModalHarness {
    pub fn new() -> Self {
        Self {
            host: ModalHost::new(
                MemoryIframe::new(HOST_ORIGIN),
                ModalHostConfig::new("https://wallet.example/sdk/modal-bootstrap.js"),
            ),
            child: ModalBootstrap::new(MemoryModalDom::default(), ChildConfig::modal()),
            transcript: Transcript::default(),
        }
    }

    pub fn start(&mut self) {
        self.host.mount().expect("mount");
        self.child.boot().expect("boot");
    }

    pub fn pump(&mut self) {
        loop {
            let to_child = self.host.platform_mut().take_outbox();
            let to_host = self.child.dom_mut().take_outbox();
            if to_child.is_empty() && to_host.is_empty() {
                break;
            }
            for (raw, _) in to_child {
                self.transcript.record(Direction::ToChild, &raw);
                self.child.handle_message(HOST_ORIGIN, &raw).expect("child handles");
            }
            for (raw, target) in to_host {
                assert_reaches_host(&target);
                self.transcript.record(Direction::ToHost, &raw);
                self.host
                    .handle_message(MessageSource::ContentWindow, &raw)
                    .expect("host handles");
            }
        }
    }
}
