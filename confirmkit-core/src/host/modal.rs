//! Host controller for the full-screen modal confirmer.

use serde::{Deserialize, Serialize};

use super::digest::{PendingDigests, UiDigestFuture};
use super::{build_srcdoc, HostEvent, HostPhase, HostTimer, IframeHost};
use crate::channel::modal::{CloseModal, ModalInit};
use crate::channel::{
    decode, encode, Channel, MessageSource, ModalChannel, ModalMessage, TargetOrigin, TxData,
};
use crate::defaults::MODAL_TAG_NAME;
use crate::error::ProtocolError;

fn default_tag_name() -> String {
    MODAL_TAG_NAME.to_string()
}

/// Configuration of the modal iframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalHostConfig {
    /// Custom element rendered inside the iframe.
    #[serde(default = "default_tag_name")]
    pub tag_name: String,
    /// URL of the child bootstrap module.
    pub bootstrap_url: String,
}

impl ModalHostConfig {
    /// Configuration with the default tag name.
    #[must_use]
    pub fn new(bootstrap_url: impl Into<String>) -> Self {
        Self {
            tag_name: default_tag_name(),
            bootstrap_url: bootstrap_url.into(),
        }
    }
}

/// Drives the modal iframe. The modal covers the viewport, so there is no
/// geometry phase and no clip-path: the handshake is `READY` → `SET_INIT`,
/// then initial state on `ETX_DEFINED`.
#[derive(Debug)]
pub struct ModalHost<P: IframeHost> {
    platform: P,
    config: ModalHostConfig,
    phase: HostPhase,
    init_sent: bool,
    initial_state_sent: bool,
    tx_data: Option<TxData>,
    loading: bool,
    digests: PendingDigests,
}

impl<P: IframeHost> ModalHost<P> {
    /// Creates a controller.
    pub fn new(platform: P, config: ModalHostConfig) -> Self {
        Self {
            platform,
            config,
            phase: HostPhase::Idle,
            init_sent: false,
            initial_state_sent: false,
            tx_data: None,
            loading: false,
            digests: PendingDigests::default(),
        }
    }

    /// Attaches the listener, then sets `srcdoc`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidConfig`] for an unusable tag name or URL.
    pub fn mount(&mut self) -> Result<(), ProtocolError> {
        if self.phase != HostPhase::Idle {
            return Ok(());
        }
        let html = build_srcdoc(&self.config.tag_name, &self.config.bootstrap_url, None)?;
        self.platform.listen();
        self.platform.set_srcdoc(&html);
        self.phase = HostPhase::IframeMounted;
        Ok(())
    }

    /// Handles one inbound `message` event.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] only when an outbound message cannot be encoded.
    pub fn handle_message(&mut self, source: MessageSource, raw: &str) -> Result<(), ProtocolError> {
        if source == MessageSource::Foreign {
            log::debug!("ignoring message from a foreign window");
            return Ok(());
        }
        let message = match decode::<ModalChannel>(raw) {
            Ok(message) => message,
            Err(err) => {
                log::debug!("dropping modal message: {err}");
                return Ok(());
            }
        };

        match message {
            ModalMessage::Ready => {
                if self.init_sent {
                    log::debug!("duplicate READY ignored");
                    return Ok(());
                }
                let init = ModalInit {
                    target_origin: self.platform.host_origin(),
                };
                self.post(&ModalMessage::Init(init))?;
                self.init_sent = true;
                self.platform.emit(HostEvent::Ready);
                self.advance_phase();
            }
            ModalMessage::ElementDefined => {
                if self.initial_state_sent {
                    return Ok(());
                }
                if let Some(tx_data) = self.tx_data.clone() {
                    self.post(&ModalMessage::SetTxData(tx_data))?;
                }
                self.post(&ModalMessage::SetLoading(self.loading))?;
                self.initial_state_sent = true;
                self.advance_phase();
            }
            ModalMessage::UiIntentDigest(response) => {
                self.digests.settle(&mut self.platform, response);
            }
            ModalMessage::Confirm => self.platform.emit(HostEvent::Confirmed),
            ModalMessage::Cancel => self.platform.emit(HostEvent::Cancelled),
            ModalMessage::CloseModal(CloseModal { confirmed }) => {
                self.platform.emit(HostEvent::Closed { confirmed });
            }
            ModalMessage::IframeError(error) => {
                log::error!("modal iframe error: {error}");
                self.platform.emit(HostEvent::ChildError(error));
            }
            ModalMessage::IframeUnhandledRejection(reason) => {
                log::error!("modal iframe unhandled rejection: {reason}");
                self.platform.emit(HostEvent::ChildUnhandledRejection(reason));
            }
            ModalMessage::Init(_)
            | ModalMessage::SetTxData(_)
            | ModalMessage::SetLoading(_)
            | ModalMessage::RequestUiDigest => {
                log::debug!(
                    "ignoring host-bound {} sent by the iframe",
                    ModalChannel::message_type(&message)
                );
            }
        }
        Ok(())
    }

    // ETX_DEFINED may race ahead of READY; interactive needs both.
    fn advance_phase(&mut self) {
        let next = match (self.init_sent, self.initial_state_sent) {
            (true, true) => HostPhase::Interactive,
            (true, false) => HostPhase::InitSent,
            (false, _) => return,
        };
        if next > self.phase {
            self.phase = next;
            if next == HostPhase::Interactive {
                self.platform.emit(HostEvent::Interactive);
            }
        }
    }

    fn post(&mut self, message: &ModalMessage) -> Result<(), ProtocolError> {
        let raw = encode::<ModalChannel>(message)?;
        log::trace!("host -> modal iframe: {raw}");
        self.platform.post_message(&raw, &TargetOrigin::Any);
        Ok(())
    }

    /// Replaces the transactions shown in the modal.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the data cannot be encoded.
    pub fn set_tx_data(&mut self, tx_data: TxData) -> Result<(), ProtocolError> {
        if self.initial_state_sent {
            self.post(&ModalMessage::SetTxData(tx_data.clone()))?;
        }
        self.tx_data = Some(tx_data);
        Ok(())
    }

    /// Toggles the loading indicator.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn set_loading(&mut self, loading: bool) -> Result<(), ProtocolError> {
        self.loading = loading;
        if self.initial_state_sent {
            self.post(&ModalMessage::SetLoading(loading))?;
        }
        Ok(())
    }

    /// Asks the modal for the digest of what it displays.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the request cannot be encoded.
    pub fn request_ui_intent_digest(&mut self) -> Result<UiDigestFuture, ProtocolError> {
        let future = self.digests.issue(&mut self.platform);
        self.post(&ModalMessage::RequestUiDigest)?;
        Ok(future)
    }

    /// Handles a due timer.
    pub fn on_timer(&mut self, timer: HostTimer) {
        match timer {
            HostTimer::DigestTimeout { request_id } => {
                self.digests.expire(request_id);
            }
        }
    }

    /// Current handshake phase.
    #[must_use]
    pub const fn phase(&self) -> HostPhase {
        self.phase
    }

    /// The platform the controller drives.
    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the platform.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DigestError;
    use crate::test_support::MemoryIframe;

    fn host() -> ModalHost<MemoryIframe> {
        let mut host = ModalHost::new(
            MemoryIframe::new("https://wallet.example"),
            ModalHostConfig::new("/modal.js"),
        );
        host.mount().unwrap();
        host
    }

    fn child(host: &mut ModalHost<MemoryIframe>, message: ModalMessage) {
        let raw = encode::<ModalChannel>(&message).unwrap();
        host.handle_message(MessageSource::ContentWindow, &raw).unwrap();
    }

    #[test]
    fn test_ready_declares_target_origin() {
        let mut host = host();
        child(&mut host, ModalMessage::Ready);
        assert_eq!(
            host.platform().sent::<ModalChannel>(),
            vec![ModalMessage::Init(ModalInit {
                target_origin: "https://wallet.example".to_string()
            })]
        );
        assert!(host.platform().clip_paths.is_empty());
    }

    #[test]
    fn test_initial_state_sent_once_on_element_defined() {
        let mut host = host();
        host.set_tx_data(TxData {
            near_account_id: "alice.near".to_string(),
            tx_signing_requests: vec![],
        })
        .unwrap();
        child(&mut host, ModalMessage::ElementDefined);
        child(&mut host, ModalMessage::Ready);
        child(&mut host, ModalMessage::ElementDefined);

        assert_eq!(
            host.platform().sent_types(),
            vec!["SET_TX_DATA", "SET_LOADING", "SET_INIT"]
        );
        assert_eq!(host.phase(), HostPhase::Interactive);
        assert_eq!(
            host.platform().events,
            vec![HostEvent::Ready, HostEvent::Interactive]
        );
    }

    #[test]
    fn test_user_actions_become_events() {
        let mut host = host();
        child(&mut host, ModalMessage::Confirm);
        child(&mut host, ModalMessage::Cancel);
        child(&mut host, ModalMessage::CloseModal(CloseModal { confirmed: false }));
        assert_eq!(
            host.platform().events,
            vec![
                HostEvent::Confirmed,
                HostEvent::Cancelled,
                HostEvent::Closed { confirmed: false }
            ]
        );
    }

    #[test]
    fn test_superseded_digest_request() {
        let mut host = host();
        let first = host.request_ui_intent_digest().unwrap();
        let second = host.request_ui_intent_digest().unwrap();
        child(
            &mut host,
            ModalMessage::UiIntentDigest(crate::channel::DigestResponse::success("d".to_string())),
        );
        assert_eq!(tokio_test::block_on(first), Err(DigestError::Superseded));
        assert_eq!(tokio_test::block_on(second), Ok("d".to_string()));
    }

    #[test]
    fn test_button_vocabulary_is_ignored() {
        let mut host = host();
        host.handle_message(MessageSource::ContentWindow, r#"{"type":"TOOLTIP_STATE"}"#)
            .unwrap();
        assert!(host.platform().events.is_empty());
    }
}
