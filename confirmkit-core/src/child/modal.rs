//! Bootstrap controller running inside the modal iframe.

use super::{ChildConfig, ChildCore, ChildDom, ChildPhase};
use crate::channel::modal::CloseModal;
use crate::channel::{decode, ModalChannel, ModalMessage};
use crate::error::ProtocolError;

/// Child half of the modal protocol. No geometry is exchanged; the modal is
/// interactive once the origin is known and the element is defined.
#[derive(Debug)]
pub struct ModalBootstrap<D: ChildDom> {
    dom: D,
    config: ChildConfig,
    core: ChildCore,
    phase: ChildPhase,
    confirmed: bool,
}

impl<D: ChildDom> ModalBootstrap<D> {
    /// Creates the controller.
    pub fn new(dom: D, config: ChildConfig) -> Self {
        Self {
            dom,
            config,
            core: ChildCore::default(),
            phase: ChildPhase::Booted,
            confirmed: false,
        }
    }

    /// Attaches the handler, posts `READY` and awaits the element definition.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if `READY` cannot be encoded.
    pub fn boot(&mut self) -> Result<(), ProtocolError> {
        if self.phase != ChildPhase::Booted {
            return Ok(());
        }
        self.dom.listen();
        self.post(&ModalMessage::Ready)?;
        self.phase = ChildPhase::Ready;
        let tag_name = self.config.tag_name.clone();
        self.dom.wait_for_definition(&tag_name);
        Ok(())
    }

    /// Posts `ETX_DEFINED` once.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn on_element_defined(&mut self) -> Result<(), ProtocolError> {
        if self.core.element_defined {
            return Ok(());
        }
        self.core.element_defined = true;
        self.post(&ModalMessage::ElementDefined)?;
        self.maybe_interactive();
        Ok(())
    }

    /// Handles one inbound `message` event from `origin`.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] only when a reply cannot be encoded.
    pub fn handle_message(&mut self, origin: &str, raw: &str) -> Result<(), ProtocolError> {
        if !self.core.accepts(origin) {
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
            ModalMessage::Init(init) => {
                self.core.origin.capture(&init.target_origin);
                if self.phase < ChildPhase::Initialized {
                    self.phase = ChildPhase::Initialized;
                }
                self.maybe_interactive();
            }
            ModalMessage::SetTxData(tx_data) => {
                self.dom.apply_tx_data(&tx_data);
                self.core.tx_data = Some(tx_data);
            }
            ModalMessage::SetLoading(loading) => self.dom.apply_loading(loading),
            ModalMessage::RequestUiDigest => {
                let response = self.core.digest_response();
                self.post(&ModalMessage::UiIntentDigest(response))?;
            }
            other => log::debug!("ignoring child-bound message {other:?}"),
        }
        Ok(())
    }

    fn maybe_interactive(&mut self) {
        if self.phase == ChildPhase::Initialized && self.core.element_defined {
            self.phase = ChildPhase::Interactive;
        }
    }

    /// The user confirmed.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn confirm(&mut self) -> Result<(), ProtocolError> {
        self.confirmed = true;
        self.post(&ModalMessage::Confirm)
    }

    /// The user cancelled.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn cancel(&mut self) -> Result<(), ProtocolError> {
        self.post(&ModalMessage::Cancel)
    }

    /// The modal closed. `confirmed` defaults to whether [`ModalBootstrap::confirm`]
    /// ran when the caller does not know.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn close(&mut self, confirmed: Option<bool>) -> Result<(), ProtocolError> {
        let confirmed = confirmed.unwrap_or(self.confirmed);
        self.post(&ModalMessage::CloseModal(CloseModal { confirmed }))
    }

    /// Forwards an uncaught error to the host.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn report_error(&mut self, error: &str) -> Result<(), ProtocolError> {
        self.post(&ModalMessage::IframeError(error.to_string()))
    }

    /// Forwards an unhandled promise rejection to the host.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the message cannot be encoded.
    pub fn report_unhandled_rejection(&mut self, reason: &str) -> Result<(), ProtocolError> {
        self.post(&ModalMessage::IframeUnhandledRejection(reason.to_string()))
    }

    fn post(&mut self, message: &ModalMessage) -> Result<(), ProtocolError> {
        self.core.post::<ModalChannel>(&mut self.dom, message)
    }

    /// Current handshake phase.
    #[must_use]
    pub const fn phase(&self) -> ChildPhase {
        self.phase
    }

    /// Origin captured from `SET_INIT`.
    #[must_use]
    pub fn trusted_origin(&self) -> Option<&str> {
        self.core.origin.get()
    }

    /// The DOM the controller drives.
    #[must_use]
    pub const fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access to the DOM.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }
}
