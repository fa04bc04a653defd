//! Single in-flight UI digest request per widget.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot::{self, error::TryRecvError};

use super::HostTimer;
use crate::channel::DigestResponse;
use crate::defaults::DIGEST_TIMEOUT;
use crate::error::DigestError;
use crate::scheduler::{Scheduler, TimerHandle};

type DigestResult = Result<String, DigestError>;

/// Resolves with the digest reported by the iframe for what it displays.
///
/// Settles with [`DigestError::Superseded`] when a newer request replaces it,
/// [`DigestError::Timeout`] when the iframe does not answer in time, and
/// [`DigestError::Cancelled`] when the owning controller is dropped.
#[derive(Debug)]
pub struct UiDigestFuture {
    receiver: oneshot::Receiver<DigestResult>,
}

impl UiDigestFuture {
    /// Non-blocking check: `None` while the request is still pending.
    pub fn try_result(&mut self) -> Option<DigestResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(DigestError::Cancelled)),
        }
    }
}

impl Future for UiDigestFuture {
    type Output = DigestResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(DigestError::Cancelled)))
    }
}

#[derive(Debug)]
struct InFlight {
    id: u64,
    timer: TimerHandle,
    sender: oneshot::Sender<DigestResult>,
}

/// Bookkeeping for the outstanding digest request.
#[derive(Debug, Default)]
pub(crate) struct PendingDigests {
    next_id: u64,
    in_flight: Option<InFlight>,
}

impl PendingDigests {
    /// Starts a new request, superseding the outstanding one.
    pub(crate) fn issue<S>(&mut self, scheduler: &mut S) -> UiDigestFuture
    where
        S: Scheduler<HostTimer> + ?Sized,
    {
        if let Some(previous) = self.in_flight.take() {
            log::debug!("digest request {} superseded", previous.id);
            scheduler.cancel(previous.timer);
            // The caller may have dropped the previous future already.
            let _ = previous.sender.send(Err(DigestError::Superseded));
        }

        self.next_id += 1;
        let id = self.next_id;
        let (sender, receiver) = oneshot::channel();
        let timer = scheduler.schedule(DIGEST_TIMEOUT, HostTimer::DigestTimeout { request_id: id });
        self.in_flight = Some(InFlight { id, timer, sender });
        UiDigestFuture { receiver }
    }

    /// Settles the outstanding request with the iframe's answer. Returns
    /// `false` when nothing was waiting.
    pub(crate) fn settle<S>(&mut self, scheduler: &mut S, response: DigestResponse) -> bool
    where
        S: Scheduler<HostTimer> + ?Sized,
    {
        let Some(in_flight) = self.in_flight.take() else {
            log::debug!("ignoring unsolicited UI_INTENT_DIGEST");
            return false;
        };
        scheduler.cancel(in_flight.timer);

        let result = match response {
            DigestResponse {
                ok: true,
                digest: Some(digest),
                ..
            } => Ok(digest),
            DigestResponse { error, .. } => Err(DigestError::Rejected(
                error.unwrap_or_else(|| "no digest in response".to_string()),
            )),
        };
        let _ = in_flight.sender.send(result);
        true
    }

    /// Fails request `request_id` with a timeout if it is still outstanding.
    pub(crate) fn expire(&mut self, request_id: u64) -> bool {
        match self.in_flight.take() {
            Some(in_flight) if in_flight.id == request_id => {
                log::warn!("digest request {request_id} timed out");
                let _ = in_flight.sender.send(Err(DigestError::Timeout));
                true
            }
            other => {
                self.in_flight = other;
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) const fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }
}
