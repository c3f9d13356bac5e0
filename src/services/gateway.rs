//! Request dispatch for the UI thread.
//!
//! Each issued request runs on its own worker thread so the event loop never
//! blocks on the network. Completions come back over a channel together with
//! the caller's context value and are drained by the UI loop, which is the
//! only place state is mutated.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::services::api_client::{Backend, Envelope, Request};
use crate::utils::errors::TransportError;

/// Sequence number of an issued request, strictly increasing.
pub type Ticket = u64;

#[derive(Debug)]
pub struct Completion<C> {
    pub ticket: Ticket,
    pub context: C,
    pub outcome: Result<Envelope, TransportError>,
}

pub struct Gateway<C> {
    backend: Arc<dyn Backend>,
    sender: Sender<Completion<C>>,
    receiver: Receiver<Completion<C>>,
    next_ticket: Ticket,
    in_flight: usize,
}

impl<C: Send + 'static> Gateway<C> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            backend,
            sender,
            receiver,
            next_ticket: 0,
            in_flight: 0,
        }
    }

    /// Issue exactly one request. The completion is delivered later through
    /// [`Gateway::try_next`] or [`Gateway::wait_next`].
    pub fn issue(&mut self, request: Request, context: C) -> Ticket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight += 1;
        log::info!("Issuing request #{} action={}", ticket, request.action());

        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();
        // The context travels with the job so a failed spawn can still settle it.
        let job = Arc::new(Mutex::new(Some(context)));
        let worker_job = Arc::clone(&job);

        let spawned = thread::Builder::new()
            .name(format!("f2b-request-{}", ticket))
            .spawn(move || {
                let outcome = backend.call(&request);
                let context = worker_job.lock().ok().and_then(|mut slot| slot.take());
                if let Some(context) = context {
                    let _ = sender.send(Completion {
                        ticket,
                        context,
                        outcome,
                    });
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn worker for request #{}: {}", ticket, e);
            let context = job.lock().ok().and_then(|mut slot| slot.take());
            if let Some(context) = context {
                let _ = self.sender.send(Completion {
                    ticket,
                    context,
                    outcome: Err(TransportError::Connection(e.to_string())),
                });
            }
        }
        ticket
    }

    pub fn try_next(&mut self) -> Option<Completion<C>> {
        let completion = self.receiver.try_recv().ok()?;
        self.settled(&completion);
        Some(completion)
    }

    pub fn wait_next(&mut self, timeout: Duration) -> Option<Completion<C>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => {
                self.settled(&completion);
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn settled(&mut self, completion: &Completion<C>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion.outcome {
            Ok(ref envelope) => log::info!(
                "Request #{} settled success={}",
                completion.ticket,
                envelope.success
            ),
            Err(ref e) => log::warn!("Request #{} failed in transport: {}", completion.ticket, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Backend for Echo {
        fn call(&self, request: &Request) -> Result<Envelope, TransportError> {
            match request {
                Request::Reload => Err(TransportError::Connection("refused".to_string())),
                other => Ok(Envelope::ok().with("action", other.action().into())),
            }
        }
    }

    #[test]
    fn completions_carry_context_and_ticket() {
        let mut gateway: Gateway<&'static str> = Gateway::new(Arc::new(Echo));
        let first = gateway.issue(Request::Status, "status");
        let second = gateway.issue(Request::Reload, "reload");
        assert!(second > first);
        assert_eq!(gateway.in_flight(), 2);

        let mut seen = Vec::new();
        while let Some(done) = gateway.wait_next(Duration::from_secs(5)) {
            seen.push((done.ticket, done.context, done.outcome.is_ok()));
            if gateway.in_flight() == 0 {
                break;
            }
        }
        seen.sort();
        assert_eq!(seen, vec![(first, "status", true), (second, "reload", false)]);
        assert!(gateway.try_next().is_none());
    }
}
