//! Supersession
//!
//! Booking inputs change faster than prices come back. [`LatestOnly`] numbers
//! each request and only lets the most recent one publish, so a slow, stale
//! calculation can never overwrite a newer price.

use std::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::sync::watch;
use tracing::debug;

/// Sequence number handed out when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    /// The raw sequence number.
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// The last accepted result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published<T> {
    /// Ticket of the request that produced `value`, `None` before anything was published.
    pub ticket: Option<RequestTicket>,

    /// The published value.
    pub value: Option<T>,
}

/// Last-write-wins holder keyed by request sequence.
#[derive(Debug)]
pub struct LatestOnly<T> {
    issued: AtomicU64,
    state: watch::Sender<Published<T>>,
}

impl<T> LatestOnly<T> {
    /// Create an empty holder.
    pub fn new() -> Self {
        let (state, _) = watch::channel(Published {
            ticket: None,
            value: None,
        });

        Self {
            issued: AtomicU64::new(0),
            state,
        }
    }

    /// Start a request, superseding every earlier one.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` belongs to the most recently started request.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Publish a result. Returns `false`, dropping `value`, if a newer request
    /// has started since `ticket` was issued.
    pub fn publish(&self, ticket: RequestTicket, value: T) -> bool {
        let accepted = self.state.send_if_modified(|state| {
            if !self.is_current(ticket) || state.ticket.is_some_and(|seen| seen >= ticket) {
                return false;
            }

            state.ticket = Some(ticket);
            state.value = Some(value);

            true
        });

        if !accepted {
            debug!(sequence = ticket.0, "dropped superseded result");
        }

        accepted
    }

    /// Run `request` under a fresh ticket and publish its output if still current.
    pub async fn track<F>(&self, request: F) -> bool
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin();
        let value = request.await;

        self.publish(ticket, value)
    }

    /// Watch the published value.
    pub fn subscribe(&self) -> watch::Receiver<Published<T>> {
        self.state.subscribe()
    }
}

impl<T: Clone> LatestOnly<T> {
    /// The last published value.
    pub fn latest(&self) -> Option<T> {
        self.state.borrow().value.clone()
    }
}

impl<T> Default for LatestOnly<T> {
    fn default() -> Self {
        Self::new()
    }
}
