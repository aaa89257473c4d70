//! Notification payload dispatch.
//!
//! A payload is one envelope of events. Events are processed in order and
//! independently: a failed event is logged and the rest of the payload is
//! still applied.

use std::sync::Arc;

use regstat_core::{Action, Envelope, Event};
use serde::Serialize;
use tracing::{debug, error, info, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::workflow::EventHandler;

/// Per-payload processing counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    /// Events that changed the audit store.
    pub handled: usize,
    /// Events that were dropped without error.
    pub skipped: usize,
    /// Events whose processing failed.
    pub failed: usize,
}

impl DispatchSummary {
    /// Total number of events seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.handled + self.skipped + self.failed
    }
}

/// Routes the events of a payload to an [`EventHandler`].
#[derive(Clone)]
pub struct Dispatcher {
    handler: Arc<dyn EventHandler>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over a handler.
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }

    /// Decodes a notification body and processes each of its events.
    ///
    /// An empty body is an empty envelope.
    ///
    /// # Errors
    ///
    /// Returns an error only if the body is not a notification envelope.
    /// Failures of individual events are counted in the summary.
    pub async fn process_payload(&self, body: &[u8]) -> Result<DispatchSummary> {
        let payload_id = Uuid::now_v7();
        let span = tracing::info_span!("payload", %payload_id);
        self.process_envelope(body).instrument(span).await
    }

    async fn process_envelope(&self, body: &[u8]) -> Result<DispatchSummary> {
        let envelope = Envelope::from_slice(body).inspect_err(|e| {
            error!(error = %e, "Rejected notification payload");
        })?;

        let mut summary = DispatchSummary::default();
        for event in &envelope.events {
            self.dispatch(event, &mut summary).await;
        }

        info!(
            events = summary.total(),
            handled = summary.handled,
            skipped = summary.skipped,
            failed = summary.failed,
            "Processed notification payload"
        );
        Ok(summary)
    }

    async fn dispatch(&self, event: &Event, summary: &mut DispatchSummary) {
        let result = match event.action {
            Action::Push => self.handler.process_push(event).await,
            Action::Pull => self.handler.process_pull(event).await,
            Action::Delete => self.handler.process_delete(event).await,
            Action::Mount | Action::Unknown => {
                debug!(
                    action = %event.action,
                    digest = %event.target.digest,
                    reason = "unhandled_action",
                    "Ignoring event"
                );
                summary.skipped += 1;
                return;
            }
        };

        match result {
            Ok(outcome) if outcome.is_persisted() => summary.handled += 1,
            Ok(_) => summary.skipped += 1,
            Err(e) => {
                error!(
                    action = %event.action,
                    digest = %event.target.digest,
                    error = %e,
                    "Failed to process event"
                );
                summary.failed += 1;
            }
        }
    }
}
