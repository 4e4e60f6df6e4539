//! Session event system.
//!
//! Provides a callback-based observability layer for the
//! [`StyleSwapController`](crate::controller::StyleSwapController). Implement
//! [`EventHandler`] to receive notifications about image intake, generation start and
//! completion, stale results being discarded, credential prompts, resets and downloads.
//!
//! The handler is wrapped in `Arc<dyn EventHandler>` and registered with
//! [`with_event_handler`](crate::controller::StyleSwapController::with_event_handler).
//! Events are emitted after the state change they describe, outside the state lock.
//!
//! # Example
//!
//! ```rust,no_run
//! use styleswap::event::{EventHandler, SessionEvent};
//! use async_trait::async_trait;
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl EventHandler for Printer {
//!     async fn on_session_event(&self, event: &SessionEvent) {
//!         match event {
//!             SessionEvent::GenerationStarted { style_text, .. } => {
//!                 println!("Generating: {}", style_text);
//!             }
//!             SessionEvent::GenerationSucceeded { elapsed_ms, .. } => {
//!                 println!("Done in {} ms", elapsed_ms);
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::path::PathBuf;

/// Events emitted by a [`StyleSwapController`](crate::controller::StyleSwapController).
///
/// Generation events carry the session `epoch` they belong to, so a handler can tell a
/// discarded stale result apart from the current one.
///
/// ```text
/// ImageLoaded { epoch: 1 }
/// GenerationStarted { epoch: 1 }
///   └─ GenerationSucceeded { epoch: 1 }
///    | GenerationFailed { epoch: 1 } (+ CredentialPromptRequired on key errors)
///    | StaleResultDiscarded { epoch: 1 } (image replaced or session reset meanwhile)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new source image replaced the previous one.
    ImageLoaded {
        epoch: u64,
        media_type: String,
        payload_len: usize,
    },
    /// Reading a source image failed; state was left untouched.
    ImageRejected { reason: String },
    /// A generation call was issued.
    GenerationStarted {
        epoch: u64,
        model: String,
        style_text: String,
    },
    /// A generation produced the current result.
    GenerationSucceeded { epoch: u64, elapsed_ms: u64 },
    /// A generation failed; `message` is what the user sees.
    GenerationFailed {
        epoch: u64,
        message: String,
        elapsed_ms: u64,
    },
    /// A generation resolved after the session moved on and was ignored.
    StaleResultDiscarded {
        started_epoch: u64,
        current_epoch: u64,
    },
    /// Credentials must be (re)selected before the next generation.
    CredentialPromptRequired,
    /// Credentials were selected through the selector.
    CredentialSelected,
    /// The session was cleared.
    Reset { epoch: u64 },
    /// The current result was written to disk.
    Downloaded { path: PathBuf },
}

/// Receives [`SessionEvent`]s. The default implementation is a no-op.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_session_event(&self, _event: &SessionEvent) {}
}

/// Forwards every event to the `log` facade.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn on_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::GenerationFailed { message, .. } => {
                log::warn!("generation failed: {}", message)
            }
            SessionEvent::StaleResultDiscarded { .. } => log::warn!("{:?}", event),
            _ => log::info!("{:?}", event),
        }
    }
}
