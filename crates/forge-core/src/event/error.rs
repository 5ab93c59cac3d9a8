//! Event system errors: listener registration/removal and dispatch-time
//! failures. Handler panics and timeouts are recovered locally by the bus
//! and only surface here as aggregate counters, never as a propagated error.
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("listener '{0}' not found")]
    ListenerNotFound(Uuid),

    #[error("event dispatch failed: {reason}")]
    DispatchError { reason: String },

    #[error("invalid event filter: {reason}")]
    InvalidFilter { reason: String },

    #[error("internal event system error: {0}")]
    InternalError(String),
}
