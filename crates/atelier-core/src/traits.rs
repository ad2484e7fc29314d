//! Collaborator traits injected into the record engine and services.

use crate::DomainError;
use shaku::Interface;
use tracing::error;
use uuid::Uuid;

/// Supplies the identity of the caller performing a write.
pub trait ActorProvider: Interface {
    /// Id of the current actor, nil when anonymous.
    fn current_actor_id(&self) -> Uuid;
}

/// Actor provider for background work with no caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousActor;

impl ActorProvider for AnonymousActor {
    fn current_actor_id(&self) -> Uuid {
        Uuid::nil()
    }
}

/// Actor provider that always answers with the same id.
#[derive(Debug, Clone, Copy)]
pub struct FixedActor(pub Uuid);

impl ActorProvider for FixedActor {
    fn current_actor_id(&self) -> Uuid {
        self.0
    }
}

/// Receives errors that were swallowed in favour of a default.
pub trait ErrorSink: Interface {
    fn log_error(&self, error: &DomainError);
}

/// [`ErrorSink`] that writes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn log_error(&self, err: &DomainError) {
        error!(
            error_code = %err.error_code,
            status = err.status,
            cause = %err.cause_text(),
            "{}",
            err.message
        );
    }
}
