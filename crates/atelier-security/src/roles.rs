//! Role checks for protected operations.

use crate::IdentityContext;
use atelier_core::domain::UserIdentity;
use atelier_core::{DomainError, ResultValue};
use std::future::Future;
use tracing::debug;

/// Status of a failed role check.
pub const FORBIDDEN: u16 = 403;

/// Checks that the caller holds at least one of `required`.
///
/// An empty requirement always passes, even for anonymous callers.
/// Otherwise fails with `AuthCheck-E00` (403).
pub fn verify_roles<S: AsRef<str>>(identity: Option<&UserIdentity>, required: &[S]) -> ResultValue<()> {
    if required.is_empty() || identity.is_some_and(|identity| identity.has_any_role(required)) {
        return ResultValue::success(());
    }

    debug!(
        user_id = ?identity.map(|identity| identity.id),
        "Caller lacks the required roles"
    );
    ResultValue::failure(
        DomainError::new("AuthCheck-E00", "You do not have the required roles for this call.").with_status(FORBIDDEN),
    )
}

impl IdentityContext {
    /// [`verify_roles`] against this caller.
    pub fn require_roles<S: AsRef<str>>(&self, required: &[S]) -> ResultValue<()> {
        verify_roles(self.identity(), required)
    }

    /// Runs `operation` only when the caller passes [`verify_roles`].
    pub async fn with_roles<T, S, Fut>(&self, required: &[S], operation: impl FnOnce() -> Fut) -> ResultValue<T>
    where
        S: AsRef<str>,
        Fut: Future<Output = ResultValue<T>>,
    {
        match self.require_roles(required).into_parts() {
            (_, Some(error)) => ResultValue::failure(error),
            _ => operation().await,
        }
    }
}
