//! Caller identity of the current request.

use atelier_core::domain::UserIdentity;
use atelier_core::{ActorProvider, Document, DomainResult, Record};
use uuid::Uuid;

/// Holds the decoded identity of the caller, if any.
///
/// Anonymous callers act as the nil user with no roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityContext {
    identity: Option<UserIdentity>,
}

impl IdentityContext {
    #[must_use]
    pub const fn new(identity: Option<UserIdentity>) -> Self {
        Self { identity }
    }

    #[must_use]
    pub const fn anonymous() -> Self {
        Self { identity: None }
    }

    #[must_use]
    pub fn for_user(id: Uuid, roles: Vec<String>) -> Self {
        Self::new(Some(UserIdentity { id, roles }))
    }

    /// Builds a context from decoded token claims (`{"id": .., "roles": [..]}`).
    ///
    /// # Errors
    ///
    /// `RecordBase-Import-E01` when the claims are malformed.
    pub fn from_claims(claims: &Document) -> DomainResult<Self> {
        Ok(Self::new(Some(UserIdentity::import(claims)?)))
    }

    pub const fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// Caller id, nil when anonymous.
    pub fn user_id(&self) -> Uuid {
        self.identity.as_ref().map_or(Uuid::nil(), |identity| identity.id)
    }

    pub fn user_roles(&self) -> &[String] {
        self.identity.as_ref().map_or(&[][..], |identity| identity.roles.as_slice())
    }

    /// `true` when the caller is `user_id` or holds one of `bypass_roles`.
    /// Always `false` for anonymous callers.
    pub fn match_or_bypass<S: AsRef<str>>(&self, user_id: Uuid, bypass_roles: &[S]) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.id == user_id || identity.has_any_role(bypass_roles))
    }
}

impl ActorProvider for IdentityContext {
    fn current_actor_id(&self) -> Uuid {
        self.user_id()
    }
}
