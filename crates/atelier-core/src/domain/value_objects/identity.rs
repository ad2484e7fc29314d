//! Decoded caller identity.

use crate::record;
use uuid::Uuid;

record! {
    /// Identity carried by an authenticated request.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct UserIdentity {
        pub id: Uuid => "id",
        pub roles: Vec<String> => "roles",
    }
}

impl UserIdentity {
    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles
            .iter()
            .any(|wanted| self.roles.iter().any(|role| role == wanted.as_ref()))
    }
}
