//! User entity.

use crate::domain::value_objects::UserRole;
use crate::{entity, AuditInfo, DomainError, FieldExport, Value};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Random nine-digit number, used for guest names, salts and verification codes.
pub fn random_nine_digits() -> String {
    rand::thread_rng().gen_range(100_000_000..=999_999_999_u32).to_string()
}

entity! {
    /// A registered user or a guest.
    #[derive(Debug, Clone, PartialEq)]
    pub struct User {
        pub email: String => "email",
        pub username: String => "username",
        /// Hash of the password concatenated with `salt`.
        pub password: String => "password",
        pub roles: Vec<String> => "roles",
        pub profile_image_url: Option<String> => "profileImageUrl",
        pub salt: String => "salt",
        /// Hash of the pending verification code concatenated with `salt`.
        pub verification_hash: String => "verificationHash",
        pub verification_send_time: Option<DateTime<Utc>> => "verificationSendTime",
        pub is_guest: bool => "isGuest",
        pub is_verified: bool => "isVerified",
    }

    impl {
        fn computed_properties(&self, safe_dates: bool) -> Vec<(&'static str, Result<Value, DomainError>)> {
            vec![("isAdmin", Ok(self.is_admin().export_value(safe_dates)))]
        }

        fn private_fields() -> &'static [&'static str] {
            &["password", "salt", "verificationHash"]
        }
    }
}

impl User {
    /// Creates a guest with a random `user_NNNNNNNNN` name.
    ///
    /// `password_hash` must already be the hash of a password concatenated
    /// with `salt`.
    #[must_use]
    pub fn guest(salt: String, password_hash: String) -> Self {
        Self {
            audit: AuditInfo::new(),
            email: String::new(),
            username: format!("user_{}", random_nine_digits()),
            password: password_hash,
            roles: Vec::new(),
            profile_image_url: None,
            salt,
            verification_hash: String::new(),
            verification_send_time: None,
            is_guest: true,
            is_verified: false,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entity, Record};

    fn guest() -> User {
        User::guest("123456789".into(), "hash".into())
    }

    #[test]
    fn test_guest_defaults() {
        let user = guest();
        assert!(user.username.starts_with("user_"));
        assert_eq!(user.username.len(), "user_".len() + 9);
        assert!(user.is_guest);
        assert!(!user.is_verified);
        assert!(user.roles.is_empty());
        assert!(user.email.is_empty());
        assert!(user.profile_image_url.is_none());
        assert!(!user.audit.is_assigned());
    }

    #[test]
    fn test_random_nine_digits() {
        for _ in 0..20 {
            let digits = random_nine_digits();
            assert_eq!(digits.len(), 9);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_is_admin() {
        let mut user = guest();
        assert!(!user.is_admin());
        user.roles.push("Admin".into());
        assert!(user.is_admin());
    }

    #[test]
    fn test_collection_name() {
        assert_eq!(User::collection_name(), "users");
        assert_eq!(User::route_prefix(), "/users");
    }

    #[test]
    fn test_export_appends_is_admin() {
        let doc = guest().export(true);
        assert_eq!(doc.get("isAdmin"), Some(&Value::Bool(false)));
        assert_eq!(doc.keys().last(), Some("isAdmin"));
    }

    #[test]
    fn test_round_trip_ignores_computed_property() {
        let mut user = guest();
        user.fill_audit_info(&crate::AnonymousActor);
        assert_eq!(User::import(&user.export(true)).unwrap(), user);
    }

    #[test]
    fn test_response_strips_secrets() {
        let body = crate::ResultValue::success(guest()).to_response_or_not_found().unwrap();
        assert!(body.get("password").is_none());
        assert!(body.get("salt").is_none());
        assert!(body.get("verificationHash").is_none());
        assert_eq!(body["isGuest"], true);
        assert_eq!(body["isAdmin"], false);
    }
}
