//! Credential entity.

use crate::entity;

entity! {
    /// Username and password pair submitted for authentication.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Auth {
        pub username: String => "username",
        pub password: String => "password",
    }

    impl {
        fn private_fields() -> &'static [&'static str] {
            &["password"]
        }
    }
}
