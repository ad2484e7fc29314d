//! User role value object.

use crate::record_enum;

record_enum! {
    /// Roles granted to users. Stored on the user as plain text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum UserRole: text {
        /// Full access.
        Admin = "Admin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tags() {
        assert_eq!(UserRole::Admin.as_str(), "Admin");
        assert_eq!(UserRole::parse("Admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("admin"), None);
        assert_eq!(UserRole::ALL, &[UserRole::Admin]);
        assert_eq!(UserRole::Admin.to_string(), "Admin");
    }
}
