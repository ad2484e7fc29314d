//! # Atelier Security
//!
//! Password hashing, the caller identity of a request, and role checks.

pub mod identity;
pub mod password;
pub mod roles;

pub use identity::*;
pub use password::*;
pub use roles::*;
