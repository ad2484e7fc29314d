//! Value objects.

mod identity;
mod image_ratio;
mod role;

pub use identity::UserIdentity;
pub use image_ratio::ImageRatio;
pub use role::UserRole;
