//! Domain entities.

mod auth;
mod image_generation;
mod user;

pub use auth::Auth;
pub use image_generation::ImageGeneration;
pub use user::{random_nine_digits, User};
