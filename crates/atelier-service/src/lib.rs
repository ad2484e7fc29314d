//! # Atelier Service
//!
//! Business logic service layer for Atelier: generic entity operations,
//! the user lifecycle, authentication and image generation.
//!
//! Every operation returns a [`ResultValue`](atelier_core::ResultValue);
//! errors raised inside an operation become failed results tagged with the
//! operation name.

pub mod auth_service;
pub mod clients;
pub mod di;
pub mod entity_service;
pub mod image_generation_service;
pub mod user_service;

pub use auth_service::*;
pub use clients::*;
pub use di::*;
pub use entity_service::EntityService;
pub use image_generation_service::ImageGenerationService;
pub use user_service::*;
