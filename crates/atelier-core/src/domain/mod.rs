//! Domain records, entities and value objects.

pub mod dto;
pub mod entities;
pub mod value_objects;

pub use dto::*;
pub use entities::*;
pub use value_objects::*;
