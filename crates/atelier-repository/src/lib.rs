//! # Atelier Repository
//!
//! Persistence layering:
//!
//! ```text
//! Service
//!   ↓  EntityRepository<E>        (generic commands and queries)
//!   ↓  Arc<dyn DocumentStore>     (collaborator interface)
//! InMemoryDocumentStore / driver-backed store
//! ```
//!
//! Entities are written with native dates so range queries compare
//! timestamps, and read back through [`Record::import`].
//!
//! [`Record::import`]: atelier_core::Record::import

pub mod entity_repository;
pub mod memory;
pub mod store;
mod user_queries;

pub use entity_repository::{EntityRepository, USER_ID_KEY};
pub use memory::InMemoryDocumentStore;
pub use store::*;
