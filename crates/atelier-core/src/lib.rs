//! # Atelier Core
//!
//! Core types, traits, and error definitions for Atelier.
//! This crate provides the result container, the domain error types, the
//! generic record engine and the domain records shared by every layer.

mod macros;

pub mod boundary;
pub mod document;
pub mod domain;
pub mod entity;
pub mod error;
pub mod naming;
pub mod record;
pub mod result;
pub mod telemetry;
pub mod template;
pub mod traits;

pub use boundary::{guarded, guarded_sync};
pub use document::{Document, Value};
pub use entity::{AuditInfo, AuditReport, AuditTarget, Entity};
pub use error::*;
pub use record::{
    CoercionResult, ElementType, FieldDescriptor, FieldExport, FieldType, FieldValue, ListElement, Record,
    RecordSchema,
};
pub use result::*;
pub use traits::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
