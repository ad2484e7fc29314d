//! Generic record engine: export to documents, import from documents.
//!
//! Every record type carries a static [`RecordSchema`] generated by the
//! [`record!`](crate::record!) or [`entity!`](crate::entity!) macro. The schema
//! drives template synthesis; per-field coercion goes through [`FieldValue`].

use crate::entity::AuditTarget;
use crate::{Document, DomainError, Value};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Returns the schema of a record type.
pub type SchemaFn = fn() -> &'static RecordSchema;

/// Declared type of a list element.
#[derive(Debug, Clone, Copy)]
pub enum ElementType {
    Int,
    Float,
    Text,
    Bool,
    Uuid,
    DateTime,
    Enum(&'static str),
    Record(SchemaFn),
    Any,
}

/// Declared type of a field. Optional wrappers are described by
/// [`FieldDescriptor::optional`], not here.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Int,
    Float,
    Text,
    Bool,
    Uuid,
    DateTime,
    Enum(&'static str),
    Record(SchemaFn),
    List(ElementType),
    Any,
}

impl FieldType {
    /// Name of the declared type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "str",
            Self::Bool => "bool",
            Self::Uuid => "UUID",
            Self::DateTime => "datetime",
            Self::Enum(name) => name,
            Self::Record(schema) => schema().type_name,
            Self::List(_) => "list",
            Self::Any => "Any",
        }
    }
}

/// One row of a record's field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Document key.
    pub name: &'static str,
    pub field_type: FieldType,
    pub optional: bool,
}

/// Static description of a record type.
#[derive(Debug)]
pub struct RecordSchema {
    pub type_name: &'static str,
    /// Declared fields in declaration order.
    pub fields: &'static [FieldDescriptor],
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Reason a value could not be coerced into a field.
pub type CoercionResult<T> = Result<T, String>;

fn mismatch<T>(expected: &str, found: &Value) -> CoercionResult<T> {
    Err(format!("expected {expected}, found {}", found.kind()))
}

/// Object-safe half of a field: export and entity traversal.
pub trait FieldExport {
    fn export_value(&self, safe_dates: bool) -> Value;

    /// Calls `visitor` for every entity held directly by this field.
    fn visit_entities(&mut self, _visitor: &mut dyn FnMut(&mut dyn AuditTarget)) {}
}

/// A type usable as a record field.
pub trait FieldValue: FieldExport + Sized {
    const FIELD_TYPE: FieldType;
    const OPTIONAL: bool = false;

    /// Coerces a non-null document value.
    fn import_value(value: &Value) -> CoercionResult<Self>;

    /// Value used when the document has no entry (or null) for the field.
    fn absent() -> Self;
}

/// A type usable as a list element.
pub trait ListElement: FieldValue {
    const ELEMENT_TYPE: ElementType;
}

/// A typed record with a document contract.
pub trait Record: Sized + Send + Sync + 'static {
    fn schema() -> &'static RecordSchema;

    /// Calls `visitor` with each declared field in declaration order.
    fn visit_fields(&self, visitor: &mut dyn FnMut(&'static str, &dyn FieldExport));

    fn visit_fields_mut(&mut self, visitor: &mut dyn FnMut(&'static str, &mut dyn FieldExport));

    /// Builds a new instance from a document.
    ///
    /// # Errors
    ///
    /// `RecordBase-Import-E01` when a present value cannot be coerced.
    fn import(document: &Document) -> Result<Self, DomainError>;

    /// Derived values appended to the export after the declared fields.
    fn computed_properties(&self, _safe_dates: bool) -> Vec<(&'static str, Result<Value, DomainError>)> {
        Vec::new()
    }

    /// Fields stripped from response bodies.
    fn private_fields() -> &'static [&'static str] {
        &[]
    }

    fn type_name() -> &'static str {
        Self::schema().type_name
    }

    /// Exports the record into a document.
    fn export(&self, safe_dates: bool) -> Document {
        export_record(self, safe_dates)
    }

    /// Example document describing the shape of this record.
    fn template(friendly: bool) -> Document {
        crate::template::synthesize(Self::schema(), friendly)
    }
}

fn export_record<R: Record>(record: &R, safe_dates: bool) -> Document {
    let mut document = Document::with_capacity(R::schema().fields.len());
    record.visit_fields(&mut |name: &'static str, field: &dyn FieldExport| {
        document.insert(name, field.export_value(safe_dates));
    });

    for (name, computed) in record.computed_properties(safe_dates) {
        if R::schema().has_field(name) {
            continue;
        }
        match computed {
            Ok(value) => {
                document.insert(name, value);
            }
            Err(err) => debug!(
                record = R::type_name(),
                property = name,
                error_code = %err.error_code,
                "Skipping computed property"
            ),
        }
    }
    document
}

/// Imports one field from a document.
///
/// # Errors
///
/// `RecordBase-Import-E01` (400) naming the field.
pub fn import_field<T: FieldValue>(document: &Document, name: &str) -> Result<T, DomainError> {
    match document.get_present(name) {
        None => Ok(T::absent()),
        Some(value) => T::import_value(value).map_err(|reason| {
            DomainError::validation(
                "RecordBase-Import-E01",
                format!("Could not import field '{name}': {reason}"),
            )
        }),
    }
}

/// Response body of a record: exported with safe dates, private fields removed.
pub fn response_body<R: Record>(record: &R) -> serde_json::Value {
    let mut document = record.export(true);
    for name in R::private_fields() {
        document.remove(name);
    }
    document.to_json()
}

/// Parses a timestamp written by [`FieldExport::export_value`] or a naive ISO-8601 one.
pub fn parse_timestamp(text: &str) -> CoercionResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid timestamp '{text}': {err}"))
}

impl FieldExport for i64 {
    fn export_value(&self, _safe_dates: bool) -> Value {
        Value::Int(*self)
    }
}

impl FieldValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::Int;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        match value {
            Value::Int(number) => Ok(*number),
            #[allow(clippy::cast_possible_truncation)]
            Value::Float(number) if number.fract() == 0.0 => Ok(*number as i64),
            other => mismatch("int", other),
        }
    }

    fn absent() -> Self {
        0
    }
}

impl ListElement for i64 {
    const ELEMENT_TYPE: ElementType = ElementType::Int;
}

impl FieldExport for i32 {
    fn export_value(&self, _safe_dates: bool) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl FieldValue for i32 {
    const FIELD_TYPE: FieldType = FieldType::Int;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        let wide = i64::import_value(value)?;
        Self::try_from(wide).map_err(|_| format!("{wide} does not fit in a 32-bit integer"))
    }

    fn absent() -> Self {
        0
    }
}

impl ListElement for i32 {
    const ELEMENT_TYPE: ElementType = ElementType::Int;
}

impl FieldExport for f64 {
    fn export_value(&self, _safe_dates: bool) -> Value {
        Value::Float(*self)
    }
}

impl FieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        match value {
            Value::Float(number) => Ok(*number),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(number) => Ok(*number as f64),
            other => mismatch("float", other),
        }
    }

    fn absent() -> Self {
        0.0
    }
}

impl ListElement for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::Float;
}

impl FieldExport for String {
    fn export_value(&self, _safe_dates: bool) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        match value {
            Value::Text(text) => Ok(text.clone()),
            Value::Uuid(id) => Ok(id.to_string()),
            other => mismatch("text", other),
        }
    }

    fn absent() -> Self {
        Self::new()
    }
}

impl ListElement for String {
    const ELEMENT_TYPE: ElementType = ElementType::Text;
}

impl FieldExport for bool {
    fn export_value(&self, _safe_dates: bool) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        value.as_bool().map_or_else(|| mismatch("bool", value), Ok)
    }

    fn absent() -> Self {
        false
    }
}

impl ListElement for bool {
    const ELEMENT_TYPE: ElementType = ElementType::Bool;
}

impl FieldExport for Uuid {
    fn export_value(&self, _safe_dates: bool) -> Value {
        Value::Uuid(*self)
    }
}

impl FieldValue for Uuid {
    const FIELD_TYPE: FieldType = FieldType::Uuid;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        match value {
            Value::Uuid(id) => Ok(*id),
            // Unparseable text keeps the import going with the nil id.
            Value::Text(text) => Ok(Self::parse_str(text).unwrap_or_else(|err| {
                warn!(value = %text, error = %err, "Unparseable UUID text, using the nil UUID");
                Self::nil()
            })),
            other => mismatch("UUID", other),
        }
    }

    fn absent() -> Self {
        Self::nil()
    }
}

impl ListElement for Uuid {
    const ELEMENT_TYPE: ElementType = ElementType::Uuid;
}

impl FieldExport for DateTime<Utc> {
    fn export_value(&self, safe_dates: bool) -> Value {
        if safe_dates {
            Value::Text(self.to_rfc3339())
        } else {
            Value::DateTime(*self)
        }
    }
}

impl FieldValue for DateTime<Utc> {
    const FIELD_TYPE: FieldType = FieldType::DateTime;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        match value {
            Value::DateTime(at) => Ok(*at),
            Value::Text(text) => parse_timestamp(text),
            other => mismatch("datetime", other),
        }
    }

    fn absent() -> Self {
        Self::default()
    }
}

impl ListElement for DateTime<Utc> {
    const ELEMENT_TYPE: ElementType = ElementType::DateTime;
}

impl FieldExport for Value {
    fn export_value(&self, _safe_dates: bool) -> Value {
        self.clone()
    }
}

impl FieldValue for Value {
    const FIELD_TYPE: FieldType = FieldType::Any;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        Ok(value.clone())
    }

    fn absent() -> Self {
        Self::Null
    }
}

impl ListElement for Value {
    const ELEMENT_TYPE: ElementType = ElementType::Any;
}

impl<T: FieldValue> FieldExport for Option<T> {
    fn export_value(&self, safe_dates: bool) -> Value {
        self.as_ref()
            .map_or(Value::Null, |inner| inner.export_value(safe_dates))
    }

    fn visit_entities(&mut self, visitor: &mut dyn FnMut(&mut dyn AuditTarget)) {
        if let Some(inner) = self {
            inner.visit_entities(visitor);
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;
    const OPTIONAL: bool = true;

    fn import_value(value: &Value) -> CoercionResult<Self> {
        T::import_value(value).map(Some)
    }

    fn absent() -> Self {
        None
    }
}

impl<T: ListElement> FieldExport for Vec<T> {
    fn export_value(&self, safe_dates: bool) -> Value {
        Value::List(self.iter().map(|item| item.export_value(safe_dates)).collect())
    }

    fn visit_entities(&mut self, visitor: &mut dyn FnMut(&mut dyn AuditTarget)) {
        for item in self.iter_mut() {
            item.visit_entities(visitor);
        }
    }
}

impl<T: ListElement> FieldValue for Vec<T> {
    const FIELD_TYPE: FieldType = FieldType::List(T::ELEMENT_TYPE);

    fn import_value(value: &Value) -> CoercionResult<Self> {
        let Value::List(items) = value else {
            return mismatch("list", value);
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if item.is_null() {
                    Ok(T::absent())
                } else {
                    T::import_value(item).map_err(|reason| format!("element {index}: {reason}"))
                }
            })
            .collect()
    }

    fn absent() -> Self {
        Self::new()
    }
}
