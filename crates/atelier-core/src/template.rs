//! Template synthesis: example documents describing a record's shape.

use crate::entity::AUDIT_FIELD_NAMES;
use crate::record::{ElementType, FieldType, RecordSchema};
use crate::{Document, Value};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Text form of [`template_date`].
pub const TEMPLATE_DATE_TEXT: &str = "2000-01-01T00:00:00";

/// Sample timestamp used in templates: 2000-01-01 00:00:00 UTC.
pub fn template_date() -> DateTime<Utc> {
    DateTime::from_timestamp(946_684_800, 0).unwrap_or_default()
}

/// Builds the template of a record type. Audit fields are left out.
///
/// In friendly mode UUIDs and timestamps are rendered as text.
pub fn synthesize(schema: &RecordSchema, friendly: bool) -> Document {
    schema
        .fields
        .iter()
        .filter(|field| !AUDIT_FIELD_NAMES.contains(&field.name))
        .map(|field| (field.name.to_string(), field_template(&field.field_type, friendly)))
        .collect()
}

fn field_template(field_type: &FieldType, friendly: bool) -> Value {
    match field_type {
        FieldType::List(element) => Value::List(vec![element_template(element, friendly)]),
        FieldType::Record(schema) => Value::Document(synthesize(schema(), friendly)),
        FieldType::Int => Value::Int(0),
        FieldType::Text => Value::Text(String::new()),
        FieldType::Float => Value::Float(0.0),
        FieldType::Uuid if friendly => Value::Text(Uuid::nil().to_string()),
        FieldType::Uuid => Value::Uuid(Uuid::nil()),
        FieldType::DateTime if friendly => Value::Text(TEMPLATE_DATE_TEXT.to_string()),
        FieldType::DateTime => Value::DateTime(template_date()),
        other if names_a_type_or_enum(other.type_name()) => Value::Int(0),
        _ => Value::Null,
    }
}

fn element_template(element: &ElementType, friendly: bool) -> Value {
    match element {
        ElementType::Record(schema) => Value::Document(synthesize(schema(), friendly)),
        ElementType::Int | ElementType::Float => Value::Int(0),
        _ => Value::Text(String::new()),
    }
}

fn names_a_type_or_enum(type_name: &str) -> bool {
    let lowered = type_name.to_lowercase();
    lowered.contains("type") || lowered.contains("enum")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity, record, record_enum, Record};

    record_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum PaymentType: text {
            Card = "card",
            Cash = "cash",
        }
    }

    record_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Mood: text {
            Calm = "calm",
        }
    }

    record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Line {
            pub sku: String => "sku",
            pub quantity: i64 => "quantity",
        }
    }

    entity! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Order {
            pub lines: Vec<Line> => "lines",
            pub amounts: Vec<f64> => "amounts",
            pub notes: Vec<String> => "notes",
            pub shipping: Line => "shipping",
            pub total: f64 => "total",
            pub customer_id: Option<Uuid> => "customerId",
            pub due: DateTime<Utc> => "due",
            pub paid: bool => "paid",
            pub payment: PaymentType => "payment",
            pub mood: Mood => "mood",
        }
    }

    #[test]
    fn test_template_omits_audit_fields() {
        let template = Order::template(false);
        for name in AUDIT_FIELD_NAMES {
            assert!(!template.contains_key(name), "{name} should be omitted");
        }
        assert_eq!(template.len(), 10);
    }

    #[test]
    fn test_template_values() {
        let template = Order::template(false);
        assert_eq!(
            template.get("lines"),
            Some(&Value::List(vec![Value::Document(Line::template(false))]))
        );
        assert_eq!(template.get("amounts"), Some(&Value::List(vec![Value::Int(0)])));
        assert_eq!(template.get("notes"), Some(&Value::List(vec![Value::from("")])));
        assert_eq!(template.get("total"), Some(&Value::Float(0.0)));
        assert_eq!(template.get("customerId"), Some(&Value::Uuid(Uuid::nil())));
        assert_eq!(template.get("due"), Some(&Value::DateTime(template_date())));
        assert_eq!(template.get("paid"), Some(&Value::Null));
        assert_eq!(template.get("payment"), Some(&Value::Int(0)));
        assert_eq!(template.get("mood"), Some(&Value::Null));
    }

    #[test]
    fn test_nested_record_template() {
        let template = Order::template(false);
        let Some(Value::Document(shipping)) = template.get("shipping") else {
            panic!("shipping should be a document");
        };
        assert_eq!(shipping.get("sku"), Some(&Value::from("")));
        assert_eq!(shipping.get("quantity"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_friendly_template_uses_text() {
        let template = Order::template(true);
        assert_eq!(
            template.get("customerId"),
            Some(&Value::from("00000000-0000-0000-0000-000000000000"))
        );
        assert_eq!(template.get("due"), Some(&Value::from("2000-01-01T00:00:00")));
    }

    #[test]
    fn test_template_is_deterministic() {
        assert_eq!(Order::template(true), Order::template(true));
    }
}
