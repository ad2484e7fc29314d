//! Declarative macros that generate record, entity and enumeration types
//! together with their static field tables.

/// Declares a record type and implements [`Record`](crate::Record) for it.
///
/// Each field names its document key after `=>`. Extra `Record` items
/// (computed properties, private fields) go in a trailing `impl { .. }` block.
///
/// ```
/// use atelier_core::{record, Record};
///
/// record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct StringDto {
///         pub value: String => "value",
///     }
/// }
///
/// let dto = StringDto { value: "x".into() };
/// assert_eq!(StringDto::import(&dto.export(true)).unwrap(), dto);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty => $key:literal
            ),* $(,)?
        }
        $(
            impl { $($extra:tt)* }
        )?
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn schema() -> &'static $crate::RecordSchema {
                static SCHEMA: $crate::RecordSchema = $crate::RecordSchema {
                    type_name: stringify!($name),
                    fields: &[
                        $( $crate::__field_descriptor!($ty, $key), )*
                    ],
                };
                &SCHEMA
            }

            #[allow(unused_variables)]
            fn visit_fields(&self, visitor: &mut dyn FnMut(&'static str, &dyn $crate::FieldExport)) {
                $( visitor($key, &self.$field); )*
            }

            #[allow(unused_variables)]
            fn visit_fields_mut(&mut self, visitor: &mut dyn FnMut(&'static str, &mut dyn $crate::FieldExport)) {
                $( visitor($key, &mut self.$field); )*
            }

            #[allow(unused_variables)]
            fn import(document: &$crate::Document) -> ::std::result::Result<Self, $crate::DomainError> {
                ::std::result::Result::Ok(Self {
                    $( $field: $crate::record::import_field::<$ty>(document, $key)?, )*
                })
            }

            $( $($extra)* )?
        }

        impl $crate::FieldExport for $name {
            fn export_value(&self, safe_dates: bool) -> $crate::Value {
                $crate::Value::Document($crate::Record::export(self, safe_dates))
            }
        }

        $crate::__record_field_value!(
            $name,
            $name { $( $field: <$ty as $crate::FieldValue>::absent(), )* }
        );
    };
}

/// Declares an entity type: a record with a leading `audit` field holding
/// the identity and audit trail, exported as the flat keys `id`,
/// `createdDate`, `createdBy`, `updatedDate` and `updatedBy`.
///
/// Nested entity fields (plain, optional or lists) are filled together with
/// their parent by [`Entity::fill_audit_info`](crate::Entity::fill_audit_info).
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty => $key:literal
            ),* $(,)?
        }
        $(
            impl { $($extra:tt)* }
        )?
    ) => {
        $(#[$meta])*
        $vis struct $name {
            /// Identity and audit trail.
            pub audit: $crate::AuditInfo,
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn schema() -> &'static $crate::RecordSchema {
                static SCHEMA: $crate::RecordSchema = $crate::RecordSchema {
                    type_name: stringify!($name),
                    fields: &[
                        $crate::FieldDescriptor { name: "id", field_type: $crate::FieldType::Uuid, optional: false },
                        $crate::FieldDescriptor { name: "createdDate", field_type: $crate::FieldType::DateTime, optional: true },
                        $crate::FieldDescriptor { name: "createdBy", field_type: $crate::FieldType::Uuid, optional: true },
                        $crate::FieldDescriptor { name: "updatedDate", field_type: $crate::FieldType::DateTime, optional: true },
                        $crate::FieldDescriptor { name: "updatedBy", field_type: $crate::FieldType::Uuid, optional: true },
                        $( $crate::__field_descriptor!($ty, $key), )*
                    ],
                };
                &SCHEMA
            }

            fn visit_fields(&self, visitor: &mut dyn FnMut(&'static str, &dyn $crate::FieldExport)) {
                visitor("id", &self.audit.id);
                visitor("createdDate", &self.audit.created_date);
                visitor("createdBy", &self.audit.created_by);
                visitor("updatedDate", &self.audit.updated_date);
                visitor("updatedBy", &self.audit.updated_by);
                $( visitor($key, &self.$field); )*
            }

            fn visit_fields_mut(&mut self, visitor: &mut dyn FnMut(&'static str, &mut dyn $crate::FieldExport)) {
                visitor("id", &mut self.audit.id);
                visitor("createdDate", &mut self.audit.created_date);
                visitor("createdBy", &mut self.audit.created_by);
                visitor("updatedDate", &mut self.audit.updated_date);
                visitor("updatedBy", &mut self.audit.updated_by);
                $( visitor($key, &mut self.$field); )*
            }

            fn import(document: &$crate::Document) -> ::std::result::Result<Self, $crate::DomainError> {
                ::std::result::Result::Ok(Self {
                    audit: $crate::AuditInfo {
                        id: $crate::record::import_field(document, "id")?,
                        created_date: $crate::record::import_field(document, "createdDate")?,
                        created_by: $crate::record::import_field(document, "createdBy")?,
                        updated_date: $crate::record::import_field(document, "updatedDate")?,
                        updated_by: $crate::record::import_field(document, "updatedBy")?,
                    },
                    $( $field: $crate::record::import_field::<$ty>(document, $key)?, )*
                })
            }

            $( $($extra)* )?
        }

        impl $crate::Entity for $name {
            fn audit(&self) -> &$crate::AuditInfo {
                &self.audit
            }

            fn audit_mut(&mut self) -> &mut $crate::AuditInfo {
                &mut self.audit
            }
        }

        impl $crate::FieldExport for $name {
            fn export_value(&self, safe_dates: bool) -> $crate::Value {
                $crate::Value::Document($crate::Record::export(self, safe_dates))
            }

            fn visit_entities(&mut self, visitor: &mut dyn FnMut(&mut dyn $crate::AuditTarget)) {
                visitor(self);
            }
        }

        $crate::__record_field_value!(
            $name,
            $name {
                audit: $crate::AuditInfo::default(),
                $( $field: <$ty as $crate::FieldValue>::absent(), )*
            }
        );
    };
}

/// Declares a text- or integer-backed enumeration usable as a record field.
///
/// The first variant is the zero value and the `Default`; `Default` is
/// derived by the macro.
///
/// ```
/// use atelier_core::record_enum;
///
/// record_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Shade: text {
///         Light = "light",
///         Dark = "dark",
///     }
/// }
///
/// assert_eq!(Shade::parse("dark"), Some(Shade::Dark));
/// assert_eq!(Shade::default(), Shade::Light);
/// ```
#[macro_export]
macro_rules! record_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : text {
            $(#[$first_meta:meta])*
            $first:ident = $first_tag:literal
            $(
                ,
                $(#[$variant_meta:meta])*
                $variant:ident = $tag:literal
            )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis enum $name {
            $(#[$first_meta])*
            #[default]
            $first,
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[Self::$first $(, Self::$variant)*];

            /// Stored tag of the variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    Self::$first => $first_tag,
                    $( Self::$variant => $tag, )*
                }
            }

            /// Looks a variant up by its stored tag.
            pub fn parse(tag: &str) -> ::std::option::Option<Self> {
                match tag {
                    $first_tag => ::std::option::Option::Some(Self::$first),
                    $( $tag => ::std::option::Option::Some(Self::$variant), )*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::FieldExport for $name {
            fn export_value(&self, _safe_dates: bool) -> $crate::Value {
                $crate::Value::Text(self.as_str().to_string())
            }
        }

        impl $crate::FieldValue for $name {
            const FIELD_TYPE: $crate::FieldType = $crate::FieldType::Enum(stringify!($name));

            fn import_value(value: &$crate::Value) -> $crate::CoercionResult<Self> {
                match value {
                    $crate::Value::Text(tag) => Self::parse(tag)
                        .ok_or_else(|| format!("unknown {} tag '{}'", stringify!($name), tag)),
                    other => ::std::result::Result::Err(format!("expected text, found {}", other.kind())),
                }
            }

            fn absent() -> Self {
                Self::$first
            }
        }

        $crate::__enum_common!($name);
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : int {
            $(#[$first_meta:meta])*
            $first:ident = $first_tag:literal
            $(
                ,
                $(#[$variant_meta:meta])*
                $variant:ident = $tag:literal
            )* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis enum $name {
            $(#[$first_meta])*
            #[default]
            $first,
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[Self::$first $(, Self::$variant)*];

            /// Stored number of the variant.
            pub const fn value(&self) -> i64 {
                match self {
                    Self::$first => $first_tag,
                    $( Self::$variant => $tag, )*
                }
            }

            /// Looks a variant up by its stored number.
            pub const fn from_value(value: i64) -> ::std::option::Option<Self> {
                match value {
                    $first_tag => ::std::option::Option::Some(Self::$first),
                    $( $tag => ::std::option::Option::Some(Self::$variant), )*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.value())
            }
        }

        impl $crate::FieldExport for $name {
            fn export_value(&self, _safe_dates: bool) -> $crate::Value {
                $crate::Value::Int(self.value())
            }
        }

        impl $crate::FieldValue for $name {
            const FIELD_TYPE: $crate::FieldType = $crate::FieldType::Enum(stringify!($name));

            fn import_value(value: &$crate::Value) -> $crate::CoercionResult<Self> {
                match value {
                    $crate::Value::Int(number) => Self::from_value(*number)
                        .ok_or_else(|| format!("unknown {} value {}", stringify!($name), number)),
                    other => ::std::result::Result::Err(format!("expected int, found {}", other.kind())),
                }
            }

            fn absent() -> Self {
                Self::$first
            }
        }

        $crate::__enum_common!($name);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_descriptor {
    ($ty:ty, $key:literal) => {
        $crate::FieldDescriptor {
            name: $key,
            field_type: <$ty as $crate::FieldValue>::FIELD_TYPE,
            optional: <$ty as $crate::FieldValue>::OPTIONAL,
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_field_value {
    ($name:ident, $absent:expr) => {
        impl $crate::FieldValue for $name {
            const FIELD_TYPE: $crate::FieldType = $crate::FieldType::Record(<$name as $crate::Record>::schema);

            fn import_value(value: &$crate::Value) -> $crate::CoercionResult<Self> {
                match value {
                    $crate::Value::Document(document) => {
                        <$name as $crate::Record>::import(document).map_err(|err| err.message)
                    }
                    other => ::std::result::Result::Err(format!("expected document, found {}", other.kind())),
                }
            }

            fn absent() -> Self {
                $absent
            }
        }

        impl $crate::ListElement for $name {
            const ELEMENT_TYPE: $crate::ElementType = $crate::ElementType::Record(<$name as $crate::Record>::schema);
        }

        impl $crate::ResponseBody for $name {
            fn into_response_body(self) -> $crate::__private::serde_json::Value {
                $crate::record::response_body(&self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __enum_common {
    ($name:ident) => {
        impl $crate::ListElement for $name {
            const ELEMENT_TYPE: $crate::ElementType = $crate::ElementType::Enum(stringify!($name));
        }

        impl $crate::ResponseBody for $name {
            fn into_response_body(self) -> $crate::__private::serde_json::Value {
                $crate::FieldExport::export_value(&self, true).to_json()
            }
        }
    };
}
