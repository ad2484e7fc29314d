//! Entities: records with an identity and an audit trail.

use crate::naming::{camel_to_kebab, lower_first, plural};
use crate::record::Record;
use crate::{ActorProvider, DomainError};
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

/// Document keys of the audit fields, in export order.
pub const AUDIT_FIELD_NAMES: [&str; 5] = ["id", "createdDate", "createdBy", "updatedDate", "updatedBy"];

/// Identity and audit trail shared by every entity.
///
/// A nil `id` means the entity has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditInfo {
    pub id: Uuid,
    pub created_date: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub updated_date: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}

impl AuditInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(id: Uuid) -> Self {
        Self { id, ..Self::default() }
    }

    pub fn is_assigned(&self) -> bool {
        !self.id.is_nil()
    }

    fn stamp(&mut self, now: DateTime<Utc>, actor_id: Uuid) {
        if self.id.is_nil() {
            self.id = Uuid::now_v7();
        }
        self.created_date.get_or_insert(now);
        // createdBy follows the latest writer, unlike createdDate.
        self.created_by = Some(actor_id);
        self.updated_date = Some(now);
        self.updated_by = Some(actor_id);
    }

    fn check_chronology(&self, type_name: &str) -> Result<(), DomainError> {
        match (self.created_date, self.updated_date) {
            (Some(created), Some(updated)) if created > updated => Err(DomainError::validation(
                "EntityBase-FillAuditInfo-E01",
                format!("{type_name} {} was created after it was last updated.", self.id),
            )),
            _ => Ok(()),
        }
    }
}

/// Outcome of a fill, including failures swallowed along the way.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    /// Number of entities stamped, the root included.
    pub stamped: usize,
    pub failures: Vec<DomainError>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Object-safe handle on an entity, used to cascade fills into nested fields.
pub trait AuditTarget {
    fn audit_type_name(&self) -> &'static str;

    /// Stamps this node and its nested entities.
    ///
    /// # Errors
    ///
    /// Returns this node's own failure; nested failures go into `report`.
    fn fill_node(&mut self, now: DateTime<Utc>, actor_id: Uuid, report: &mut AuditReport) -> Result<(), DomainError>;
}

impl<E: Entity> AuditTarget for E {
    fn audit_type_name(&self) -> &'static str {
        E::type_name()
    }

    fn fill_node(&mut self, now: DateTime<Utc>, actor_id: Uuid, report: &mut AuditReport) -> Result<(), DomainError> {
        self.audit_mut().stamp(now, actor_id);
        report.stamped += 1;

        self.visit_fields_mut(&mut |_name: &'static str, field: &mut dyn crate::FieldExport| {
            field.visit_entities(&mut |nested: &mut dyn AuditTarget| {
                if let Err(err) = nested.fill_node(now, actor_id, report) {
                    warn!(
                        entity = nested.audit_type_name(),
                        error_code = %err.error_code,
                        "Failed to fill nested audit info"
                    );
                    report.failures.push(err);
                }
            });
        });

        self.audit().check_chronology(E::type_name())
    }
}

/// A record with identity and audit fields, persisted in its own collection.
pub trait Entity: Record {
    fn audit(&self) -> &AuditInfo;

    fn audit_mut(&mut self) -> &mut AuditInfo;

    fn id(&self) -> Uuid {
        self.audit().id
    }

    /// `ImageGeneration` is stored in `imageGenerations`.
    fn collection_name() -> String {
        plural(&lower_first(Self::type_name()))
    }

    /// `ImageGeneration` is served under `/image-generations`.
    fn route_prefix() -> String {
        format!("/{}", camel_to_kebab(&plural(Self::type_name())))
    }

    /// Stamps audit fields on this entity and every nested entity.
    fn fill_audit_info(&mut self, actor: &dyn ActorProvider) -> AuditReport {
        self.fill_audit_info_at(Utc::now(), actor.current_actor_id())
    }

    /// Like [`Entity::fill_audit_info`] with an explicit clock and actor.
    ///
    /// Never fails: a node that cannot be filled is logged and recorded in
    /// the report, and the traversal continues.
    fn fill_audit_info_at(&mut self, now: DateTime<Utc>, actor_id: Uuid) -> AuditReport {
        let mut report = AuditReport::default();
        if let Err(err) = self.fill_node(now, actor_id, &mut report) {
            warn!(entity = Self::type_name(), error_code = %err.error_code, "Failed to fill audit info");
            report.failures.push(err);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document, entity, record, FixedActor, Value};
    use chrono::Duration;

    entity! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Thing {
            pub name: String => "name",
        }
    }

    entity! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Category {
            pub title: String => "title",
            pub featured: Option<Thing> => "featured",
            pub things: Vec<Thing> => "things",
            pub note: Note => "note",
        }
    }

    record! {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Note {
            pub text: String => "text",
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
    }

    fn thing(name: &str) -> Thing {
        Thing { audit: AuditInfo::new(), name: name.into() }
    }

    #[test]
    fn test_collection_and_route_names() {
        assert_eq!(Thing::collection_name(), "things");
        assert_eq!(Category::collection_name(), "categories");
        assert_eq!(Category::route_prefix(), "/categories");
    }

    #[test]
    fn test_fill_new_entity() {
        let actor = Uuid::now_v7();
        let mut item = thing("x");
        let report = item.fill_audit_info_at(at(0), actor);

        assert!(report.is_clean());
        assert_eq!(report.stamped, 1);
        assert!(!item.id().is_nil());
        assert_eq!(item.audit.created_date, Some(at(0)));
        assert_eq!(item.audit.created_by, Some(actor));
        assert_eq!(item.audit.updated_date, Some(at(0)));
        assert_eq!(item.audit.updated_by, Some(actor));
    }

    #[test]
    fn test_fill_keeps_id_and_created_date() {
        let first = Uuid::now_v7();
        let second = Uuid::now_v7();
        let mut item = thing("x");
        item.fill_audit_info_at(at(0), first);
        let id = item.id();

        item.fill_audit_info_at(at(60), second);
        assert_eq!(item.id(), id);
        assert_eq!(item.audit.created_date, Some(at(0)));
        assert_eq!(item.audit.created_by, Some(second));
        assert_eq!(item.audit.updated_date, Some(at(60)));
        assert_eq!(item.audit.updated_by, Some(second));
    }

    #[test]
    fn test_fill_with_anonymous_actor() {
        let mut item = thing("x");
        item.fill_audit_info(&crate::AnonymousActor);
        assert_eq!(item.audit.created_by, Some(Uuid::nil()));
    }

    #[test]
    fn test_fill_cascades_into_nested_entities() {
        let actor = Uuid::now_v7();
        let mut category = Category {
            audit: AuditInfo::new(),
            title: "tools".into(),
            featured: Some(thing("hammer")),
            things: vec![thing("saw"), thing("drill")],
            note: Note { text: "n".into() },
        };

        let report = category.fill_audit_info(&FixedActor(actor));
        assert!(report.is_clean());
        assert_eq!(report.stamped, 4);
        assert!(!category.featured.as_ref().unwrap().id().is_nil());
        for nested in &category.things {
            assert!(!nested.id().is_nil());
            assert_eq!(nested.audit.updated_by, Some(actor));
        }
    }

    #[test]
    fn test_failed_node_does_not_stop_traversal() {
        let mut broken = thing("future");
        broken.audit = AuditInfo {
            id: Uuid::now_v7(),
            created_date: Some(at(3600)),
            ..AuditInfo::default()
        };
        let mut category = Category {
            audit: AuditInfo::new(),
            title: "tools".into(),
            featured: None,
            things: vec![broken, thing("saw")],
            note: Note { text: String::new() },
        };

        let report = category.fill_audit_info_at(at(0), Uuid::nil());
        assert_eq!(report.stamped, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error_code, "EntityBase-FillAuditInfo-E01");
        assert!(!category.things[1].id().is_nil());
        assert_eq!(category.audit.updated_date, Some(at(0)));
    }

    #[test]
    fn test_export_puts_audit_fields_first() {
        let mut item = thing("x");
        item.fill_audit_info_at(at(0), Uuid::nil());
        let doc = item.export(false);
        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["id", "createdDate", "createdBy", "updatedDate", "updatedBy", "name"]);
        assert_eq!(doc.get("createdDate"), Some(&Value::DateTime(at(0))));
    }

    #[test]
    fn test_entity_round_trip() {
        let mut category = Category {
            audit: AuditInfo::new(),
            title: "tools".into(),
            featured: Some(thing("hammer")),
            things: vec![thing("saw")],
            note: Note { text: "n".into() },
        };
        category.fill_audit_info_at(at(0) + Duration::milliseconds(250), Uuid::now_v7());

        let restored = Category::import(&category.export(true)).unwrap();
        assert_eq!(restored, category);
    }

    #[test]
    fn test_import_scenario_unassigned_entity() {
        let mut item = Thing::import(&document! {
            "id" => Uuid::nil(),
            "createdDate" => Value::Null,
            "name" => "x",
        })
        .unwrap();
        assert!(!item.audit.is_assigned());

        let actor = Uuid::now_v7();
        item.fill_audit_info_at(at(5), actor);
        assert!(item.audit.is_assigned());
        assert_eq!(item.audit.created_date, Some(at(5)));
        assert_eq!(item.audit.created_by, Some(actor));
        assert_eq!(item.audit.updated_date, Some(at(5)));
        assert_eq!(item.audit.updated_by, Some(actor));
    }
}
