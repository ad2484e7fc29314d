//! Document store interface.
//!
//! A narrow, collection-oriented contract modelled on what a document
//! database driver offers: insert one, replace one (optionally upserting),
//! delete one or many, and filtered, sorted finds.

use atelier_core::{Document, Interface, Value};
use async_trait::async_trait;
use std::cmp::Ordering;
use uuid::Uuid;

/// Key under which every entity document stores its identifier.
pub const ID_KEY: &str = "id";

/// Document key holding the creation timestamp.
pub const CREATED_DATE_KEY: &str = "createdDate";

/// Selects documents in a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document.
    All,
    /// `key` equals the value.
    Eq(String, Value),
    /// `key` equals one of the values.
    In(String, Vec<Value>),
    /// `gt < key <= lte`, either bound optional.
    Range {
        key: String,
        gt: Option<Value>,
        lte: Option<Value>,
    },
    /// Every inner filter matches.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq(key.into(), value.into())
    }

    pub fn is_in<V: Into<Value>>(key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::In(key.into(), values.into_iter().map(Into::into).collect())
    }

    /// The document with the given identifier.
    pub fn by_id(id: Uuid) -> Self {
        Self::eq(ID_KEY, id)
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Eq(key, expected) => document.get(key).is_some_and(|value| value == expected),
            Self::In(key, candidates) => document
                .get(key)
                .is_some_and(|value| candidates.iter().any(|candidate| candidate == value)),
            Self::Range { key, gt, lte } => {
                let Some(value) = document.get_present(key) else {
                    return false;
                };
                let above = gt
                    .as_ref()
                    .map_or(true, |bound| compare_values(value, bound) == Some(Ordering::Greater));
                let below = lte.as_ref().map_or(true, |bound| {
                    matches!(compare_values(value, bound), Some(Ordering::Less | Ordering::Equal))
                });
                above && below
            }
            Self::And(filters) => filters.iter().all(|filter| filter.matches(document)),
        }
    }
}

/// Orders two values of comparable kinds. Mixed kinds are unordered,
/// except integers and floats.
#[allow(clippy::cast_precision_loss)]
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A filtered, optionally sorted and limited find.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub sort: Option<(String, SortOrder)>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub const fn new(filter: Filter) -> Self {
        Self {
            filter,
            sort: None,
            limit: None,
        }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self::new(Filter::All)
    }

    #[must_use]
    pub fn sort_by(mut self, key: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((key.into(), order));
        self
    }

    /// Newest first by creation date.
    #[must_use]
    pub fn newest_first(self) -> Self {
        self.sort_by(CREATED_DATE_KEY, SortOrder::Descending)
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of inserting one document.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: Option<Value>,
}

/// Result of replacing one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaceOutcome {
    pub matched_count: u64,
    /// Set when the replace inserted a new document.
    pub upserted_id: Option<Value>,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Document database collaborator.
///
/// Implementations report infrastructure failures as errors; callers turn
/// them into failed results at the operation boundary.
#[async_trait]
pub trait DocumentStore: Interface + Send + Sync {
    /// Inserts a new document.
    async fn insert_one(&self, collection: &str, document: Document) -> anyhow::Result<InsertOutcome>;

    /// Replaces the first document matching `filter`, inserting `document`
    /// when nothing matches and `upsert` is set.
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> anyhow::Result<ReplaceOutcome>;

    /// Deletes the first matching document, or all of them when `many`.
    async fn delete(&self, collection: &str, filter: &Filter, many: bool) -> anyhow::Result<DeleteOutcome>;

    async fn find(&self, collection: &str, query: &Query) -> anyhow::Result<Vec<Document>>;

    /// Returns the first document matching `filter`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> anyhow::Result<Option<Document>> {
        let query = Query::new(filter.clone()).limit(1);
        Ok(self.find(collection, &query).await?.into_iter().next())
    }
}
