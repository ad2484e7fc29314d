//! In-process document store.

use crate::store::{
    compare_values, DeleteOutcome, DocumentStore, Filter, InsertOutcome, Query, ReplaceOutcome, SortOrder, ID_KEY,
};
use anyhow::bail;
use atelier_core::Document;
use async_trait::async_trait;
use parking_lot::RwLock;
use shaku::Component;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// [`DocumentStore`] backed by a map of collections held in memory.
///
/// Identifiers under `id` are unique per collection.
#[derive(Component, Default)]
#[shaku(interface = DocumentStore)]
pub struct InMemoryDocumentStore {
    #[shaku(default)]
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    /// Snapshot of a collection in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections.read().get(collection).cloned().unwrap_or_default()
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collections = self.collections.read();
        f.debug_struct("InMemoryDocumentStore")
            .field("collections", &collections.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn sort_documents(documents: &mut [Document], key: &str, order: SortOrder) {
    // Documents without the key go last in either direction.
    documents.sort_by(|left, right| match (left.get_present(key), right.get_present(key)) {
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, collection: &str, document: Document) -> anyhow::Result<InsertOutcome> {
        let mut collections = self.collections.write();
        let documents = collections.entry(collection.to_string()).or_default();

        let inserted_id = document.get_present(ID_KEY).cloned();
        if let Some(id) = &inserted_id {
            if documents.iter().any(|existing| existing.get(ID_KEY) == Some(id)) {
                bail!("duplicate key in collection '{collection}': {ID_KEY} = {}", id.to_json());
            }
        }

        documents.push(document);
        debug!(collection, "Inserted document");
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> anyhow::Result<ReplaceOutcome> {
        let mut collections = self.collections.write();
        let documents = collections.entry(collection.to_string()).or_default();

        if let Some(slot) = documents.iter_mut().find(|existing| filter.matches(existing)) {
            *slot = document;
            debug!(collection, "Replaced document");
            return Ok(ReplaceOutcome {
                matched_count: 1,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(ReplaceOutcome::default());
        }

        let upserted_id = document.get_present(ID_KEY).cloned();
        documents.push(document);
        debug!(collection, "Upserted document");
        Ok(ReplaceOutcome {
            matched_count: 0,
            upserted_id,
        })
    }

    async fn delete(&self, collection: &str, filter: &Filter, many: bool) -> anyhow::Result<DeleteOutcome> {
        let mut collections = self.collections.write();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(DeleteOutcome::default());
        };

        let before = documents.len();
        if many {
            documents.retain(|document| !filter.matches(document));
        } else if let Some(index) = documents.iter().position(|document| filter.matches(document)) {
            documents.remove(index);
        }

        let deleted_count = (before - documents.len()) as u64;
        debug!(collection, deleted_count, "Deleted documents");
        Ok(DeleteOutcome { deleted_count })
    }

    async fn find(&self, collection: &str, query: &Query) -> anyhow::Result<Vec<Document>> {
        let collections = self.collections.read();
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| query.filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((key, order)) = &query.sort {
            sort_documents(&mut found, key, *order);
        }
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }
}
