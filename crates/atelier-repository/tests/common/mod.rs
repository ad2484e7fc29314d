//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use anyhow::bail;
use atelier_core::{entity, AuditInfo, Document, FixedActor};
use atelier_repository::{
    DeleteOutcome, DocumentStore, EntityRepository, Filter, InMemoryDocumentStore, InsertOutcome, Query,
    ReplaceOutcome,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

entity! {
    /// Entity owned by a user.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Task {
        pub title: String => "title",
        pub user_id: Uuid => "userId",
    }
}

impl Task {
    pub fn new(title: &str, user_id: Uuid) -> Self {
        Self {
            audit: AuditInfo::new(),
            title: title.to_string(),
            user_id,
        }
    }
}

/// Repository over a fresh in-memory store.
pub struct TestStore {
    pub store: Arc<InMemoryDocumentStore>,
    pub actor_id: Uuid,
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            actor_id: Uuid::now_v7(),
        }
    }

    pub fn repository<E: atelier_core::Entity>(&self) -> EntityRepository<E> {
        let store: Arc<dyn DocumentStore> = self.store.clone();
        EntityRepository::new(store, Arc::new(FixedActor(self.actor_id)))
    }
}

/// Store whose every call fails, standing in for a lost connection.
pub struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn insert_one(&self, _collection: &str, _document: Document) -> anyhow::Result<InsertOutcome> {
        bail!("connection refused")
    }

    async fn replace_one(
        &self,
        _collection: &str,
        _filter: &Filter,
        _document: Document,
        _upsert: bool,
    ) -> anyhow::Result<ReplaceOutcome> {
        bail!("connection refused")
    }

    async fn delete(&self, _collection: &str, _filter: &Filter, _many: bool) -> anyhow::Result<DeleteOutcome> {
        bail!("connection refused")
    }

    async fn find(&self, _collection: &str, _query: &Query) -> anyhow::Result<Vec<Document>> {
        bail!("connection refused")
    }
}

/// Store that accepts calls but never acknowledges a write.
pub struct UnacknowledgedStore;

#[async_trait]
impl DocumentStore for UnacknowledgedStore {
    async fn insert_one(&self, _collection: &str, _document: Document) -> anyhow::Result<InsertOutcome> {
        Ok(InsertOutcome {
            acknowledged: false,
            inserted_id: None,
        })
    }

    async fn replace_one(
        &self,
        _collection: &str,
        _filter: &Filter,
        _document: Document,
        _upsert: bool,
    ) -> anyhow::Result<ReplaceOutcome> {
        Ok(ReplaceOutcome::default())
    }

    async fn delete(&self, _collection: &str, _filter: &Filter, _many: bool) -> anyhow::Result<DeleteOutcome> {
        Ok(DeleteOutcome::default())
    }

    async fn find(&self, _collection: &str, _query: &Query) -> anyhow::Result<Vec<Document>> {
        Ok(Vec::new())
    }
}

pub fn repository_over<E: atelier_core::Entity>(store: impl DocumentStore + 'static) -> EntityRepository<E> {
    EntityRepository::new(Arc::new(store), Arc::new(FixedActor(Uuid::now_v7())))
}
