//! Generic commands and queries over one entity collection.

use crate::store::{DocumentStore, Filter, Query, CREATED_DATE_KEY, ID_KEY};
use atelier_core::{guarded, ActorProvider, Document, DomainError, DomainException, DomainResult, Entity, ResultValue};
use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Key of the owner reference on entities that have one.
pub const USER_ID_KEY: &str = "userId";

/// Persistence for entities of type `E`, stored in `E::collection_name()`.
///
/// Every operation returns a [`ResultValue`]; store errors surface as
/// `<Operation>-E00` failures.
pub struct EntityRepository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    actor: Arc<dyn ActorProvider>,
    collection: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            actor: Arc::clone(&self.actor),
            collection: self.collection.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> std::fmt::Debug for EntityRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRepository")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

pub(crate) fn hydrate<E: Entity>(documents: Vec<Document>) -> DomainResult<Vec<E>> {
    documents
        .iter()
        .map(|document| E::import(document).map_err(DomainException::from))
        .collect()
}

impl<E: Entity> EntityRepository<E> {
    /// Creates a repository stamping audit fields with `actor`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, actor: Arc<dyn ActorProvider>) -> Self {
        Self {
            store,
            actor,
            collection: E::collection_name(),
            _entity: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub(crate) fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    fn stamp(&self, entity: &mut E) {
        let report = entity.fill_audit_info(self.actor.as_ref());
        if !report.is_clean() {
            warn!(
                entity = E::type_name(),
                failures = report.failures.len(),
                "Audit info partially filled"
            );
        }
    }

    async fn find_all(&self, query: Query) -> anyhow::Result<Vec<E>> {
        let documents = self.store.find(&self.collection, &query).await?;
        Ok(hydrate(documents)?)
    }

    /// Stamps audit fields and inserts the entity.
    pub async fn add(&self, mut entity: E) -> ResultValue<E> {
        guarded("AddCommand", async move {
            self.stamp(&mut entity);
            debug!(collection = %self.collection, id = %entity.id(), "Adding entity");

            let outcome = self.store.insert_one(&self.collection, entity.export(false)).await?;
            if outcome.acknowledged && outcome.inserted_id.is_some() {
                Ok(ResultValue::success(entity))
            } else {
                Ok(ResultValue::failure(DomainError::new(
                    "AddCommand-E01",
                    format!("Failed to add {}", E::type_name()),
                )))
            }
        })
        .await
    }

    /// Stamps audit fields and replaces the stored entity, inserting it
    /// when it does not exist yet.
    pub async fn upsert_by_id(&self, mut entity: E) -> ResultValue<E> {
        guarded("UpsertByIdCommand", async move {
            self.stamp(&mut entity);
            debug!(collection = %self.collection, id = %entity.id(), "Upserting entity");

            let outcome = self
                .store
                .replace_one(&self.collection, &Filter::by_id(entity.id()), entity.export(false), true)
                .await?;
            if outcome.upserted_id.is_some() || outcome.matched_count > 0 {
                Ok(ResultValue::success(entity))
            } else {
                Ok(ResultValue::failure(DomainError::new(
                    "UpsertByIdCommand-E01",
                    format!("Failed to upsert {}", E::type_name()),
                )))
            }
        })
        .await
    }

    /// `true` when the entity was removed.
    pub async fn delete(&self, entity: &E) -> ResultValue<bool> {
        self.delete_by_id(entity.id()).await
    }

    pub async fn delete_by_id(&self, id: Uuid) -> ResultValue<bool> {
        guarded("DeleteCommand", async move {
            let outcome = self.store.delete(&self.collection, &Filter::by_id(id), false).await?;
            Ok(ResultValue::success(outcome.deleted_count > 0))
        })
        .await
    }

    /// `true` when at least one entity was removed.
    pub async fn delete_all(&self) -> ResultValue<bool> {
        guarded("DeleteAllCommand", async move {
            let outcome = self.store.delete(&self.collection, &Filter::All, true).await?;
            debug!(collection = %self.collection, deleted = outcome.deleted_count, "Deleted all entities");
            Ok(ResultValue::success(outcome.deleted_count > 0))
        })
        .await
    }

    pub async fn delete_many(&self, ids: &[Uuid]) -> ResultValue<bool> {
        guarded("DeleteManyCommand", async move {
            let filter = Filter::is_in(ID_KEY, ids.iter().copied());
            let outcome = self.store.delete(&self.collection, &filter, true).await?;
            Ok(ResultValue::success(outcome.deleted_count > 0))
        })
        .await
    }

    pub async fn get_all(&self) -> ResultValue<Vec<E>> {
        guarded("GetAllQuery", async move { Ok(ResultValue::success(self.find_all(Query::all()).await?)) }).await
    }

    /// Fails with `GetByIdQuery-E01` when nothing has the id.
    pub async fn get_by_id(&self, id: Uuid) -> ResultValue<E> {
        guarded("GetByIdQuery", async move {
            match self.store.find_one(&self.collection, &Filter::by_id(id)).await? {
                Some(document) => Ok(ResultValue::success(E::import(&document).map_err(DomainException::from)?)),
                None => Ok(ResultValue::failure(DomainError::new(
                    "GetByIdQuery-E01",
                    format!("Couldn't find {} by id.", E::type_name()),
                ))),
            }
        })
        .await
    }

    /// Entities whose id is in `ids`, in store order. Unknown ids are skipped.
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> ResultValue<Vec<E>> {
        guarded("GetByIdsQuery", async move {
            let query = Query::new(Filter::is_in(ID_KEY, ids.iter().copied()));
            Ok(ResultValue::success(self.find_all(query).await?))
        })
        .await
    }

    /// Entities created in `(start, end]`, newest first.
    pub async fn get_by_timespan(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ResultValue<Vec<E>> {
        guarded("GetByTimespanQuery", async move {
            let query = Query::new(Filter::Range {
                key: CREATED_DATE_KEY.to_string(),
                gt: Some(start.into()),
                lte: Some(end.into()),
            })
            .newest_first();
            Ok(ResultValue::success(self.find_all(query).await?))
        })
        .await
    }

    /// Entities owned by any of `user_ids`, newest first.
    ///
    /// Only meaningful for entities that store a `userId` field.
    pub async fn get_by_user_ids(&self, user_ids: &[Uuid]) -> ResultValue<Vec<E>> {
        guarded("GetByUserIdsQuery", async move {
            let query = Query::new(Filter::is_in(USER_ID_KEY, user_ids.iter().copied())).newest_first();
            Ok(ResultValue::success(self.find_all(query).await?))
        })
        .await
    }
}
