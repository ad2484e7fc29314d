//! Service operations shared by every entity type.

use atelier_core::{guarded, DomainError, Entity, ResultValue};
use atelier_repository::EntityRepository;
use tracing::debug;
use uuid::Uuid;

/// Generic CRUD over one entity type.
///
/// Error codes are prefixed with the service name, `<Type>Service`.
pub struct EntityService<E: Entity> {
    repository: EntityRepository<E>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<E: Entity> std::fmt::Debug for EntityService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService").field("service", &Self::service_name()).finish()
    }
}

impl<E: Entity> EntityService<E> {
    #[must_use]
    pub const fn new(repository: EntityRepository<E>) -> Self {
        Self { repository }
    }

    /// `UserService` for `User`.
    pub fn service_name() -> String {
        format!("{}Service", E::type_name())
    }

    fn location(operation: &str) -> String {
        format!("{}-{operation}", Self::service_name())
    }

    pub const fn repository(&self) -> &EntityRepository<E> {
        &self.repository
    }

    pub async fn get_by_ids(&self, ids: &[Uuid]) -> ResultValue<Vec<E>> {
        guarded(&Self::location("GetByIds"), async move { Ok(self.repository.get_by_ids(ids).await) }).await
    }

    /// Fails with `<Type>Service-Get<Type>ById-E02` when nothing has the id.
    pub async fn get_by_id(&self, id: Uuid) -> ResultValue<E> {
        let operation = format!("Get{}ById", E::type_name());
        let location = Self::location(&operation);
        guarded(&location, async {
            debug!(entity = E::type_name(), %id, "Getting entity by id");
            let found = self.repository.get_by_ids(&[id]).await.value_or_raise(None)?;
            match found.into_iter().next() {
                Some(entity) => Ok(ResultValue::success(entity)),
                None => Ok(ResultValue::failure(DomainError::new(
                    format!("{location}-E02"),
                    format!("Could not find {}", E::type_name()),
                ))),
            }
        })
        .await
    }

    pub async fn get_all(&self) -> ResultValue<Vec<E>> {
        guarded(&Self::location("GetAll"), async move { Ok(self.repository.get_all().await) }).await
    }

    /// Inserts or replaces the entity, stamping its audit fields.
    pub async fn upsert(&self, entity: E) -> ResultValue<E> {
        guarded(&Self::location("Upsert"), async move { Ok(self.repository.upsert_by_id(entity).await) }).await
    }

    /// Deletes the entity with the id; fails like [`EntityService::get_by_id`]
    /// when it does not exist.
    pub async fn delete_by_id(&self, id: Uuid) -> ResultValue<bool> {
        guarded(&Self::location("DeleteById"), async move {
            let entity = self.get_by_id(id).await.value_or_raise(None)?;
            Ok(self.repository.delete(&entity).await)
        })
        .await
    }
}
