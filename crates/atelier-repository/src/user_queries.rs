//! Lookups specific to the user collection.

use crate::entity_repository::EntityRepository;
use crate::store::Filter;
use atelier_core::domain::User;
use atelier_core::{guarded, DomainError, DomainException, Record, ResultValue};
use tracing::debug;

impl EntityRepository<User> {
    /// Fails with `GetUserByEmailQuery-E02` when no user has the email.
    pub async fn get_user_by_email(&self, email: &str) -> ResultValue<User> {
        guarded("GetUserByEmailQuery", async move {
            debug!("Repository: get_user_by_email");
            match self.store().find_one(self.collection(), &Filter::eq("email", email)).await? {
                Some(document) => Ok(ResultValue::success(User::import(&document).map_err(DomainException::from)?)),
                None => Ok(ResultValue::failure(DomainError::new(
                    "GetUserByEmailQuery-E02",
                    "Could not find user with that email.",
                ))),
            }
        })
        .await
    }

    /// Fails with `GetUsersByUsername-E02` when no user has the username.
    pub async fn get_user_by_username(&self, username: &str) -> ResultValue<User> {
        guarded("GetUsersByUsername", async move {
            debug!(username, "Repository: get_user_by_username");
            match self.store().find_one(self.collection(), &Filter::eq("username", username)).await? {
                Some(document) => Ok(ResultValue::success(User::import(&document).map_err(DomainException::from)?)),
                None => Ok(ResultValue::failure(DomainError::new(
                    "GetUsersByUsername-E02",
                    "Could not find user",
                ))),
            }
        })
        .await
    }
}
