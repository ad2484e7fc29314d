//! Error boundary for service and repository operations.
//!
//! Bodies raise freely with `?`; [`guarded`] turns whatever escapes into a
//! failed [`ResultValue`].

use crate::{DomainError, DomainException, ResultValue};
use std::future::Future;
use tracing::{debug, error};

/// Converts an escaped error into a [`DomainError`].
///
/// A raised [`DomainException`] keeps its error. Anything else becomes
/// `<location>-E00` "Unhandled exception" with the error as cause.
pub fn classify(location: &str, err: anyhow::Error) -> DomainError {
    match err.downcast::<DomainException>() {
        Ok(exception) => {
            debug!(location, error_code = %exception.error_code(), "Operation raised a domain error");
            exception.into_error()
        }
        Err(other) => {
            error!(location, error = %other, "Unhandled exception");
            DomainError::new(format!("{location}-E00"), "Unhandled exception").with_cause(other)
        }
    }
}

/// Runs an async body, converting anything it raises into a failure.
pub async fn guarded<T, Fut>(location: &str, body: Fut) -> ResultValue<T>
where
    Fut: Future<Output = anyhow::Result<ResultValue<T>>>,
{
    match body.await {
        Ok(result) => result,
        Err(err) => ResultValue::failure(classify(location, err)),
    }
}

/// Synchronous form of [`guarded`].
pub fn guarded_sync<T>(location: &str, body: impl FnOnce() -> anyhow::Result<ResultValue<T>>) -> ResultValue<T> {
    match body() {
        Ok(result) => result,
        Err(err) => ResultValue::failure(classify(location, err)),
    }
}
