//! Success-or-error container used by every fallible internal operation.

use crate::{DomainError, DomainException, ErrorSink};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use uuid::Uuid;

/// A specialized `Result` for operations that raise a [`DomainException`].
pub type DomainResult<T> = Result<T, DomainException>;

#[derive(Debug, Clone)]
enum Slot<T> {
    Value(T),
    Error(DomainError),
    Empty,
}

/// Holds a value, an error, or neither. Never both.
///
/// Expected failures are carried as values; [`ResultValue::value_or_raise`]
/// is the only way to turn one back into a raised [`DomainException`].
#[must_use]
#[derive(Debug, Clone)]
pub struct ResultValue<T> {
    slot: Slot<T>,
}

fn no_result(error_code: Option<&str>) -> DomainException {
    DomainException::new(
        error_code.unwrap_or("ErrorHandling-E00"),
        "No error or value provided.",
        Some(400),
    )
}

fn transformation_failed(err: impl Display) -> DomainError {
    DomainError::new("MapResult-E00", err.to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "transformation panicked".to_string())
}

/// Runs a transformation step, turning a panic into `MapResult-E00`.
fn contained<R>(step: impl FnOnce() -> ResultValue<R>) -> ResultValue<R> {
    catch_unwind(AssertUnwindSafe(step))
        .unwrap_or_else(|payload| ResultValue::failure(transformation_failed(panic_message(payload.as_ref()))))
}

async fn contained_async<R>(step: impl Future<Output = ResultValue<R>>) -> ResultValue<R> {
    AssertUnwindSafe(step)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| ResultValue::failure(transformation_failed(panic_message(payload.as_ref()))))
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

impl<T> ResultValue<T> {
    pub const fn success(value: T) -> Self {
        Self { slot: Slot::Value(value) }
    }

    pub const fn failure(error: DomainError) -> Self {
        Self { slot: Slot::Error(error) }
    }

    /// Neither a value nor an error.
    pub const fn empty() -> Self {
        Self { slot: Slot::Empty }
    }

    /// Builds a result from optional parts.
    ///
    /// # Errors
    ///
    /// Fails with `ResultValue-FromParts-E01` when both parts are set.
    pub fn from_parts(value: Option<T>, error: Option<DomainError>) -> DomainResult<Self> {
        match (value, error) {
            (Some(_), Some(error)) => Err(DomainException::internal(
                "ResultValue-FromParts-E01",
                format!(
                    "A result cannot hold both a value and an error ({}).",
                    error.error_code
                ),
            )),
            (Some(value), None) => Ok(Self::success(value)),
            (None, Some(error)) => Ok(Self::failure(error)),
            (None, None) => Ok(Self::empty()),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.slot, Slot::Value(_))
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self.slot, Slot::Error(_))
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self.slot, Slot::Empty)
    }

    pub const fn value(&self) -> Option<&T> {
        match &self.slot {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub const fn error(&self) -> Option<&DomainError> {
        match &self.slot {
            Slot::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn into_parts(self) -> (Option<T>, Option<DomainError>) {
        match self.slot {
            Slot::Value(value) => (Some(value), None),
            Slot::Error(error) => (None, Some(error)),
            Slot::Empty => (None, None),
        }
    }

    /// Returns the value or raises.
    ///
    /// # Errors
    ///
    /// The stored error (with `error_code` overriding its code when given),
    /// or `ErrorHandling-E00` when the result is empty.
    pub fn value_or_raise(self, error_code: Option<&str>) -> DomainResult<T> {
        match self.slot {
            Slot::Value(value) => Ok(value),
            Slot::Error(error) => Err(match error_code {
                Some(code) => error.with_error_code(code),
                None => error,
            }
            .into()),
            Slot::Empty => Err(no_result(error_code)),
        }
    }

    /// Returns the value, or `default` on failure or emptiness.
    pub fn value_or_default(self, default: T) -> T {
        match self.slot {
            Slot::Value(value) => value,
            _ => default,
        }
    }

    /// Like [`ResultValue::value_or_default`], reporting a stored error to `sink`.
    pub fn value_or_default_logged(self, default: T, sink: &dyn ErrorSink) -> T {
        match self.slot {
            Slot::Value(value) => value,
            Slot::Error(error) => {
                sink.log_error(&error);
                default
            }
            Slot::Empty => default,
        }
    }

    fn propagate<R>(slot: Slot<T>) -> ResultValue<R> {
        match slot {
            Slot::Error(error) => ResultValue::failure(error),
            _ => ResultValue::empty(),
        }
    }

    /// Transforms a stored value. A panic inside `f` becomes `MapResult-E00`.
    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> ResultValue<R> {
        match self.slot {
            Slot::Value(value) => contained(|| ResultValue::success(f(value))),
            slot => Self::propagate(slot),
        }
    }

    /// Like [`ResultValue::map`]; an `Err` from `f` becomes `MapResult-E00`.
    pub fn try_map<R, E: Display>(self, f: impl FnOnce(T) -> Result<R, E>) -> ResultValue<R> {
        match self.slot {
            Slot::Value(value) => contained(|| match f(value) {
                Ok(mapped) => ResultValue::success(mapped),
                Err(err) => ResultValue::failure(transformation_failed(err)),
            }),
            slot => Self::propagate(slot),
        }
    }

    pub async fn map_async<R, F, Fut>(self, f: F) -> ResultValue<R>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = R>,
    {
        match self.slot {
            Slot::Value(value) => contained_async(async move { ResultValue::success(f(value).await) }).await,
            slot => Self::propagate(slot),
        }
    }

    pub async fn try_map_async<R, E, F, Fut>(self, f: F) -> ResultValue<R>
    where
        E: Display,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        match self.slot {
            Slot::Value(value) => contained_async(async move {
                match f(value).await {
                    Ok(mapped) => ResultValue::success(mapped),
                    Err(err) => ResultValue::failure(transformation_failed(err)),
                }
            })
            .await,
            slot => Self::propagate(slot),
        }
    }

    /// Chains a step that itself returns a result.
    pub fn and_then<R>(self, f: impl FnOnce(T) -> ResultValue<R>) -> ResultValue<R> {
        match self.slot {
            Slot::Value(value) => contained(|| f(value)),
            slot => Self::propagate(slot),
        }
    }

    pub fn try_and_then<R, E: Display>(
        self,
        f: impl FnOnce(T) -> Result<ResultValue<R>, E>,
    ) -> ResultValue<R> {
        match self.slot {
            Slot::Value(value) => {
                contained(|| f(value).unwrap_or_else(|err| ResultValue::failure(transformation_failed(err))))
            }
            slot => Self::propagate(slot),
        }
    }

    pub async fn and_then_async<R, F, Fut>(self, f: F) -> ResultValue<R>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = ResultValue<R>>,
    {
        match self.slot {
            Slot::Value(value) => contained_async(async move { f(value).await }).await,
            slot => Self::propagate(slot),
        }
    }

    pub async fn try_and_then_async<R, E, F, Fut>(self, f: F) -> ResultValue<R>
    where
        E: Display,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<ResultValue<R>, E>>,
    {
        match self.slot {
            Slot::Value(value) => contained_async(async move {
                f(value)
                    .await
                    .unwrap_or_else(|err| ResultValue::failure(transformation_failed(err)))
            })
            .await,
            slot => Self::propagate(slot),
        }
    }
}

impl<E> ResultValue<Vec<E>> {
    /// Returns the first element of a successful list.
    ///
    /// # Errors
    ///
    /// The stored error unchanged, `ErrorHandling-E00` when empty, or
    /// `FirstValueOrThrow-E01` when the list is empty and no default is given.
    pub fn first_or_raise(self, default: Option<E>, error_code: Option<&str>) -> DomainResult<E> {
        match self.slot {
            Slot::Error(error) => Err(error.into()),
            Slot::Empty => Err(no_result(error_code)),
            Slot::Value(items) => items.into_iter().next().or(default).ok_or_else(|| {
                DomainException::not_found(
                    error_code.unwrap_or("FirstValueOrThrow-E01"),
                    format!("Vec<{}> empty and no default provided.", short_type_name::<E>()),
                )
            }),
        }
    }
}

impl<T: ResponseBody> ResultValue<T> {
    /// Converts a successful value into its response body.
    ///
    /// # Errors
    ///
    /// The stored error, or `Error-E00` "Bad request" (404) when empty.
    pub fn to_response_or_not_found(self) -> DomainResult<serde_json::Value> {
        match self.slot {
            Slot::Value(value) => Ok(value.into_response_body()),
            Slot::Error(error) => Err(error.into()),
            Slot::Empty => Err(DomainException::not_found("Error-E00", "Bad request")),
        }
    }
}

impl<T> From<DomainResult<T>> for ResultValue<T> {
    fn from(result: DomainResult<T>) -> Self {
        match result {
            Ok(value) => Self::success(value),
            Err(exception) => Self::failure(exception.into_error()),
        }
    }
}

/// Values that can be returned to callers as JSON.
///
/// Records render through their export with private fields removed; see
/// [`crate::record::response_body`].
pub trait ResponseBody {
    fn into_response_body(self) -> serde_json::Value;
}

macro_rules! json_response_body {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ResponseBody for $ty {
                fn into_response_body(self) -> serde_json::Value {
                    serde_json::Value::from(self)
                }
            }
        )*
    };
}

json_response_body!(bool, i32, i64, u32, u64, f64, String, serde_json::Value);

impl ResponseBody for () {
    fn into_response_body(self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

impl ResponseBody for Uuid {
    fn into_response_body(self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}

impl ResponseBody for DateTime<Utc> {
    fn into_response_body(self) -> serde_json::Value {
        serde_json::Value::String(self.to_rfc3339())
    }
}

impl ResponseBody for crate::Document {
    fn into_response_body(self) -> serde_json::Value {
        self.to_json()
    }
}

impl<T: ResponseBody> ResponseBody for Vec<T> {
    fn into_response_body(self) -> serde_json::Value {
        serde_json::Value::Array(self.into_iter().map(ResponseBody::into_response_body).collect())
    }
}

impl<T: ResponseBody> ResponseBody for Option<T> {
    fn into_response_body(self) -> serde_json::Value {
        self.map_or(serde_json::Value::Null, ResponseBody::into_response_body)
    }
}
