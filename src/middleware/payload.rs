use axum::{
    Json,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BiolinkError;

/// Names the entity in "expected an array of ..." errors.
pub trait ListItem {
    const PLURAL: &'static str;
}

/// JSON body that must be an array of `T`.
///
/// Body-level rejections (wrong content type, oversized body, bad JSON) keep
/// axum's status; a body that parses but is not an array, or whose entries
/// don't fit `T`, is a 400.
pub struct JsonList<T>(pub Vec<T>);

impl<S, T> FromRequest<S> for JsonList<T>
where
    S: Send + Sync,
    T: DeserializeOwned + ListItem,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = match Json::<Value>::from_request(req, state).await {
            Ok(v) => v,
            Err(rejection) => return Err(rejection.into_response()),
        };

        if !body.is_array() {
            return Err(invalid_format::<T>().into_response());
        }

        serde_json::from_value::<Vec<T>>(body)
            .map(JsonList)
            .map_err(|_| invalid_format::<T>().into_response())
    }
}

fn invalid_format<T: ListItem>() -> BiolinkError {
    BiolinkError::Validation(format!(
        "Invalid data format: expected an array of {}.",
        T::PLURAL
    ))
}
