//! Extractors for procedure inputs.
//!
//! A query carries its input as URL-encoded JSON in `?input=`; a mutation
//! carries it as the JSON request body. Either way, anything that does not
//! deserialize into the procedure's input type is a `BAD_REQUEST`.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Query, Request},
  http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct Envelope {
  input: Option<String>,
}

/// The input of a query procedure. A missing `input` parameter is read as
/// `{}`, so procedures whose fields are all optional may omit it.
pub struct RpcInput<T>(pub T);

impl<T, S> FromRequestParts<S> for RpcInput<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
    let Query(envelope) = Query::<Envelope>::try_from_uri(&parts.uri)
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let raw = envelope.input.as_deref().unwrap_or("{}");
    serde_json::from_str(raw)
      .map(Self)
      .map_err(|e| ApiError::BadRequest(format!("invalid input: {e}")))
  }
}

/// The input of a mutation procedure.
pub struct RpcBody<T>(pub T);

impl<T, S> FromRequest<S> for RpcBody<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Self(value))
  }
}

#[cfg(test)]
mod tests {
  use axum::{body::Body, http::Request as HttpRequest};
  use chirp_core::rpc::{GetPostInput, ListPostsInput};

  use super::*;

  async fn input<T: DeserializeOwned>(uri: &str) -> Result<T, ApiError> {
    let req = HttpRequest::builder().uri(uri).body(Body::empty()).unwrap();
    let (mut parts, _) = req.into_parts();
    RpcInput::<T>::from_request_parts(&mut parts, &())
      .await
      .map(|RpcInput(v)| v)
  }

  #[tokio::test]
  async fn missing_input_is_empty_object() {
    let parsed: ListPostsInput = input("/posts.list").await.unwrap();
    assert!(parsed.limit.is_none());
    assert!(parsed.cursor.is_none());
  }

  #[tokio::test]
  async fn url_encoded_json_is_decoded() {
    let parsed: ListPostsInput =
      input("/posts.list?input=%7B%22limit%22%3A2%2C%22userID%22%3A%22user_a%22%7D")
        .await
        .unwrap();
    assert_eq!(parsed.limit, Some(2));
    assert_eq!(parsed.author_id.as_deref(), Some("user_a"));
  }

  #[tokio::test]
  async fn non_uuid_id_is_bad_request() {
    let err = input::<GetPostInput>("/posts.getByID?input=%7B%22id%22%3A%22nope%22%7D")
      .await
      .err()
      .unwrap();
    assert!(matches!(err, ApiError::BadRequest(_)));
  }
}
