//! Path, query and body extractors whose rejections render as the standard error envelope.

use crate::error::AppError;
use crate::sql::Page;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

pub const MAX_LIMIT: i64 = 100;

/// Path parameters; a malformed value (e.g. a non-integer id) is a 422.
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(v)| PathParam(v))
            .map_err(|e| AppError::Validation(e.body_text()))
    }
}

/// Raw query string pairs.
pub struct QueryMap(pub HashMap<String, String>);

#[async_trait]
impl<S> FromRequestParts<S> for QueryMap
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map(|Query(m)| QueryMap(m))
            .map_err(|e| AppError::Validation(e.body_text()))
    }
}

impl QueryMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Optional integer parameter; present but unparsable is a 422.
    pub fn int(&self, key: &str) -> Result<Option<i64>, AppError> {
        self.get(key)
            .map(|v| {
                v.trim()
                    .parse::<i64>()
                    .map_err(|_| AppError::Validation(format!("{} must be an integer", key)))
            })
            .transpose()
    }

    /// `skip` >= 0 (default 0) and `limit` in 1..=100 (default 10).
    pub fn page(&self) -> Result<Page, AppError> {
        let skip = self.int("skip")?.unwrap_or(0);
        let limit = self.int("limit")?.unwrap_or(Page::default().limit);
        if skip < 0 {
            return Err(AppError::Validation("skip must be greater than or equal to 0".into()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!("limit must be between 1 and {}", MAX_LIMIT)));
        }
        Ok(Page { skip, limit })
    }
}

/// Validated pagination from the query string.
pub struct Pagination(pub Page);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = QueryMap::from_request_parts(parts, state).await?;
        Ok(Pagination(query.page()?))
    }
}

/// JSON request body; syntax errors and wrong content types are a 422.
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<Value>::from_request(req, state)
            .await
            .map(|Json(v)| JsonBody(v))
            .map_err(|e| AppError::Validation(e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn query(pairs: &[(&str, &str)]) -> QueryMap {
        QueryMap(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn default_page() {
        assert_eq!(query(&[]).page().unwrap(), Page { skip: 0, limit: 10 });
    }

    #[rstest]
    #[case("0", "1")]
    #[case("5", "100")]
    #[case("1000", "50")]
    fn valid_pages(#[case] skip: &str, #[case] limit: &str) {
        let page = query(&[("skip", skip), ("limit", limit)]).page().unwrap();
        assert_eq!(page.skip.to_string(), skip);
        assert_eq!(page.limit.to_string(), limit);
    }

    #[rstest]
    #[case("skip", "-1")]
    #[case("limit", "0")]
    #[case("limit", "101")]
    #[case("limit", "ten")]
    fn invalid_pages(#[case] key: &str, #[case] value: &str) {
        let err = query(&[(key, value)]).page().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn optional_int() {
        let q = query(&[("min_capacity", "2"), ("max_capacity", "x")]);
        assert_eq!(q.int("min_capacity").unwrap(), Some(2));
        assert_eq!(q.int("absent").unwrap(), None);
        assert!(q.int("max_capacity").is_err());
    }
}
