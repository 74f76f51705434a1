//! Entity CRUD handlers shared by every resource. The entity descriptor is bound when routes are built.

use crate::error::AppError;
use crate::extractors::{JsonBody, Pagination, PathParam, QueryMap};
use crate::model::EntityDef;
use crate::response::{success_many, success_one, success_one_ok, ApiResult};
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::extract::State;
use serde_json::{json, Map, Value};

/// POST /api/{resource}/
pub async fn create(
    entity: &'static EntityDef,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    let body = RequestValidator::object(body)?;
    let values = RequestValidator::validate(entity, &body)?;
    let row = CrudService::create(&state.pool, entity, &values).await?;
    Ok(success_one(row))
}

/// GET /api/{resource}/?skip=&limit=
pub async fn list(
    entity: &'static EntityDef,
    State(state): State<AppState>,
    Pagination(page): Pagination,
) -> ApiResult<Vec<Value>> {
    let rows = CrudService::list(&state.pool, entity, page).await?;
    Ok(success_many(rows))
}

/// GET /api/{resource}/count
pub async fn count(entity: &'static EntityDef, State(state): State<AppState>) -> ApiResult<Value> {
    let n = CrudService::count(&state.pool, entity).await?;
    Ok(success_one_ok(keyed(entity.count_key, n, None)))
}

/// GET /api/{resource}/search?q=
pub async fn search(
    entity: &'static EntityDef,
    State(state): State<AppState>,
    query: QueryMap,
) -> ApiResult<Vec<Value>> {
    let term = query
        .get("q")
        .ok_or_else(|| AppError::Validation("q is required".into()))?;
    let page = query.page()?;
    let rows = CrudService::search(&state.pool, entity, term, page).await?;
    Ok(success_many(rows))
}

/// GET /api/{resource}/:id
pub async fn read(
    entity: &'static EntityDef,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Value> {
    let row = CrudService::read(&state.pool, entity, id)
        .await?
        .ok_or_else(|| entity.not_found())?;
    Ok(success_one_ok(row))
}

/// PUT /api/{resource}/:id (full overwrite)
pub async fn update(
    entity: &'static EntityDef,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody,
) -> ApiResult<Value> {
    let body = RequestValidator::object(body)?;
    let values = RequestValidator::validate(entity, &body)?;
    let row = CrudService::update(&state.pool, entity, id, &values)
        .await?
        .ok_or_else(|| entity.not_found())?;
    Ok(success_one_ok(row))
}

/// DELETE /api/{resource}/:id (cascades to dependents)
pub async fn delete(
    entity: &'static EntityDef,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Value> {
    if !CrudService::delete(&state.pool, entity, id).await? {
        return Err(entity.not_found());
    }
    Ok(success_one_ok(json!({ "message": entity.deleted_message(id) })))
}

/// GET /api/{resource}/by-{parent}/:id
pub async fn list_by(
    entity: &'static EntityDef,
    column: &'static str,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    Pagination(page): Pagination,
) -> ApiResult<Vec<Value>> {
    let rows = CrudService::list_by(&state.pool, entity, column, id, page).await?;
    Ok(success_many(rows))
}

/// GET /api/{resource}/count/by-{parent}/:id
pub async fn count_by(
    entity: &'static EntityDef,
    column: &'static str,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> ApiResult<Value> {
    let n = CrudService::count_by(&state.pool, entity, column, id).await?;
    Ok(success_one_ok(keyed(entity.count_key, n, Some((column, id)))))
}

/// `{"total_x": n}` plus the grouping key when counting by a parent.
pub(crate) fn keyed(key: &str, n: i64, group: Option<(&str, i32)>) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), json!(n));
    if let Some((column, id)) = group {
        map.insert(column.to_string(), json!(id));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_payloads() {
        assert_eq!(keyed("total_users", 3, None), json!({"total_users": 3}));
        assert_eq!(
            keyed("total_courses", 2, Some(("semester_id", 7))),
            json!({"total_courses": 2, "semester_id": 7})
        );
    }
}
