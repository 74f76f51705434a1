//! Skill extras: bulk create with per-item results, and the multi-select option list.

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::model::SKILLS;
use crate::response::{success_one_ok, success_with_status, ApiResult};
use crate::service::{CrudService, RequestValidator};
use crate::sql::Page;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

const BULK_LIMIT: usize = 100;
const MULTI_SELECT_LIMIT: i64 = 1000;

/// POST /api/skills/bulk
/// Each skill is created on its own; 201 if all succeed, 207 with the failures otherwise.
pub async fn bulk_create(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Value> {
    let items = match body {
        Value::Array(items) => items,
        _ => return Err(AppError::Validation("body must be a JSON array".into())),
    };
    if items.len() > BULK_LIMIT {
        return Err(AppError::Validation(format!(
            "bulk create limited to {} items",
            BULK_LIMIT
        )));
    }

    let mut created = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let name = item.get("name").and_then(Value::as_str).unwrap_or("?");
        let result = match item {
            Value::Object(map) => match RequestValidator::validate(&SKILLS, map) {
                Ok(values) => CrudService::create(&state.pool, &SKILLS, &values).await,
                Err(e) => Err(e),
            },
            _ => Err(AppError::Validation("item must be a JSON object".into())),
        };
        match result {
            Ok(row) => created.push(row),
            Err(e) => {
                let msg = format!("Skill {} ({}): {}", i + 1, name, e);
                tracing::warn!(error = %msg, "bulk skill create failed");
                errors.push(msg);
            }
        }
    }

    if errors.is_empty() {
        let total = created.len();
        return Ok(success_with_status(
            StatusCode::CREATED,
            json!({ "created_skills": created, "total_created": total }),
        ));
    }
    let (succeeded, failed) = (created.len(), errors.len());
    Ok(success_with_status(
        StatusCode::MULTI_STATUS,
        json!({
            "created_skills": created,
            "errors": errors,
            "total_requested": items.len(),
            "successfully_created": succeeded,
            "failed": failed,
        }),
    ))
}

/// GET /api/skills/multi-select
pub async fn multi_select(State(state): State<AppState>) -> ApiResult<Value> {
    let page = Page { skip: 0, limit: MULTI_SELECT_LIMIT };
    let rows = CrudService::list(&state.pool, &SKILLS, page).await?;
    let options: Vec<Value> = rows.iter().map(option).collect();
    let total = options.len();
    Ok(success_one_ok(json!({ "skills": options, "total": total })))
}

fn option(skill: &Value) -> Value {
    json!({
        "value": skill["id"],
        "label": skill["name"],
        "display": skill["name"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_select_option_shape() {
        let skill = json!({"id": 3, "name": "Rust"});
        assert_eq!(option(&skill), json!({"value": 3, "label": "Rust", "display": "Rust"}));
    }
}
