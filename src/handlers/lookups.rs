//! Entity-specific reads: unique-field lookups, the current semester, orphan and range queries.

use crate::error::AppError;
use crate::extractors::{Pagination, PathParam, QueryMap};
use crate::model::{EntityDef, COURSES, PROJECTS, SEMESTERS, USERS};
use crate::response::{success_many, success_one_ok, ApiResult};
use crate::service::CrudService;
use crate::sql::PgBindValue;
use crate::state::AppState;
use axum::extract::State;
use chrono::Utc;
use serde_json::Value;

async fn find_one(state: &AppState, entity: &EntityDef, column: &str, value: String) -> ApiResult<Value> {
    let row = CrudService::find_by(&state.pool, entity, column, PgBindValue::text(value))
        .await?
        .ok_or_else(|| entity.not_found())?;
    Ok(success_one_ok(row))
}

/// GET /api/users/by-username/:username
pub async fn user_by_username(
    State(state): State<AppState>,
    PathParam(username): PathParam<String>,
) -> ApiResult<Value> {
    find_one(&state, &USERS, "username", username).await
}

/// GET /api/users/by-uupid/:uupid
pub async fn user_by_uupid(
    State(state): State<AppState>,
    PathParam(uupid): PathParam<String>,
) -> ApiResult<Value> {
    find_one(&state, &USERS, "uupid", uupid).await
}

/// GET /api/semesters/by-display-name/:display_name
pub async fn semester_by_display_name(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> ApiResult<Value> {
    find_one(&state, &SEMESTERS, "displayName", name).await
}

/// GET /api/semesters/current
pub async fn current_semester(State(state): State<AppState>) -> ApiResult<Value> {
    let row = CrudService::covering(
        &state.pool,
        &SEMESTERS,
        "semesterStartDate",
        "semesterEndDate",
        Utc::now(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("No current semester found".into()))?;
    Ok(success_one_ok(row))
}

/// GET /api/courses/by-crn/:crn
pub async fn course_by_crn(
    State(state): State<AppState>,
    PathParam(crn): PathParam<String>,
) -> ApiResult<Value> {
    find_one(&state, &COURSES, "crn", crn).await
}

/// GET /api/courses/without-semester
pub async fn courses_without_semester(
    State(state): State<AppState>,
    Pagination(page): Pagination,
) -> ApiResult<Vec<Value>> {
    let rows = CrudService::list_where_null(&state.pool, &COURSES, "semester_id", page).await?;
    Ok(success_many(rows))
}

/// GET /api/projects/without-course
pub async fn projects_without_course(
    State(state): State<AppState>,
    Pagination(page): Pagination,
) -> ApiResult<Vec<Value>> {
    let rows = CrudService::list_where_null(&state.pool, &PROJECTS, "course_id", page).await?;
    Ok(success_many(rows))
}

/// GET /api/projects/by-team/:team_name
pub async fn projects_by_team(
    State(state): State<AppState>,
    PathParam(team): PathParam<String>,
    Pagination(page): Pagination,
) -> ApiResult<Vec<Value>> {
    let rows =
        CrudService::list_matching(&state.pool, &PROJECTS, "teamName", PgBindValue::text(team), page).await?;
    Ok(success_many(rows))
}

/// GET /api/projects/by-capacity?min_capacity=&max_capacity=
pub async fn projects_by_capacity(State(state): State<AppState>, query: QueryMap) -> ApiResult<Vec<Value>> {
    let min = capacity_bound(&query, "min_capacity")?;
    let max = capacity_bound(&query, "max_capacity")?;
    let page = query.page()?;
    let rows = CrudService::list_in_range(&state.pool, &PROJECTS, "maxCapacity", min, max, page).await?;
    Ok(success_many(rows))
}

fn capacity_bound(query: &QueryMap, key: &str) -> Result<Option<i32>, AppError> {
    match query.int(key)? {
        None => Ok(None),
        Some(n) if n < 0 => Err(AppError::Validation(format!(
            "{} must be greater than or equal to 0",
            key
        ))),
        Some(n) => Ok(Some(i32::try_from(n).unwrap_or(i32::MAX))),
    }
}
