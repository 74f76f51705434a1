//! Generic CRUD execution against PostgreSQL. Rows come back as JSON objects keyed by column name.

use crate::error::AppError;
use crate::model::EntityDef;
use crate::service::RowValues;
use crate::sql::{
    cascade_step, count, count_by_column, delete, insert, lock_by_id, select_by_column,
    select_by_column_ignore_case, select_by_id, select_covering, select_in_range, select_list,
    select_search, select_where_null, update, Page, PgBindValue, QueryBuf,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

pub struct CrudService;

impl CrudService {
    /// List rows ordered by id.
    pub async fn list(pool: &PgPool, entity: &EntityDef, page: Page) -> Result<Vec<Value>, AppError> {
        Self::query_many(pool, &select_list(entity, page)).await
    }

    /// Fetch one row by primary key.
    pub async fn read(pool: &PgPool, entity: &EntityDef, id: i32) -> Result<Option<Value>, AppError> {
        Self::query_one(pool, &select_by_id(entity, id)).await
    }

    /// First row (lowest id) with `column = value`. Used for unique-field lookups.
    pub async fn find_by(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
        value: PgBindValue,
    ) -> Result<Option<Value>, AppError> {
        let q = select_by_column(entity, column, value, Some(Page { skip: 0, limit: 1 }));
        Self::query_one(pool, &q).await
    }

    pub async fn find_by_ignore_case(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
        value: &str,
    ) -> Result<Option<Value>, AppError> {
        Self::query_one(pool, &select_by_column_ignore_case(entity, column, value)).await
    }

    /// Rows whose foreign key `column` equals `id`.
    pub async fn list_by(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
        id: i32,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        let q = select_by_column(entity, column, PgBindValue::int(id), Some(page));
        Self::query_many(pool, &q).await
    }

    /// Rows with `column = value` for a non-key column (e.g. team name).
    pub async fn list_matching(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
        value: PgBindValue,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        Self::query_many(pool, &select_by_column(entity, column, value, Some(page))).await
    }

    pub async fn list_where_null(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        Self::query_many(pool, &select_where_null(entity, column, page)).await
    }

    pub async fn list_in_range(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
        min: Option<i32>,
        max: Option<i32>,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        Self::query_many(pool, &select_in_range(entity, column, min, max, page)).await
    }

    /// Case-insensitive substring search over the entity's search columns.
    pub async fn search(
        pool: &PgPool,
        entity: &EntityDef,
        term: &str,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        Self::query_many(pool, &select_search(entity, term, page)).await
    }

    pub async fn count(pool: &PgPool, entity: &EntityDef) -> Result<i64, AppError> {
        Self::query_count(pool, &count(entity)).await
    }

    pub async fn count_by(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
        id: i32,
    ) -> Result<i64, AppError> {
        Self::query_count(pool, &count_by_column(entity, column, PgBindValue::int(id))).await
    }

    /// Row whose `[start, end]` interval contains `at`. Overlaps resolve to the latest start.
    pub async fn covering(
        pool: &PgPool,
        entity: &EntityDef,
        start: &str,
        end: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Value>, AppError> {
        let q = select_covering(entity, start, end, PgBindValue::Timestamp(Some(at)));
        let mut rows = Self::query_many(pool, &q).await?;
        if rows.len() > 1 {
            tracing::warn!(
                entity = entity.label,
                chosen = %rows[0]["id"],
                other = %rows[1]["id"],
                "overlapping intervals; using the latest start"
            );
        }
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    /// Insert one row. Returns the stored row with generated id and timestamps.
    pub async fn create(pool: &PgPool, entity: &EntityDef, values: &RowValues) -> Result<Value, AppError> {
        let q = insert(entity, values);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(&q)
            .fetch_one(pool)
            .await
            .map_err(|e| AppError::from_write(entity.label, e))?;
        let row = row_to_json(&row);
        tracing::info!(entity = entity.label, id = %row["id"], "created");
        Ok(row)
    }

    /// Overwrite every writable column of one row. `None` when the id does not exist.
    pub async fn update(
        pool: &PgPool,
        entity: &EntityDef,
        id: i32,
        values: &RowValues,
    ) -> Result<Option<Value>, AppError> {
        let q = update(entity, id, values);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(&q)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::from_write(entity.label, e))?;
        if row.is_some() {
            tracing::info!(entity = entity.label, id, "updated");
        }
        Ok(row.map(|r| row_to_json(&r)))
    }

    /// Delete one row and its dependents in a single transaction.
    /// Returns false (and changes nothing) when the id does not exist.
    pub async fn delete(pool: &PgPool, entity: &EntityDef, id: i32) -> Result<bool, AppError> {
        let fail = |e: sqlx::Error| AppError::from_write(entity.label, e);
        let mut tx = pool.begin().await.map_err(fail)?;

        let lock = lock_by_id(entity, id);
        tracing::debug!(sql = %lock.sql, params = ?lock.params, "query (tx)");
        if bind_all(&lock).fetch_optional(&mut *tx).await.map_err(fail)?.is_none() {
            tx.rollback().await.map_err(fail)?;
            return Ok(false);
        }

        for step in entity.cascade {
            let q = cascade_step(step, id);
            tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
            let done = bind_all(&q).execute(&mut *tx).await.map_err(fail)?;
            tracing::debug!(table = step.table, rows = done.rows_affected(), "cascade step");
        }

        let q = delete(entity, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        bind_all(&q).execute(&mut *tx).await.map_err(fail)?;
        tx.commit().await.map_err(fail)?;
        tracing::info!(entity = entity.label, id, "deleted");
        Ok(true)
    }

    async fn query_one(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_count(pool: &PgPool, q: &QueryBuf) -> Result<i64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_one(pool).await?)
    }
}

fn bind_all(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

pub(crate) fn row_to_json(row: &PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Roster tables only use int4, int8, text/varchar and timestamptz.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(d)) = row.try_get::<Option<DateTime<Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}
