//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from entity descriptors.
//! Identifiers only ever come from the static catalog; values are always parameters.

use crate::model::{CascadeAction, CascadeStep, ColumnDef, EntityDef, Scope};
use crate::sql::PgBindValue;

/// Offset pagination. Both values are validated before they get here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page { skip: 0, limit: 10 }
    }
}

/// Quote identifier for PostgreSQL. Needed for the camelCase column names.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

fn select_column_list(entity: &EntityDef) -> String {
    entity
        .select_columns()
        .into_iter()
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

fn page_clause(page: Page) -> String {
    format!(" LIMIT {} OFFSET {}", page.limit, page.skip)
}

fn select_where(entity: &EntityDef, where_clause: &str, page: Option<Page>) -> String {
    format!(
        "SELECT {} FROM {}{} ORDER BY \"id\"{}",
        select_column_list(entity),
        quoted(entity.table),
        where_clause,
        page.map(page_clause).unwrap_or_default()
    )
}

/// Escape `%`, `_` and `\` so a search term matches literally inside ILIKE.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub fn select_by_id(entity: &EntityDef, id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::int(id));
    q.sql = select_where(entity, &format!(" WHERE \"id\" = ${}", n), None);
    q
}

/// All rows with `column = value`, ordered by id. Without a page every match is returned.
pub fn select_by_column(
    entity: &EntityDef,
    column: &str,
    value: PgBindValue,
    page: Option<Page>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = select_where(entity, &format!(" WHERE {} = ${}", quoted(column), n), page);
    q
}

/// Case-insensitive equality (ILIKE without wildcards).
pub fn select_by_column_ignore_case(entity: &EntityDef, column: &str, value: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::text(escape_like(value)));
    q.sql = select_where(
        entity,
        &format!(" WHERE {} ILIKE ${}", quoted(column), n),
        Some(Page { skip: 0, limit: 1 }),
    );
    q
}

pub fn select_list(entity: &EntityDef, page: Page) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = select_where(entity, "", Some(page));
    q
}

pub fn select_where_null(entity: &EntityDef, column: &str, page: Page) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = select_where(entity, &format!(" WHERE {} IS NULL", quoted(column)), Some(page));
    q
}

/// Substring match across the entity's search columns (OR), case-insensitive.
pub fn select_search(entity: &EntityDef, term: &str, page: Page) -> QueryBuf {
    let mut q = QueryBuf::new();
    if entity.search.is_empty() {
        q.sql = select_where(entity, " WHERE FALSE", Some(page));
        return q;
    }
    let n = q.push_param(PgBindValue::text(format!("%{}%", escape_like(term))));
    let ors = entity
        .search
        .iter()
        .map(|c| format!("{} ILIKE ${}", quoted(c), n))
        .collect::<Vec<_>>()
        .join(" OR ");
    q.sql = select_where(entity, &format!(" WHERE ({})", ors), Some(page));
    q
}

/// Inclusive range on an integer column; either bound may be open.
pub fn select_in_range(
    entity: &EntityDef,
    column: &str,
    min: Option<i32>,
    max: Option<i32>,
    page: Page,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut parts = Vec::new();
    if let Some(min) = min {
        let n = q.push_param(PgBindValue::int(min));
        parts.push(format!("{} >= ${}", quoted(column), n));
    }
    if let Some(max) = max {
        let n = q.push_param(PgBindValue::int(max));
        parts.push(format!("{} <= ${}", quoted(column), n));
    }
    let where_clause = if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    };
    q.sql = select_where(entity, &where_clause, Some(page));
    q
}

/// Rows whose `[start, end]` interval covers `$1`. Latest start first, then lowest id.
/// Returns at most two rows so the caller can tell whether intervals overlap.
pub fn select_covering(
    entity: &EntityDef,
    start: &str,
    end: &str,
    at: PgBindValue,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(at);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} <= ${n} AND {} >= ${n} ORDER BY {} DESC, \"id\" LIMIT 2",
        select_column_list(entity),
        quoted(entity.table),
        quoted(start),
        quoted(end),
        quoted(start),
    );
    q
}

pub fn count(entity: &EntityDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", quoted(entity.table));
    q
}

pub fn count_by_column(entity: &EntityDef, column: &str, value: PgBindValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(value);
    q.sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ${}",
        quoted(entity.table),
        quoted(column),
        n
    );
    q
}

/// Placeholder for one column: `$n` for a value, `DEFAULT` when absent.
fn value_expr(q: &mut QueryBuf, value: &Option<PgBindValue>) -> String {
    match value {
        Some(v) => format!("${}", q.push_param(v.clone())),
        None => "DEFAULT".to_string(),
    }
}

/// INSERT one row and return it.
pub fn insert(entity: &EntityDef, values: &[(&ColumnDef, Option<PgBindValue>)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(entity.table);
    let returning = select_column_list(entity);
    if values.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning);
        return q;
    }
    let cols: Vec<String> = values.iter().map(|(c, _)| quoted(c.name)).collect();
    let placeholders: Vec<String> = values.iter().map(|(_, v)| value_expr(&mut q, v)).collect();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        returning
    );
    q
}

/// Full-overwrite UPDATE by id; absent columns fall back to their default. Touches `updated_at`.
pub fn update(entity: &EntityDef, id: i32, values: &[(&ColumnDef, Option<PgBindValue>)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets: Vec<String> = values
        .iter()
        .map(|(c, v)| format!("{} = {}", quoted(c.name), value_expr(&mut q, v)))
        .collect();
    if entity.timestamps {
        sets.push("\"updated_at\" = NOW()".to_string());
    }
    if sets.is_empty() {
        sets.push("\"id\" = \"id\"".to_string());
    }
    let n = q.push_param(PgBindValue::int(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE \"id\" = ${} RETURNING {}",
        quoted(entity.table),
        sets.join(", "),
        n,
        select_column_list(entity)
    );
    q
}

/// Row lock taken at the start of a cascade delete.
pub fn lock_by_id(entity: &EntityDef, id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::int(id));
    q.sql = format!(
        "SELECT \"id\" FROM {} WHERE \"id\" = ${} FOR UPDATE",
        quoted(entity.table),
        n
    );
    q
}

pub fn delete(entity: &EntityDef, id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::int(id));
    q.sql = format!("DELETE FROM {} WHERE \"id\" = ${}", quoted(entity.table), n);
    q
}

/// One dependent-table statement of a cascade, keyed on the deleted parent's id.
pub fn cascade_step(step: &CascadeStep, parent_id: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::int(parent_id));
    let column = quoted(step.column);
    let target = match step.scope {
        Scope::Direct => format!("{} = ${}", column, n),
        Scope::Through { table, column: via } => format!(
            "{} IN (SELECT \"id\" FROM {} WHERE {} = ${})",
            column,
            quoted(table),
            quoted(via),
            n
        ),
    };
    q.sql = match step.action {
        CascadeAction::Delete => format!("DELETE FROM {} WHERE {}", quoted(step.table), target),
        CascadeAction::Detach => format!(
            "UPDATE {} SET {} = NULL, \"updated_at\" = NOW() WHERE {}",
            quoted(step.table),
            column,
            target
        ),
    };
    q
}
