//! Table DDL derived from the entity descriptors. Idempotent: tables and indexes use IF NOT EXISTS.
//! Tables are created parents first (`ENTITIES` order), so foreign keys can be declared inline.

use crate::error::AppError;
use crate::model::{ColumnDef, ColumnType, EntityDef, ENTITIES};
use crate::sql::quoted;
use sqlx::PgPool;

/// Extra table-level constraints per table: unique columns and foreign keys.
struct TableExtras {
    table: &'static str,
    unique: &'static [&'static str],
    /// (column, parent table, ON DELETE action)
    foreign: &'static [(&'static str, &'static str, &'static str)],
}

const EXTRAS: &[TableExtras] = &[
    TableExtras {
        table: "users",
        unique: &["username", "uupid", "edupersonprincipalname"],
        foreign: &[],
    },
    TableExtras {
        table: "courses",
        unique: &["crn"],
        foreign: &[("semester_id", "semesters", "SET NULL")],
    },
    TableExtras {
        table: "projects",
        unique: &[],
        foreign: &[("course_id", "courses", "SET NULL")],
    },
    TableExtras {
        table: "skills",
        unique: &["name"],
        foreign: &[],
    },
    TableExtras {
        table: "project_skills",
        unique: &[],
        foreign: &[("project_id", "projects", "CASCADE"), ("skill_id", "skills", "CASCADE")],
    },
    TableExtras {
        table: "project_users",
        unique: &[],
        foreign: &[("project_id", "projects", "CASCADE"), ("user_id", "users", "CASCADE")],
    },
    TableExtras {
        table: "user_courses",
        unique: &[],
        foreign: &[("user_id", "users", "CASCADE"), ("course_id", "courses", "CASCADE")],
    },
    TableExtras {
        table: "user_skills",
        unique: &[],
        foreign: &[("user_id", "users", "CASCADE"), ("skill_id", "skills", "CASCADE")],
    },
];

/// Default for columns marked `with_default` (only `projects.maxCapacity`).
const INT_DEFAULT: i32 = 4;

fn type_str(col: &ColumnDef) -> String {
    match (col.ty, col.max_length) {
        (ColumnType::Int, _) => "INTEGER".into(),
        (ColumnType::Text, Some(n)) => format!("VARCHAR({})", n),
        (ColumnType::Text, None) => "TEXT".into(),
        (ColumnType::Timestamp, _) => "TIMESTAMPTZ".into(),
    }
}

fn column_sql(col: &ColumnDef) -> String {
    let mut def = format!("{} {}", quoted(col.name), type_str(col));
    if !col.nullable {
        def.push_str(" NOT NULL");
    }
    if col.has_default && col.ty == ColumnType::Int {
        def.push_str(&format!(" DEFAULT {}", INT_DEFAULT));
    }
    def
}

/// `CREATE TABLE IF NOT EXISTS` for one entity.
pub fn create_table_sql(entity: &EntityDef) -> String {
    let mut defs = vec![format!("{} SERIAL PRIMARY KEY", quoted("id"))];
    defs.extend(entity.columns.iter().map(column_sql));
    if entity.timestamps {
        for name in ["created_at", "updated_at"] {
            defs.push(format!("{} TIMESTAMPTZ NOT NULL DEFAULT NOW()", quoted(name)));
        }
    }
    if let Some(extras) = EXTRAS.iter().find(|x| x.table == entity.table) {
        for u in extras.unique {
            defs.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                quoted(&format!("{}_{}_key", entity.table, u.to_lowercase())),
                quoted(u)
            ));
        }
        for (column, parent, on_delete) in extras.foreign {
            defs.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
                quoted(column),
                quoted(parent),
                quoted("id"),
                on_delete
            ));
        }
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(entity.table),
        defs.join(",\n  ")
    )
}

/// One index per foreign key column; cascades and by-parent lookups filter on them.
pub fn index_sql(entity: &EntityDef) -> Vec<String> {
    EXTRAS
        .iter()
        .filter(|x| x.table == entity.table)
        .flat_map(|x| x.foreign.iter())
        .map(|(column, _, _)| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quoted(&format!("idx_{}_{}", entity.table, column)),
                quoted(entity.table),
                quoted(column)
            )
        })
        .collect()
}

/// Create all nine tables and their indexes.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for entity in ENTITIES.iter() {
        sqlx::query(&create_table_sql(entity)).execute(pool).await?;
        for sql in index_sql(entity) {
            sqlx::query(&sql).execute(pool).await?;
        }
        tracing::debug!(table = entity.table, "table ensured");
    }
    tracing::info!(tables = ENTITIES.len(), "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{COURSES, PROJECTS, SKILLS, USER_SKILLS};

    #[test]
    fn skills_table_has_no_timestamps() {
        let sql = create_table_sql(&SKILLS);
        assert!(sql.contains("\"name\" VARCHAR(50) NOT NULL"));
        assert!(sql.contains("CONSTRAINT \"skills_name_key\" UNIQUE (\"name\")"));
        assert!(!sql.contains("created_at"));
    }

    #[test]
    fn projects_capacity_defaults_and_course_is_detachable() {
        let sql = create_table_sql(&PROJECTS);
        assert!(sql.contains("\"maxCapacity\" INTEGER NOT NULL DEFAULT 4"));
        assert!(sql.contains("\"course_id\" INTEGER,"));
        assert!(sql.contains("REFERENCES \"courses\" (\"id\") ON DELETE SET NULL"));
        assert!(sql.contains("\"description\" TEXT NOT NULL"));
        assert!(sql.contains("\"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
    }

    #[test]
    fn join_tables_require_both_parents() {
        let sql = create_table_sql(&USER_SKILLS);
        assert!(sql.contains("\"user_id\" INTEGER NOT NULL"));
        assert!(sql.contains("\"skill_id\" INTEGER NOT NULL"));
        assert_eq!(index_sql(&USER_SKILLS).len(), 2);
    }

    #[test]
    fn courses_index_semester() {
        assert_eq!(
            index_sql(&COURSES),
            vec!["CREATE INDEX IF NOT EXISTS \"idx_courses_semester_id\" ON \"courses\" (\"semester_id\")".to_string()]
        );
    }
}
