//! Static entity descriptors. Each table is described once (columns, search fields,
//! relations, delete cascade) and the generic service, SQL builder and routes are driven from it.

mod catalog;

pub use catalog::*;

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Text,
    Timestamp,
}

/// A writable column. `id`, `created_at` and `updated_at` are managed by the database and never listed here.
#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    /// The column has a database default, used when the field is absent from a body.
    pub has_default: bool,
    pub max_length: Option<usize>,
    pub minimum: Option<i64>,
}

impl ColumnDef {
    pub const fn text(name: &'static str, max_length: usize) -> Self {
        ColumnDef {
            name,
            ty: ColumnType::Text,
            nullable: false,
            has_default: false,
            max_length: Some(max_length),
            minimum: None,
        }
    }

    pub const fn long_text(name: &'static str) -> Self {
        ColumnDef {
            name,
            ty: ColumnType::Text,
            nullable: false,
            has_default: false,
            max_length: None,
            minimum: None,
        }
    }

    pub const fn int(name: &'static str) -> Self {
        ColumnDef {
            name,
            ty: ColumnType::Int,
            nullable: false,
            has_default: false,
            max_length: None,
            minimum: None,
        }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        ColumnDef {
            name,
            ty: ColumnType::Timestamp,
            nullable: false,
            has_default: false,
            max_length: None,
            minimum: None,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub const fn at_least(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Must be present and non-null in create/update bodies.
    pub fn required(&self) -> bool {
        !self.nullable && !self.has_default
    }
}

/// One side of a many-to-one link, exposed as `/by-{segment}/:id` and `/count/by-{segment}/:id`.
#[derive(Debug)]
pub struct Relation {
    pub segment: &'static str,
    pub column: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeAction {
    /// Remove the dependent rows.
    Delete,
    /// Set the foreign key to NULL and touch `updated_at`.
    Detach,
}

/// Which rows of the dependent table a cascade step reaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// `column = <deleted id>`
    Direct,
    /// `column IN (SELECT id FROM table WHERE column = <deleted id>)`
    Through {
        table: &'static str,
        column: &'static str,
    },
}

#[derive(Debug)]
pub struct CascadeStep {
    pub action: CascadeAction,
    pub table: &'static str,
    pub column: &'static str,
    pub scope: Scope,
}

impl CascadeStep {
    pub const fn delete(table: &'static str, column: &'static str) -> Self {
        CascadeStep {
            action: CascadeAction::Delete,
            table,
            column,
            scope: Scope::Direct,
        }
    }

    pub const fn detach(table: &'static str, column: &'static str) -> Self {
        CascadeStep {
            action: CascadeAction::Detach,
            table,
            column,
            scope: Scope::Direct,
        }
    }

    pub const fn through(mut self, table: &'static str, column: &'static str) -> Self {
        self.scope = Scope::Through { table, column };
        self
    }
}

#[derive(Debug)]
pub struct EntityDef {
    /// Human name used in messages ("User", "Project-skill relationship").
    pub label: &'static str,
    /// URL segment under `/api/`.
    pub path: &'static str,
    pub table: &'static str,
    pub columns: &'static [ColumnDef],
    /// Table carries `created_at` / `updated_at`.
    pub timestamps: bool,
    pub search: &'static [&'static str],
    /// Key of the count payload, e.g. `total_users`.
    pub count_key: &'static str,
    pub relations: &'static [Relation],
    /// Steps run in order inside the delete transaction, before the row itself is removed.
    pub cascade: &'static [CascadeStep],
}

impl EntityDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Every column returned by reads, in table order.
    pub fn select_columns(&self) -> Vec<&'static str> {
        let mut cols = vec!["id"];
        cols.extend(self.columns.iter().map(|c| c.name));
        if self.timestamps {
            cols.push("created_at");
            cols.push("updated_at");
        }
        cols
    }

    pub fn not_found(&self) -> AppError {
        AppError::NotFound(format!("{} not found", self.label))
    }

    pub fn deleted_message(&self, id: i32) -> String {
        format!("{} with ID {} deleted successfully", self.label, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_columns_include_managed_fields() {
        assert_eq!(
            SKILLS.select_columns(),
            vec!["id", "name"]
        );
        let cols = SEMESTERS.select_columns();
        assert_eq!(cols.first(), Some(&"id"));
        assert_eq!(&cols[cols.len() - 2..], &["created_at", "updated_at"]);
    }

    #[test]
    fn required_columns() {
        let cap = PROJECTS.column("maxCapacity").unwrap();
        assert!(!cap.required());
        assert!(!PROJECTS.column("teamName").unwrap().required());
        assert!(PROJECTS.column("title").unwrap().required());
    }

    #[test]
    fn messages() {
        assert_eq!(USERS.not_found().to_string(), "User not found");
        assert_eq!(USERS.deleted_message(7), "User with ID 7 deleted successfully");
    }
}
