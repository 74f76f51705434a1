//! Request body validation against the entity's column rules.

use crate::error::AppError;
use crate::model::{ColumnDef, EntityDef};
use crate::sql::PgBindValue;
use serde_json::{Map, Value};

/// Validated values for every writable column, in column order. `None` means "use the column default".
pub type RowValues = Vec<(&'static ColumnDef, Option<PgBindValue>)>;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full create/update body. Unknown fields are ignored; every required column must be
    /// present and non-null.
    pub fn validate(entity: &EntityDef, body: &Map<String, Value>) -> Result<RowValues, AppError> {
        let mut out = Vec::with_capacity(entity.columns.len());
        for col in entity.columns {
            let value = match body.get(col.name) {
                None | Some(Value::Null) if col.required() => {
                    return Err(AppError::Validation(format!("{} is required", col.name)));
                }
                None => None,
                Some(Value::Null) if col.has_default => None,
                Some(v) => Some(validate_field(col, v)?),
            };
            out.push((col, value));
        }
        Ok(out)
    }

    /// Body must be a JSON object.
    pub fn object(value: Value) -> Result<Map<String, Value>, AppError> {
        match value {
            Value::Object(m) => Ok(m),
            _ => Err(AppError::Validation("body must be a JSON object".into())),
        }
    }
}

fn validate_field(col: &ColumnDef, v: &Value) -> Result<PgBindValue, AppError> {
    let bound = PgBindValue::from_json(v, col.ty)
        .map_err(|reason| AppError::Validation(format!("{} {}", col.name, reason)))?;
    if let PgBindValue::Text(Some(s)) = &bound {
        if s.trim().is_empty() && !col.nullable {
            return Err(AppError::Validation(format!("{} must not be empty", col.name)));
        }
        if let Some(max) = col.max_length {
            if s.chars().count() > max {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col.name, max
                )));
            }
        }
    }
    if let (PgBindValue::Int(Some(n)), Some(min)) = (&bound, col.minimum) {
        if i64::from(*n) < min {
            return Err(AppError::Validation(format!("{} must be at least {}", col.name, min)));
        }
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PROJECTS, SEMESTERS, SKILLS, USERS};
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        RequestValidator::object(v).unwrap()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn user_body_binds_in_column_order() {
        let values = RequestValidator::validate(
            &USERS,
            &body(json!({
                "uupid": "jd1",
                "username": "john_doe",
                "edupersonprimaryaffiliation": "student",
                "edupersonprincipalname": "john@vt.edu",
                "ignored": true
            })),
        )
        .unwrap();
        let names: Vec<_> = values.iter().map(|(c, _)| c.name).collect();
        assert_eq!(
            names,
            ["username", "edupersonprimaryaffiliation", "uupid", "edupersonprincipalname"]
        );
        assert_eq!(values[0].1, Some(PgBindValue::text("john_doe")));
    }

    #[test]
    fn missing_required_field() {
        let err = RequestValidator::validate(&SKILLS, &body(json!({}))).unwrap_err();
        assert_eq!(message(err), "name is required");
        let err = RequestValidator::validate(&SKILLS, &body(json!({"name": null}))).unwrap_err();
        assert_eq!(message(err), "name is required");
    }

    #[test]
    fn optional_and_defaulted_project_fields() {
        let values = RequestValidator::validate(
            &PROJECTS,
            &body(json!({"title": "Web", "description": "An app", "maxCapacity": null})),
        )
        .unwrap();
        let by_name = |n: &str| values.iter().find(|(c, _)| c.name == n).unwrap().1.clone();
        assert_eq!(by_name("course_id"), None);
        assert_eq!(by_name("maxCapacity"), None);
        assert_eq!(by_name("teamName"), None);
    }

    #[test]
    fn explicit_null_clears_nullable_field() {
        let values = RequestValidator::validate(
            &PROJECTS,
            &body(json!({"title": "Web", "description": "d", "teamName": null})),
        )
        .unwrap();
        let team = values.iter().find(|(c, _)| c.name == "teamName").unwrap();
        assert_eq!(team.1, Some(PgBindValue::Text(None)));
    }

    #[test]
    fn length_and_range_limits() {
        let long = "x".repeat(51);
        let err = RequestValidator::validate(&SKILLS, &body(json!({ "name": long }))).unwrap_err();
        assert_eq!(message(err), "name must be at most 50 characters");

        let err = RequestValidator::validate(
            &PROJECTS,
            &body(json!({"title": "t", "description": "d", "maxCapacity": -1})),
        )
        .unwrap_err();
        assert_eq!(message(err), "maxCapacity must be at least 0");
    }

    #[test]
    fn type_errors_name_the_field() {
        let err = RequestValidator::validate(
            &SEMESTERS,
            &body(json!({"displayName": "Fall", "semesterStartDate": 5, "semesterEndDate": "2024-12-13"})),
        )
        .unwrap_err();
        assert_eq!(message(err), "semesterStartDate must be an ISO-8601 datetime string");
    }

    #[test]
    fn blank_strings_rejected() {
        let err = RequestValidator::validate(&SKILLS, &body(json!({"name": "  "}))).unwrap_err();
        assert_eq!(message(err), "name must not be empty");
    }

    #[test]
    fn non_object_body() {
        assert!(RequestValidator::object(json!([1, 2])).is_err());
    }
}
