//! Typed bind values. Request bodies arrive as JSON and are converted per column type.

use crate::model::ColumnType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query. `None` payloads bind as typed NULLs.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Int(Option<i32>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
}

impl PgBindValue {
    pub fn text(s: impl Into<String>) -> Self {
        PgBindValue::Text(Some(s.into()))
    }

    pub fn int(n: i32) -> Self {
        PgBindValue::Int(Some(n))
    }

    pub fn null(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Int => PgBindValue::Int(None),
            ColumnType::Text => PgBindValue::Text(None),
            ColumnType::Timestamp => PgBindValue::Timestamp(None),
        }
    }

    /// Convert a JSON value for a column of type `ty`. The error is a short reason, not a full message.
    pub fn from_json(v: &Value, ty: ColumnType) -> Result<Self, &'static str> {
        if v.is_null() {
            return Ok(Self::null(ty));
        }
        match ty {
            ColumnType::Int => {
                let n = v.as_i64().ok_or("must be an integer")?;
                let n = i32::try_from(n).map_err(|_| "is out of range")?;
                Ok(PgBindValue::int(n))
            }
            ColumnType::Text => v
                .as_str()
                .map(PgBindValue::text)
                .ok_or("must be a string"),
            ColumnType::Timestamp => {
                let s = v.as_str().ok_or("must be an ISO-8601 datetime string")?;
                parse_timestamp(s)
                    .map(|t| PgBindValue::Timestamp(Some(t)))
                    .ok_or("must be an ISO-8601 datetime")
            }
        }
    }
}

/// RFC 3339, naive datetime (taken as UTC) or a bare date (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            PgBindValue::Int(n) => <Option<i32> as Encode<Postgres>>::encode_by_ref(n, buf),
            PgBindValue::Text(s) => <Option<String> as Encode<Postgres>>::encode_by_ref(s, buf),
            PgBindValue::Timestamp(t) => {
                <Option<DateTime<Utc>> as Encode<Postgres>>::encode_by_ref(t, buf)
            }
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Int(_) => <i32 as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Text(_) => <String as sqlx::Type<Postgres>>::type_info(),
            PgBindValue::Timestamp(_) => <DateTime<Utc> as sqlx::Type<Postgres>>::type_info(),
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(4), ColumnType::Int, PgBindValue::Int(Some(4)))]
    #[case(json!(null), ColumnType::Int, PgBindValue::Int(None))]
    #[case(json!("CS 3704"), ColumnType::Text, PgBindValue::text("CS 3704"))]
    #[case(json!(null), ColumnType::Text, PgBindValue::Text(None))]
    fn converts_json(#[case] v: Value, #[case] ty: ColumnType, #[case] expected: PgBindValue) {
        assert_eq!(PgBindValue::from_json(&v, ty).unwrap(), expected);
    }

    #[rstest]
    #[case(json!("4"), ColumnType::Int)]
    #[case(json!(1.5), ColumnType::Int)]
    #[case(json!(3_000_000_000i64), ColumnType::Int)]
    #[case(json!(12), ColumnType::Text)]
    #[case(json!("next tuesday"), ColumnType::Timestamp)]
    fn rejects_wrong_types(#[case] v: Value, #[case] ty: ColumnType) {
        assert!(PgBindValue::from_json(&v, ty).is_err());
    }

    #[rstest]
    #[case("2024-08-26T00:00:00Z")]
    #[case("2024-08-26T00:00:00+00:00")]
    #[case("2024-08-26T00:00:00")]
    #[case("2024-08-26")]
    fn timestamp_formats(#[case] s: &str) {
        let expected = Utc.with_ymd_and_hms(2024, 8, 26, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(s), Some(expected));
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let t = parse_timestamp("2025-01-13T09:00:00-05:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 1, 13, 14, 0, 0).unwrap());
    }
}
