//! Standard response envelope helpers: `{"success": bool, "data": ..., "error": ...}`.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub type EnvelopeResponse<T> = (StatusCode, Json<Envelope<T>>);

pub type ApiResult<T> = Result<EnvelopeResponse<T>, crate::error::AppError>;

/// 201 with the created payload.
pub fn success_one<T: Serialize>(data: T) -> EnvelopeResponse<T> {
    (StatusCode::CREATED, Json(Envelope::ok(data)))
}

pub fn success_one_ok<T: Serialize>(data: T) -> EnvelopeResponse<T> {
    (StatusCode::OK, Json(Envelope::ok(data)))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> EnvelopeResponse<Vec<T>> {
    (StatusCode::OK, Json(Envelope::ok(data)))
}

pub fn success_with_status<T: Serialize>(status: StatusCode, data: T) -> EnvelopeResponse<T> {
    (status, Json(Envelope::ok(data)))
}

pub fn error_body(message: String) -> Envelope<()> {
    Envelope {
        success: false,
        data: None,
        error: Some(message),
    }
}
