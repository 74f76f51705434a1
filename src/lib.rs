//! Roster backend: REST API over users, semesters, courses, projects, skills and their links,
//! with PostgreSQL storage, an `X-API-Key` gate and CAS login.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use auth::{CasClient, TicketValidator};
pub use config::{AppConfig, Environment};
pub use error::{AppError, ConfigError};
pub use migration::ensure_tables;
pub use response::{error_body, success_many, success_one};
pub use routes::app;
pub use service::CrudService;
pub use state::AppState;
pub use store::{connect, ensure_database_exists};
pub use telemetry::init_tracing;
