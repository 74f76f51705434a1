//! HTTP handlers: generic entity CRUD, entity-specific lookups, skills extras, auth and seeding.

pub mod auth;
pub mod entity;
pub mod lookups;
pub mod populate;
pub mod skills;
