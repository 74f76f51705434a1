//! Request extractors and the API key middleware.

pub mod api_key;
pub mod params;
pub mod session;

pub use api_key::{require_api_key, API_KEY_HEADER};
pub use params::{JsonBody, Pagination, PathParam, QueryMap};
pub use session::CurrentSession;
