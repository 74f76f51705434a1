//! CAS login and encrypted cookie sessions.

pub mod cas;
pub mod session;

pub use cas::{CasClient, CasIdentity, ServiceResponseParser, TicketValidator};
pub use session::{claims_from, cookie_key, removal_cookie, session_cookie, SessionClaims, SESSION_COOKIE};
