//! Book-cover summary lifecycle
//!
//! Upload intake, the completion callback from the processing service,
//! and the read-only status query.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::summaries_routes;
