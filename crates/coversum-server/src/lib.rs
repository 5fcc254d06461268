//! Coversum Server Library
//!
//! HTTP backend for the book-cover summary application.
//!
//! # Overview
//!
//! The server accepts a photographed or uploaded book cover, persists a
//! summary record, hands the image to an external automation webhook for
//! processing, and later accepts a completion callback that attaches the
//! generated summary:
//!
//! - **Record Store**: single-table persistence over PostgreSQL (SQLx),
//!   behind the [`store::SummaryStore`] trait so tests can substitute an
//!   in-memory fake
//! - **Upload Handler**: multipart image intake with a media-type
//!   allow-list and a 5 MiB cap
//! - **Webhook Forwarder**: best-effort outbound multipart POST to the
//!   external processing service
//! - **Callback / Status Handlers**: completion mutation and read-only
//!   status lookup by record id
//!
//! # Architecture
//!
//! Feature slices follow a CQRS layout: `commands/` hold write
//! operations, `queries/` hold reads, and `routes.rs` wires both to Axum
//! handlers. State (store handle + forwarder) is constructed in `main`
//! and injected through [`features::FeatureState`], never reached
//! through a process-wide singleton.
//!
//! # Example
//!
//! ```no_run
//! use coversum_server::{api, features::FeatureState, forward::Forwarder, store::PgSummaryStore};
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn run(pool: sqlx::PgPool) -> anyhow::Result<()> {
//! let forwarder = Forwarder::new("http://localhost:5678/webhook/upload-book", Duration::from_secs(30))?;
//! let state = FeatureState {
//!     store: Arc::new(PgSummaryStore::new(pool)),
//!     forwarder,
//! };
//! let app = api::create_router(state);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod features;
pub mod forward;
pub mod store;
