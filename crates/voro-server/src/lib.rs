//! Voro HTTP server.
//!
//! Serves the landing, intake, and privacy pages and the JSON API behind
//! them: `/api/inquiry` captures an email and mails a tokenized intake link,
//! `/api/intake` forwards the completed brief to the owner.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
