//! HTTP surface.
//!
//! All inventory routes live under `/api/v1` and require a session opened by
//! `POST /api/v1/login`. Session state is kept server-side, keyed by cookie.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
