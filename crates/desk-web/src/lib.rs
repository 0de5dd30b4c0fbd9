//! Web dashboard for trading-desk
//!
//! An axum server exposing one dashboard page per session plus the JSON API
//! the page polls. Analyses run on background tasks; the page follows them
//! through `/api/sessions/{id}/status`.

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod templates;

pub use error::{ApiError, ApiResult};
pub use server::{router, serve};
pub use state::AppState;
pub use templates::Templates;
