//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/content_type.rs (reject form-submittable types)
//!     → handlers.rs (extract, call FlagService, shape JSON)
//!     → error.rs (map failures to status + body)
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{AppState, HttpServer};
