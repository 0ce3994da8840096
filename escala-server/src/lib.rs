//! escala-server: REST backend for ministry scheduling
//!
//! Songs, artists, members, roles and the events they are scheduled for,
//! stored in PostgreSQL (or in memory for tests and demos) and served as
//! JSON over HTTP.

pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
pub mod state;

pub use error::{AppError, AppResult, ErrorKind};
pub use http::{build_router, run_server, ServeError, ServerConfig};
pub use state::AppState;
