//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, middleware)
//!     → request.rs (request id, tracing span)
//!     → handlers.rs (context lookup, spawn chain work)
//!     → claims / transfers
//!     → response.rs (JSON bodies, error mapping)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{AppState, HttpServer};
