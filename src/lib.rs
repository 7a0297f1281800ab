//! Treasury claim orchestration and settlement service.

pub mod blockchain;
pub mod claims;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod transfers;

pub use config::schema::TreasuryConfig;
pub use http::HttpServer;
pub use lifecycle::{AppContext, Shutdown};
