//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load key → Connect RPC → Probe chain → AppContext (or degraded)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Listener binds after the context is built
//! - In-flight claim runs and transfers finish on their own tasks

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{initialize, AppContext};
