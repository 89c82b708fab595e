//! # Scribe Server
//!
//! The actix-web HTTP layer: configuration, shared state, middleware and
//! handlers. The binary in `main.rs` wires these together; integration
//! tests assemble the same pieces over in-memory repositories.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
