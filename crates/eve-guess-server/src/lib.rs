//! HTTP surface for the eve-guess resolver.
//!
//! The binary in `main.rs` wires CLI flags, logging and the refresh loop
//! around [`server::router`].

pub mod handler;
pub mod server;
