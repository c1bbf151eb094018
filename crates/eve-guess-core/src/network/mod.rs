//! Network access to the EVE Online ESI API.
//!
//! This module provides:
//! - A reqwest wrapper bound to one ESI base URL
//! - Retry-once semantics for transient failures
//! - [`EsiClient`], which implements every remote collaborator trait

mod client;
mod esi;
mod retry;

pub use client::{page_count, HttpClient};
pub use esi::EsiClient;
pub use retry::{retry_async, RetryConfig};
