//! Query resolution against the published catalog.

mod filter;
pub mod normalize;
mod resolver;
pub mod shortcuts;

pub use filter::PublishedFilter;
pub use resolver::Resolver;
pub use shortcuts::{expand_shortcut, find_shortcut, SHORTCUTS};
