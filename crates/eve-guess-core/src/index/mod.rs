//! Approximate name search.
//!
//! This module provides:
//! - The [`NameIndex`] / [`NameIndexBuilder`] seam the resolver depends on
//! - A Jaro-Winkler implementation used by default

mod jaro;
mod traits;

pub use jaro::{JaroWinklerIndex, JaroWinklerIndexBuilder};
pub use traits::{NameIndex, NameIndexBuilder};
