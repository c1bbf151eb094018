//! API implementation submodules.
//!
//! Each submodule contains `impl Guesser` blocks that extend the public API.
//! The struct definition remains in `lib.rs`.

mod builder;
mod lookup;
mod refresh;
mod state;

pub use builder::GuesserBuilder;
pub(crate) use state::GuesserState;
