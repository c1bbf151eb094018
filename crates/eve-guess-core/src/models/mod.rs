//! Data models shared across the crate.

mod entity;

pub use entity::{AsEntity, Category, Entity, ServerStatus, TypeInfo};
