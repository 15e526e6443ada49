//! Domain layer: topics, listing scopes and their invariants.

pub mod entities;
pub mod error;
pub mod types;
