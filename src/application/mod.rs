//! Application services: page planning, composition and listing policy.

pub mod composer;
pub mod error;
pub mod links;
pub mod listing;
pub mod pagination;
pub mod pinned;
pub mod repos;
