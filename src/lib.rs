//! Sticky-aware paginated topic listings.
//!
//! A listing page is composed from two collaborators: one that returns every
//! pinned item of a scope and one that counts and slices the ordinary items.
//! Pinned items fill the leading positions of the first pages; ordinary items
//! continue after them with no gaps or repeats across pages.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
