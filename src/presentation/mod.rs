//! Views and text templates for composed listings.

pub mod views;
