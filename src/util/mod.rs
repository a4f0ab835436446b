//! Shared helpers

pub mod geometry;
pub mod time;
