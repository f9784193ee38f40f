//! Domain types for the watch pipeline.

pub mod change_set;
pub mod config;
pub mod snapshot;
pub mod summary;
