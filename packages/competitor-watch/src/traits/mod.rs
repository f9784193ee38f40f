//! Core trait abstractions for the watch pipeline.
//!
//! These traits define the seams where applications plug in page
//! fetching, persistence and change classification.

pub mod backend;
pub mod fetcher;
pub mod store;
