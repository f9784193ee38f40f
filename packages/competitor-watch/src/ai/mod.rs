//! Classification backend implementations.
//!
//! This module provides a reference implementation of the
//! `ClassificationBackend` trait. Users can use it directly or implement
//! their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiBackend;
