//! Word-level Markov chain text generation library.
//!
//! This crate provides a context-backoff Markov chain including:
//! - Training from any word stream
//! - Frequency-weighted continuation of a seed text, bounded by words and sentences
//! - JSON and binary persistence of the trained table
//!
//! Randomness is always injected by the caller, so a seeded generator
//! reproduces the same output.

/// Chain model, context window and generation logic.
pub mod model;

/// Sentence-boundary and capitalization helpers.
pub mod text;

/// Error types for construction and persistence.
pub mod error;

/// Model file formats and path helpers.
pub mod io;
