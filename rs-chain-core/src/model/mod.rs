//! Top-level module for the Markov chain.
//!
//! - Fixed-length context windows (`ContextWindow`)
//! - The chain itself: training, sampling, generation, persistence (`Chain`)
//! - Internal frequency storage (`FrequencyTable`)

/// Word-level Markov chain with multi-length context backoff.
pub mod chain;

/// Sliding window over the most recent words.
pub mod context;

/// Flat `(tail, word) -> count` storage with weighted sampling.
///
/// Not exposed publicly.
mod table;
