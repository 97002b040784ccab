//! Top-level module for the Markov-chain engine.
//!
//! This crate provides an n-gram Markov chain over opaque string tokens:
//! - State encoding (`state`)
//! - Weighted random sampling over cumulative distributions (`sampler`)
//! - Mutable frequency-table chain and training (`chain`)
//! - Immutable compressed chain for fast repeated sampling (`compressed`)
//! - The three generation strategies (`generator`)

/// Mutable n-gram chain: training from corpora and compression.
pub mod chain;

/// Immutable compressed chain with precomputed distributions.
pub mod compressed;

/// Generation engine: the `GenerativeChain` seam plus plain, pruned and
/// threaded generation.
pub mod generator;

/// Weighted random selection over cumulative frequency distributions.
pub mod sampler;

/// State keys, the reserved sentinels, and the encode/decode codec.
pub mod state;
