//! Generic n-gram Markov-chain engine.
//!
//! Given a corpus of token runs, this crate learns transition frequencies
//! over fixed-length contexts and generates new token sequences by weighted
//! random walks:
//! - Build a [`Chain`] from one or more corpora (training is additive)
//! - Optionally freeze it into a [`CompressedChain`] with precomputed
//!   cumulative distributions for fast concurrent sampling
//! - Generate plain, validated ([`generate_pruned`]) or time-bounded
//!   concurrent ([`generate_threaded`]) token sequences
//!
//! Tokenization, corpus loading and output rendering are left to callers;
//! this crate only consumes token runs and produces token sequences or a
//! [`ChainError`].

/// Core chain models and generation logic.
pub mod model;

/// The four-kind failure taxonomy returned by generation.
pub mod error;

pub use error::ChainError;
pub use model::chain::Chain;
pub use model::compressed::{CompressedChain, CompressedChoices};
pub use model::generator::{
	GenerativeChain, generate, generate_pruned, generate_pruned_with_rng, generate_threaded,
	generate_with_rng,
};
pub use model::sampler::{choose_index, choose_index_with_rng};
pub use model::state::{BEGIN, END, SEP, State, decode_state, encode_state};
