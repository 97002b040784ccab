use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::generator::GenerativeChain;
use super::sampler::choose_index_with_rng;
use super::state::State;
use crate::error::ChainError;

/// Precomputed candidates and cumulative distribution for one state.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CompressedChoices {
	/// Candidate next tokens, sorted by token.
	pub(crate) choices: Vec<String>,
	/// Strictly increasing partial sums of the candidates' counts.
	pub(crate) cum_dist: Vec<usize>,
}

/// An immutable, fast-sampling Markov chain.
///
/// Built once from a finished [`Chain`](super::chain::Chain) via `compress`;
/// every observed state carries its precomputed cumulative distribution, so
/// a walk step is a lookup plus one binary search.
///
/// Never mutated after construction. Concurrent `step` calls need no
/// synchronization: each call only reads shared state and draws from its own
/// random source.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CompressedChain {
	state_size: usize,
	model: HashMap<State, CompressedChoices>,
}

impl CompressedChain {
	pub(crate) fn from_parts(state_size: usize, model: HashMap<State, CompressedChoices>) -> Self {
		Self { state_size, model }
	}

	/// Number of distinct states observed during training.
	pub fn len(&self) -> usize {
		self.model.len()
	}

	/// Whether the chain holds no states at all.
	pub fn is_empty(&self) -> bool {
		self.model.is_empty()
	}
}

impl GenerativeChain for CompressedChain {
	fn state_size(&self) -> usize {
		self.state_size
	}

	fn step_with_rng<R: Rng + ?Sized>(&self, state: &State, rng: &mut R) -> Result<String, ChainError> {
		let next = self.model.get(state).ok_or(ChainError::StateNotFound)?;
		let index = choose_index_with_rng(&next.cum_dist, rng);
		Ok(next.choices[index].clone())
	}
}
