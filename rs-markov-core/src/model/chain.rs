use std::collections::HashMap;
use std::iter::repeat_n;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::compressed::{CompressedChain, CompressedChoices};
use super::generator::GenerativeChain;
use super::sampler::{calculate_cum_dist, choose_index_with_rng};
use super::state::{BEGIN, END, State, encode_state};
use crate::error::ChainError;

/// A mutable n-gram Markov chain under construction.
///
/// Stores raw transition counts from each observed state (a fixed-length
/// token context) to the tokens that followed it in the corpus.
///
/// # Responsibilities
/// - Accumulate transition counts from one or more corpora (training is
///   additive across `build` calls, never replacing)
/// - Serve single walk steps, computing distributions on demand
/// - Freeze into a [`CompressedChain`] for fast repeated sampling
///
/// # Invariants
/// - Every recorded transition count is >= 1
/// - The all-`BEGIN` start-state distribution is cached after each `build`,
///   since every unseeded generation begins there
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Chain {
	/// The Markov order: number of tokens forming a state.
	state_size: usize,

	/// Transition counts: state key -> (next token -> occurrences).
	model: HashMap<State, HashMap<String, usize>>,

	/// Encoded key of the all-`BEGIN` start state.
	begin_state: State,

	/// Cached candidate tokens for the start state.
	begin_choices: Vec<String>,

	/// Cached cumulative distribution for the start state.
	begin_cum_dist: Vec<usize>,
}

impl Chain {
	/// Creates an empty chain of the given Markov order.
	///
	/// `state_size` must be at least 1; this is not validated.
	pub fn new(state_size: usize) -> Self {
		let begin_tokens: Vec<String> = repeat_n(BEGIN.to_owned(), state_size).collect();
		Self {
			state_size,
			model: HashMap::new(),
			begin_state: encode_state(&begin_tokens),
			begin_choices: Vec::new(),
			begin_cum_dist: Vec::new(),
		}
	}

	/// Trains the chain on a corpus of token runs, mutating in place.
	///
	/// Each run is padded with `state_size` copies of `BEGIN` in front and a
	/// single `END` behind, then a window of `state_size` tokens slides over
	/// offsets `0..=run.len()`: the window is the state, the token right
	/// after it is the observed transition.
	///
	/// # Notes
	/// - Counts accumulate across repeated calls on the same chain.
	/// - Returns `&mut self` for chaining.
	/// - Tokens must not contain the separator sentinel or equal
	///   `BEGIN`/`END`; nothing rejects them here.
	pub fn build(&mut self, corpus: &[Vec<String>]) -> &mut Self {
		for run in corpus {
			let mut items: Vec<String> = Vec::with_capacity(self.state_size + run.len() + 1);
			items.extend(repeat_n(BEGIN.to_owned(), self.state_size));
			items.extend(run.iter().cloned());
			items.push(END.to_owned());

			// One window per token position, plus one for the move into END.
			for i in 0..=run.len() {
				let state = encode_state(&items[i..i + self.state_size]);
				let follow = items[i + self.state_size].clone();
				*self.model.entry(state).or_default().entry(follow).or_insert(0) += 1;
			}
		}

		self.precompute_begin_state();
		self
	}

	/// Recomputes the cached distribution for the all-`BEGIN` start state.
	fn precompute_begin_state(&mut self) {
		let (choices, cum_dist) = match self.model.get(&self.begin_state) {
			Some(next) => calculate_cum_dist(next),
			None => (Vec::new(), Vec::new()),
		};
		self.begin_choices = choices;
		self.begin_cum_dist = cum_dist;
	}

	/// Freezes this chain into an immutable, fast-sampling representation.
	///
	/// Precomputes the cumulative distribution of every observed state. Pure
	/// and non-destructive: the source chain is untouched and may keep
	/// training, but later mutations do not propagate into the result.
	pub fn compress(&self) -> CompressedChain {
		let mut compressed = HashMap::with_capacity(self.model.len());
		for (state, next) in &self.model {
			let (choices, cum_dist) = calculate_cum_dist(next);
			compressed.insert(state.clone(), CompressedChoices { choices, cum_dist });
		}
		CompressedChain::from_parts(self.state_size, compressed)
	}
}

impl GenerativeChain for Chain {
	fn state_size(&self) -> usize {
		self.state_size
	}

	/// Draws the next token for `state` from the live count table.
	///
	/// The distribution is computed on demand, except for the start state
	/// which uses the cache refreshed by `build`.
	fn step_with_rng<R: Rng + ?Sized>(&self, state: &State, rng: &mut R) -> Result<String, ChainError> {
		let next = self.model.get(state).ok_or(ChainError::StateNotFound)?;

		if *state == self.begin_state {
			let index = choose_index_with_rng(&self.begin_cum_dist, rng);
			Ok(self.begin_choices[index].clone())
		} else {
			let (choices, cum_dist) = calculate_cum_dist(next);
			let index = choose_index_with_rng(&cum_dist, rng);
			Ok(choices[index].clone())
		}
	}
}
