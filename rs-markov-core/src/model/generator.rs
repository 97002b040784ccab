use std::iter::repeat_n;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use super::state::{BEGIN, END, State, decode_state, encode_state};
use crate::error::ChainError;

/// Batch multiplier for threaded generation: each round launches
/// `num_cpus::get() * THREAD_FACTOR` independent attempts.
const THREAD_FACTOR: usize = 8;

/// Uniform walking capability shared by the mutable and compressed chains.
///
/// A generation walk only needs three things from a chain: its order, the
/// minimum accepted sentence length, and a single weighted random step.
pub trait GenerativeChain {
	/// The Markov order: number of tokens forming a state.
	fn state_size(&self) -> usize;

	/// Minimum length of an accepted pruned sentence, and the size of the
	/// trailing window handed to validators.
	fn max_overlap(&self) -> usize {
		self.state_size() + 2
	}

	/// Draws the next token for `state`, or fails with
	/// [`ChainError::StateNotFound`] if the state was never observed.
	fn step(&self, state: &State) -> Result<String, ChainError> {
		self.step_with_rng(state, &mut rand::rng())
	}

	/// Draws the next token using a caller-supplied RNG.
	///
	/// This exists primarily for deterministic testing.
	fn step_with_rng<R: Rng + ?Sized>(&self, state: &State, rng: &mut R) -> Result<String, ChainError>;
}

/// Seed tokens that belong in the output: everything except literal
/// `BEGIN`/`END` occurrences.
fn initialize_generation(seed: &[String]) -> Vec<String> {
	seed.iter()
		.filter(|token| token.as_str() != BEGIN && token.as_str() != END)
		.cloned()
		.collect()
}

/// Builds the initial walk context from the decoded seed.
///
/// Left-pads with `BEGIN` up to `state_size`, then takes the seed's trailing
/// tokens. A seed longer than `state_size` contributes only its last
/// `state_size` tokens to the walk's memory; the earlier ones still appear
/// in the output.
fn pad_state(state_size: usize, seed: &[String]) -> Vec<String> {
	let mut context = Vec::with_capacity(state_size);
	context.extend(repeat_n(BEGIN.to_owned(), state_size.saturating_sub(seed.len())));
	let tail = seed.len().saturating_sub(state_size);
	context.extend(seed[tail..].iter().cloned());
	context
}

/// Generates a token sequence by an unconstrained weighted random walk.
///
/// `start` is a pre-encoded state key, or the empty string for an unseeded
/// walk from the all-`BEGIN` state. The walk runs until it draws `END`
/// (success) or reaches an unobserved state ([`ChainError::StateNotFound`]).
/// There is no iteration cap: a corpus whose transitions form a cycle that
/// avoids `END` makes this loop forever.
pub fn generate<C>(chain: &C, start: &str) -> Result<Vec<String>, ChainError>
where
	C: GenerativeChain + ?Sized,
{
	generate_with_rng(chain, start, &mut rand::rng())
}

/// [`generate`] with a caller-supplied RNG for reproducible walks.
pub fn generate_with_rng<C, R>(chain: &C, start: &str, rng: &mut R) -> Result<Vec<String>, ChainError>
where
	C: GenerativeChain + ?Sized,
	R: Rng + ?Sized,
{
	let seed = decode_state(start);
	let mut generated = initialize_generation(&seed);
	let mut context = pad_state(chain.state_size(), &seed);

	loop {
		let key = encode_state(&context);
		let next = chain.step_with_rng(&key, rng)?;
		if next == END {
			break;
		}
		generated.push(next.clone());
		context.remove(0);
		context.push(next);
	}

	Ok(generated)
}

/// Generates a token sequence, rejecting it as soon as a trailing window
/// fails validation.
///
/// Once the output reaches `max_overlap` tokens, `valid_gram` is evaluated
/// on the trailing `max_overlap` window after every append; a `false` aborts
/// with [`ChainError::SentenceFailedValidation`]. A walk that draws `END`
/// before reaching `max_overlap` tokens fails with
/// [`ChainError::SentenceTooShort`], so every accepted sentence has passed
/// at least one full window check.
pub fn generate_pruned<C, F>(chain: &C, start: &str, valid_gram: F) -> Result<Vec<String>, ChainError>
where
	C: GenerativeChain + ?Sized,
	F: Fn(&[String]) -> bool,
{
	generate_pruned_with_rng(chain, start, valid_gram, &mut rand::rng())
}

/// [`generate_pruned`] with a caller-supplied RNG for reproducible walks.
pub fn generate_pruned_with_rng<C, F, R>(
	chain: &C,
	start: &str,
	valid_gram: F,
	rng: &mut R,
) -> Result<Vec<String>, ChainError>
where
	C: GenerativeChain + ?Sized,
	F: Fn(&[String]) -> bool,
	R: Rng + ?Sized,
{
	let seed = decode_state(start);
	let mut generated = initialize_generation(&seed);
	let mut context = pad_state(chain.state_size(), &seed);
	let max_overlap = chain.max_overlap();

	loop {
		let key = encode_state(&context);
		let next = chain.step_with_rng(&key, rng)?;
		if next == END {
			break;
		}
		generated.push(next.clone());
		if generated.len() >= max_overlap && !valid_gram(&generated[generated.len() - max_overlap..]) {
			return Err(ChainError::SentenceFailedValidation);
		}
		context.remove(0);
		context.push(next);
	}

	if generated.len() < max_overlap {
		return Err(ChainError::SentenceTooShort);
	}
	Ok(generated)
}

/// Time-bounded concurrent rejection sampling over pruned generation.
///
/// Runs rounds of `num_cpus * 8` independent [`generate_pruned`] attempts on
/// worker threads, collecting every result of the round:
/// - the first success in collection order wins, even if the deadline has
///   already passed by then;
/// - [`ChainError::StateNotFound`] from any attempt aborts the whole call —
///   it signals an unreachable state, which no retry can fix;
/// - a round where every attempt was rejected checks the elapsed time and
///   either fails with [`ChainError::GenerationTimeout`] or starts over.
///
/// The timeout is only inspected at round boundaries, so the effective
/// overrun can exceed `timeout` by up to one round. Attempts are never
/// cancelled mid-walk; the round joins all of its workers before returning.
pub fn generate_threaded<C, F>(
	chain: &C,
	start: &str,
	valid_gram: F,
	timeout: Duration,
) -> Result<Vec<String>, ChainError>
where
	C: GenerativeChain + Sync + ?Sized,
	F: Fn(&[String]) -> bool + Sync,
{
	let start_time = Instant::now();
	let batch_size = num_cpus::get() * THREAD_FACTOR;

	loop {
		let winner = thread::scope(|scope| -> Result<Option<Vec<String>>, ChainError> {
			let (tx, rx) = mpsc::channel();
			for _ in 0..batch_size {
				let tx = tx.clone();
				let valid_gram = &valid_gram;
				scope.spawn(move || {
					let attempt = generate_pruned(chain, start, valid_gram);
					// The receiver may be gone if the round aborted early.
					let _ = tx.send(attempt);
				});
			}
			drop(tx);

			let mut winner = None;
			for attempt in rx.iter() {
				match attempt {
					Ok(words) if winner.is_none() => winner = Some(words),
					Ok(_) => {}
					Err(ChainError::StateNotFound) => return Err(ChainError::StateNotFound),
					Err(_) => {}
				}
			}
			Ok(winner)
		})?;

		if let Some(words) = winner {
			return Ok(words);
		}
		if start_time.elapsed() > timeout {
			return Err(ChainError::GenerationTimeout);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::chain::Chain;
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	fn run(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| (*w).to_owned()).collect()
	}

	fn abc_chain() -> Chain {
		let mut chain = Chain::new(1);
		chain.build(&[run(&["a", "b", "c"])]);
		chain
	}

	#[test]
	fn plain_generation_walks_to_end() {
		let chain = abc_chain();
		let mut rng = ChaCha8Rng::seed_from_u64(0);
		// Deterministic corpus: only one path exists.
		assert_eq!(generate_with_rng(&chain, "", &mut rng).unwrap(), run(&["a", "b", "c"]));
	}

	#[test]
	fn plain_generation_never_emits_sentinels() {
		let mut chain = Chain::new(1);
		chain.build(&[run(&["a", "b"]), run(&["b", "a"]), run(&["a"])]);

		let mut rng = ChaCha8Rng::seed_from_u64(17);
		for _ in 0..100 {
			let words = generate_with_rng(&chain, "", &mut rng).unwrap();
			for word in &words {
				assert!(word == "a" || word == "b");
			}
		}
	}

	#[test]
	fn seeded_generation_prepends_seed_tokens() {
		let chain = abc_chain();
		let mut rng = ChaCha8Rng::seed_from_u64(2);
		let start = encode_state(&run(&[BEGIN, "a"]));
		// BEGIN is stripped from the output but the walk resumes after "a".
		assert_eq!(
			generate_with_rng(&chain, &start, &mut rng).unwrap(),
			run(&["a", "b", "c"])
		);
	}

	#[test]
	fn long_seed_keeps_only_trailing_context() {
		let chain = abc_chain();
		let mut rng = ChaCha8Rng::seed_from_u64(2);
		// "x" was never trained; it rides along in the output while the
		// walk's memory is just the trailing token "a".
		let start = encode_state(&run(&["x", "a"]));
		assert_eq!(
			generate_with_rng(&chain, &start, &mut rng).unwrap(),
			run(&["x", "a", "b", "c"])
		);
	}

	#[test]
	fn unknown_seed_fails_everywhere() {
		let chain = abc_chain();
		let start = encode_state(&run(&["nope", "nada"]));

		let mut rng = ChaCha8Rng::seed_from_u64(0);
		assert_eq!(
			generate_with_rng(&chain, &start, &mut rng),
			Err(ChainError::StateNotFound)
		);
		assert_eq!(
			generate_pruned_with_rng(&chain, &start, |_| true, &mut rng),
			Err(ChainError::StateNotFound)
		);
		assert_eq!(
			generate_threaded(&chain, &start, |_| true, Duration::from_secs(5)),
			Err(ChainError::StateNotFound)
		);
	}

	#[test]
	fn pruned_accepts_when_long_enough() {
		let chain = abc_chain();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		// max_overlap = 3 and the only sentence is exactly 3 tokens.
		assert_eq!(
			generate_pruned_with_rng(&chain, "", |_| true, &mut rng).unwrap(),
			run(&["a", "b", "c"])
		);
	}

	#[test]
	fn pruned_rejects_short_sentences() {
		let mut chain = Chain::new(1);
		chain.build(&[run(&["a"])]);

		let mut rng = ChaCha8Rng::seed_from_u64(1);
		assert_eq!(
			generate_pruned_with_rng(&chain, "", |_| true, &mut rng),
			Err(ChainError::SentenceTooShort)
		);
	}

	#[test]
	fn pruned_propagates_validator_rejection() {
		let chain = abc_chain();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		assert_eq!(
			generate_pruned_with_rng(&chain, "", |_| false, &mut rng),
			Err(ChainError::SentenceFailedValidation)
		);
	}

	#[test]
	fn pruned_validator_sees_full_trailing_window() {
		let chain = abc_chain();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		let result = generate_pruned_with_rng(
			&chain,
			"",
			|window: &[String]| {
				assert_eq!(window.len(), 3);
				true
			},
			&mut rng,
		);
		assert!(result.is_ok());
	}

	#[test]
	fn threaded_returns_accepted_sentence() {
		let chain = abc_chain();
		let result = generate_threaded(&chain, "", |_| true, Duration::from_secs(5));
		assert_eq!(result.unwrap(), run(&["a", "b", "c"]));
	}

	#[test]
	fn threaded_times_out_on_hopeless_validator() {
		let chain = abc_chain();
		let timeout = Duration::from_millis(200);

		let begun = Instant::now();
		let result = generate_threaded(&chain, "", |_| false, timeout);
		let elapsed = begun.elapsed();

		assert_eq!(result, Err(ChainError::GenerationTimeout));
		assert!(elapsed >= timeout);
		assert!(elapsed < Duration::from_secs(10), "took {elapsed:?}");
	}

	#[test]
	fn threaded_works_on_compressed_chain() {
		let compressed = abc_chain().compress();
		let result = generate_threaded(&compressed, "", |_| true, Duration::from_secs(5));
		assert_eq!(result.unwrap(), run(&["a", "b", "c"]));
	}
}
