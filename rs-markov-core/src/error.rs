use thiserror::Error;

/// Failure kinds produced by chain generation.
///
/// The four variants are deliberately non-overlapping and callers are
/// expected to match on them:
/// - `StateNotFound` is structural and always fatal: the walk reached a
///   context the model never observed, so retrying the same walk cannot help.
/// - `SentenceTooShort` and `SentenceFailedValidation` are local, retryable
///   rejections only produced by the pruned and threaded modes.
/// - `GenerationTimeout` is terminal for a single threaded call; the caller
///   may issue a fresh invocation.
///
/// No failure is ever logged or swallowed internally; everything is returned
/// to the immediate caller.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainError {
	/// The current walk context has no entry in the model.
	#[error("state does not exist in model")]
	StateNotFound,

	/// Generation reached `END` before accumulating `state_size + 2` tokens
	/// under the pruned mode.
	#[error("generated sentence too short")]
	SentenceTooShort,

	/// The validator rejected a trailing window during a pruned walk.
	#[error("sentence failed validation")]
	SentenceFailedValidation,

	/// Concurrent rejection sampling found no accepted sample in time.
	#[error("sentence generation timed out")]
	GenerationTimeout,
}
