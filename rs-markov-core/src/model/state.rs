/// Sentinel token padded in front of every training run.
///
/// `state_size` copies of it form the universal start state that every
/// unseeded generation begins from. Never emitted in generated output.
pub const BEGIN: &str = "</BEGIN/>";

/// Sentinel token appended after every training run; drawing it terminates
/// a generation walk. Never emitted in generated output.
pub const END: &str = "</END/>";

/// Separator used to join the tokens of a state into a single key.
///
/// Reserved: corpus tokens must never contain this substring, or encoding
/// stops being injective. No validation is performed at ingestion time.
pub const SEP: &str = "</SEP/>";

/// A state key: exactly `state_size` tokens joined with [`SEP`].
///
/// The empty string doubles as the unseeded sentinel accepted by all
/// generation entry points.
pub type State = String;

/// Encodes an ordered token context into a single state key.
///
/// # Notes
/// - The caller guarantees no token contains [`SEP`]; nothing is checked here.
pub fn encode_state(tokens: &[String]) -> State {
	tokens.join(SEP)
}

/// Decodes a state key back into its ordered token sequence.
///
/// A key containing no separator decodes to an empty sequence. This is how
/// the unseeded case (the empty key) is detected, and it means a one-token
/// key also decodes to empty; with `state_size >= 2` that cannot arise from
/// [`encode_state`].
pub fn decode_state(state: &str) -> Vec<String> {
	if !state.contains(SEP) {
		return Vec::new();
	}
	state.split(SEP).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| (*w).to_owned()).collect()
	}

	#[test]
	fn round_trip_preserves_tokens() {
		let original = tokens(&["the", "quick", "fox"]);
		assert_eq!(decode_state(&encode_state(&original)), original);
	}

	#[test]
	fn empty_key_decodes_to_no_tokens() {
		assert!(decode_state("").is_empty());
	}

	#[test]
	fn key_without_separator_decodes_to_no_tokens() {
		// Inherited from the string-keyed encoding: one token, no separator.
		assert!(decode_state("lonely").is_empty());
	}

	#[test]
	fn sentinels_survive_encoding() {
		let begin_state = tokens(&[BEGIN, BEGIN]);
		assert_eq!(decode_state(&encode_state(&begin_state)), begin_state);
	}
}
