//! Word-level text helpers used by the chain during generation.

/// Characters allowed to trail a sentence terminator (`end."`, `stop!)`).
const CLOSING_MARKS: &[char] = &['"', '\'', ')', ']', '”', '’', '»'];

/// Characters that terminate a sentence.
const TERMINATORS: &[char] = &['.', '!', '?'];

/// Returns `true` if `word` ends a sentence.
///
/// Trailing closing quotes and brackets are ignored, so `"man!"` and
/// `(done.)` both count as sentence endings.
pub fn is_end_of_sentence(word: &str) -> bool {
	word.trim_end_matches(CLOSING_MARKS).ends_with(TERMINATORS)
}

/// Returns `word` with its first character uppercased.
///
/// The rest of the word is left unchanged.
pub fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
