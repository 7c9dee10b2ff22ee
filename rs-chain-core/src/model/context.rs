/// Sentinel word marking the start of a text block.
///
/// Stored in upper case so it never collides with a lowercased input word.
pub const START: &str = "START";

/// Sliding window over the most recent words of a text.
///
/// A `ContextWindow` always holds exactly `len()` slots. A fresh window is
/// empty padding followed by [`START`]; every [`shift`](Self::shift) drops
/// the oldest word and appends a lowercased one.
///
/// # Invariants
/// - The number of slots never changes after creation
/// - Padding slots (empty strings) only ever appear before `START`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextWindow {
	words: Vec<String>,
}

impl ContextWindow {
	/// Creates a window of `len` slots ending with the start sentinel.
	///
	/// `len` must be >= 1; [`Chain`](super::chain::Chain) enforces it.
	pub(crate) fn new(len: usize) -> Self {
		let mut words = vec![String::new(); len];
		if let Some(last) = words.last_mut() {
			*last = START.to_owned();
		}
		Self { words }
	}

	/// Number of slots in the window.
	pub fn len(&self) -> usize {
		self.words.len()
	}

	/// Always `false` for a window built by a [`Chain`](super::chain::Chain).
	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Drops the oldest word and appends `word` lowercased.
	pub fn shift(&mut self, word: &str) {
		if self.words.is_empty() {
			return;
		}
		self.words.rotate_left(1);
		if let Some(last) = self.words.last_mut() {
			*last = word.to_lowercase();
		}
	}

	/// Most recent word of the window.
	pub fn last(&self) -> &str {
		self.words.last().map(String::as_str).unwrap_or_default()
	}

	/// Returns `true` if slot `i` is padding from before `START`.
	pub(crate) fn is_padding(&self, i: usize) -> bool {
		self.words.get(i).is_some_and(String::is_empty)
	}

	/// Space-joined suffix of the window starting at slot `i`.
	///
	/// `tail(0)` is the full context, `tail(len())` the empty tail.
	pub(crate) fn tail(&self, i: usize) -> String {
		self.words[i.min(self.words.len())..].join(" ")
	}
}
