use std::collections::BTreeMap;

use rand::Rng;

use serde::{Deserialize, Serialize};

/// Persisted shape of a [`FrequencyTable`]: `{ tail: { word: count } }`.
pub(crate) type NestedTable = BTreeMap<String, BTreeMap<String, usize>>;

/// Occurrence counts of next words, keyed by `(tail, word)`.
///
/// A single flat ordered map replaces the tail → word → count nesting.
/// All words observed after a tail are contiguous in key order, which gives
/// lookups by tail and a canonical (lexicographic) enumeration of its words.
///
/// # Invariants
/// - Every stored count is >= 1
/// - A tail is present iff at least one word was recorded after it
/// - `tails` is the number of distinct tails in `counts`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "NestedTable", into = "NestedTable")]
pub(crate) struct FrequencyTable {
	counts: BTreeMap<(String, String), usize>,
	tails: usize,
}

impl FrequencyTable {
	/// Records one occurrence of `word` following `tail`.
	pub fn increment(&mut self, tail: &str, word: &str) {
		if !self.contains_tail(tail) {
			self.tails += 1;
		}
		*self.counts.entry((tail.to_owned(), word.to_owned())).or_insert(0) += 1;
	}

	/// Number of distinct tails.
	pub fn tail_count(&self) -> usize {
		self.tails
	}

	pub fn contains_tail(&self, tail: &str) -> bool {
		self.words_after(tail).next().is_some()
	}

	/// Occurrence count of `word` after `tail` (0 if never observed).
	pub fn count(&self, tail: &str, word: &str) -> usize {
		self.counts
			.get(&(tail.to_owned(), word.to_owned()))
			.copied()
			.unwrap_or(0)
	}

	/// Words observed after `tail` with their counts, in lexicographic order.
	pub fn words_after<'a>(&'a self, tail: &'a str) -> impl Iterator<Item = (&'a str, usize)> + 'a {
		self.counts
			.range((tail.to_owned(), String::new())..)
			.take_while(move |((t, _), _)| t == tail)
			.map(|((_, word), count)| (word.as_str(), *count))
	}

	/// Picks a word observed after `tail`, weighted by its count.
	///
	/// Draws `n` uniformly in `[0, total)` and walks the words in
	/// lexicographic order, subtracting each count from `n`. The first word
	/// for which the remainder drops to zero or below is returned.
	///
	/// Returns `None` if `tail` is unknown or its counts sum to zero.
	pub fn pick<'a, R: Rng>(&'a self, tail: &'a str, rng: &mut R) -> Option<&'a str> {
		let total: usize = self.words_after(tail).map(|(_, count)| count).sum();
		if total == 0 {
			return None;
		}

		let mut n = rng.random_range(0..total);

		let mut fallback = None;
		for (word, count) in self.words_after(tail) {
			if n <= count {
				return Some(word);
			}
			n -= count;
			fallback = Some(word);
		}

		// Unreachable while n < total, kept for safety
		fallback
	}
}

impl From<NestedTable> for FrequencyTable {
	/// Flattens a decoded table, dropping zero counts and empty tails.
	///
	/// Empty words and words containing whitespace are dropped as well: they
	/// could never come out of training and would not survive a join.
	fn from(nested: NestedTable) -> Self {
		let mut table = Self::default();
		for (tail, words) in nested {
			let mut seen = false;
			let valid = words
				.into_iter()
				.filter(|(word, count)| *count > 0 && !word.is_empty() && !word.contains(char::is_whitespace));
			for (word, count) in valid {
				table.counts.insert((tail.clone(), word), count);
				seen = true;
			}
			if seen {
				table.tails += 1;
			}
		}
		table
	}
}

impl From<FrequencyTable> for NestedTable {
	fn from(table: FrequencyTable) -> Self {
		let mut nested = NestedTable::new();
		for ((tail, word), count) in table.counts {
			nested.entry(tail).or_default().insert(word, count);
		}
		nested
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn increment_tracks_tails_and_counts() {
		let mut table = FrequencyTable::default();
		table.increment("i am", "a");
		table.increment("i am", "not");
		table.increment("i am", "a");
		table.increment("", "I");

		assert_eq!(table.tail_count(), 2);
		assert_eq!(table.count("i am", "a"), 2);
		assert_eq!(table.count("i am", "not"), 1);
		assert_eq!(table.count("i am", "free"), 0);
		assert!(table.contains_tail(""));
		assert!(!table.contains_tail("i"));
	}

	#[test]
	fn words_after_is_sorted_and_scoped_to_tail() {
		let mut table = FrequencyTable::default();
		table.increment("am", "not");
		table.increment("am", "a");
		table.increment("am a", "free");
		table.increment("a", "number!");

		let words: Vec<_> = table.words_after("am").collect();
		assert_eq!(words, vec![("a", 1), ("not", 1)]);
		assert_eq!(table.words_after("zzz").count(), 0);
	}

	#[test]
	fn pick_single_word_is_certain() {
		let mut table = FrequencyTable::default();
		table.increment("tail", "only");
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..20 {
			assert_eq!(table.pick("tail", &mut rng), Some("only"));
		}
		assert_eq!(table.pick("missing", &mut rng), None);
	}

	#[test]
	fn pick_first_word_takes_draws_up_to_its_count() {
		// Draws 0..=2 land on "a", only draw 3 lands on "b".
		let mut table = FrequencyTable::default();
		for _ in 0..2 {
			table.increment("t", "a");
			table.increment("t", "b");
		}
		let mut rng = StdRng::seed_from_u64(42);
		let mut hits = 0;
		for _ in 0..4000 {
			if table.pick("t", &mut rng) == Some("a") {
				hits += 1;
			}
		}
		assert!(hits > 2700 && hits < 3300, "unexpected share for \"a\": {hits}");
	}

	#[test]
	fn nested_conversion_drops_zero_counts() {
		let mut nested = NestedTable::new();
		nested.entry("i".to_owned()).or_default().insert("am".to_owned(), 2);
		nested.entry("i".to_owned()).or_default().insert("was".to_owned(), 0);
		nested.entry("dead".to_owned()).or_default().insert("end".to_owned(), 0);
		nested.entry("empty".to_owned()).or_default();

		let table = FrequencyTable::from(nested);
		assert_eq!(table.tail_count(), 1);
		assert_eq!(table.count("i", "am"), 2);
		assert!(!table.contains_tail("dead"));

		let back = NestedTable::from(table);
		assert_eq!(back.len(), 1);
		assert_eq!(back["i"].len(), 1);
	}

	#[test]
	fn nested_conversion_drops_unjoinable_words() {
		let mut nested = NestedTable::new();
		nested.entry(String::new()).or_default().insert(String::new(), 3);
		nested.entry(String::new()).or_default().insert("two words".to_owned(), 1);
		nested.entry("hello".to_owned()).or_default().insert(" ".to_owned(), 2);
		nested.entry("hello".to_owned()).or_default().insert("world".to_owned(), 2);

		let table = FrequencyTable::from(nested);
		assert_eq!(table.tail_count(), 1);
		assert!(!table.contains_tail(""));
		assert_eq!(table.words_after("hello").collect::<Vec<_>>(), vec![("world", 2)]);
	}
}
