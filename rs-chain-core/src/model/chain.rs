use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, info, trace, warn};
use rand::Rng;

use super::context::ContextWindow;
use super::table::FrequencyTable;
use crate::error::{ChainError, DecodeError};
use crate::io::ModelFormat;
use crate::text::{capitalize, is_end_of_sentence};

/// Word-level Markov chain with backoff over shorter contexts.
///
/// Every observation is recorded under each tail of its context, from the
/// full `context_length` words down to the empty tail. Generation looks up
/// the longest known tail first and falls back to shorter ones, so unseen
/// contexts still produce a continuation as long as anything was trained.
///
/// # Responsibilities
/// - Build the frequency table from a word stream
/// - Pick next words with frequency-weighted sampling
/// - Generate bounded continuations of a seed, cut at sentence endings
/// - Save and load the frequency table
///
/// # Invariants
/// - `context_length` is >= 1 and fixed for the lifetime of the chain
/// - `stats` has `context_length + 1` entries
/// - Once anything was trained, the empty tail exists in the table
#[derive(Debug, Clone)]
pub struct Chain {
	context_length: usize,
	table: FrequencyTable,
	stats: Vec<usize>,
}

impl Chain {
	/// Creates an empty chain keyed on up to `context_length` words.
	///
	/// # Errors
	/// Returns [`ChainError::InvalidContextLength`] if `context_length` is 0.
	pub fn new(context_length: usize) -> Result<Self, ChainError> {
		if context_length == 0 {
			return Err(ChainError::InvalidContextLength(context_length));
		}
		Ok(Self {
			context_length,
			table: FrequencyTable::default(),
			stats: vec![0; context_length + 1],
		})
	}

	pub fn context_length(&self) -> usize {
		self.context_length
	}

	/// Returns a fresh window for this chain: padding, then the start sentinel.
	pub fn context(&self) -> ContextWindow {
		ContextWindow::new(self.context_length)
	}

	/// Number of distinct tails stored in the chain.
	pub fn size(&self) -> usize {
		self.table.tail_count()
	}

	pub fn is_empty(&self) -> bool {
		self.size() == 0
	}

	/// Histogram of how many context words were used per generated word.
	///
	/// Entry `k` counts the words picked from a tail of `k` words, so entry 0
	/// counts pure fallbacks and entry `context_length` full-context hits.
	/// The returned vector is a copy.
	pub fn stats(&self) -> Vec<usize> {
		self.stats.clone()
	}

	/// Occurrence count of `word` after `tail` (0 if never observed).
	pub fn count(&self, tail: &str, word: &str) -> usize {
		self.table.count(tail, word)
	}

	/// Records `word` as following `context`, under every tail of `context`.
	///
	/// Tails that would start on padding (slots before `START`) are skipped.
	/// The empty tail is always recorded.
	pub fn add(&mut self, context: &ContextWindow, word: &str) {
		for i in 0..=self.context_length {
			if i < self.context_length && context.is_padding(i) {
				continue;
			}
			self.table.increment(&context.tail(i), word);
		}
	}

	/// Trains the chain on whitespace-separated words read from `reader`.
	///
	/// The stream is read until exhausted. Invalid UTF-8 sequences are
	/// replaced with U+FFFD. A read failure ends training early and is not
	/// reported as an error.
	pub fn build<R: Read>(&mut self, reader: R) {
		let mut reader = BufReader::new(reader);
		let mut context = self.context();
		let mut consumed = 0usize;
		let mut line = Vec::new();

		loop {
			line.clear();
			match reader.read_until(b'\n', &mut line) {
				Ok(0) => break,
				Ok(_) => (),
				Err(e) => {
					warn!("training stream stopped after {consumed} words: {e}");
					break;
				}
			}
			for word in String::from_utf8_lossy(&line).split_whitespace() {
				self.add(&context, word);
				context.shift(word);
				consumed += 1;
			}
		}

		debug!("trained on {consumed} words, {} tails stored", self.size());
	}

	/// Trains the chain on an in-memory text.
	pub fn build_str(&mut self, text: &str) {
		self.build(text.as_bytes());
	}

	/// Picks a word to follow `context`, or `None` on an untrained chain.
	///
	/// Tails are tried from the full context down to the empty one; the first
	/// known tail is sampled with probability proportional to the counts.
	///
	/// # Side effects
	/// Increments the [`stats`](Self::stats) entry of the tail length used.
	///
	/// # Notes
	/// A word drawn from the empty tail carries no context, so its case is
	/// recomputed: capitalized after a sentence ending, lowercase otherwise.
	pub fn next_word<R: Rng>(&mut self, context: &ContextWindow, rng: &mut R) -> Option<String> {
		for i in 0..=self.context_length {
			let key = context.tail(i);
			if !self.table.contains_tail(&key) {
				continue;
			}

			self.stats[self.context_length - i] += 1;

			let Some(word) = self.table.pick(&key, rng) else {
				continue;
			};
			trace!("picked {word:?} after {key:?}");

			if key.is_empty() {
				return Some(if is_end_of_sentence(context.last()) {
					capitalize(word)
				} else {
					word.to_lowercase()
				});
			}
			return Some(word.to_owned());
		}
		None
	}

	/// Generates a continuation of `seed`.
	///
	/// At most `max_words` words are appended, and generation stops once
	/// `sentences` sentence endings were produced. If fewer sentences were
	/// completed but at least one was, the output is cut after the last
	/// complete one. With no sentence ending at all, the fragment is kept.
	///
	/// The seed words are returned as-is, joined by single spaces.
	pub fn generate<R: Rng>(&mut self, seed: &str, sentences: usize, max_words: usize, rng: &mut R) -> String {
		let mut words: Vec<String> = seed.split_whitespace().map(str::to_owned).collect();

		let mut context = self.context();
		for word in &words[words.len().saturating_sub(self.context_length)..] {
			context.shift(word);
		}

		let mut sentence_count = 0;
		let mut sentence_end = 0;
		for _ in 0..max_words {
			if sentence_count >= sentences {
				break;
			}
			let Some(next) = self.next_word(&context, rng).filter(|word| !word.is_empty()) else {
				debug!("chain exhausted after {} words", words.len());
				break;
			};
			context.shift(&next);
			let ends_sentence = is_end_of_sentence(&next);
			words.push(next);
			if ends_sentence {
				sentence_count += 1;
				sentence_end = words.len();
			}
		}

		if sentence_count < sentences && sentence_end > 0 {
			words.truncate(sentence_end);
		}
		words.join(" ")
	}

	/// Saves the frequency table to `path`, in the format implied by its extension.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ChainError> {
		let format = ModelFormat::from_path(&path);
		self.save_as(path, format)
	}

	/// Saves the frequency table to `path` in the given `format`.
	///
	/// # Errors
	/// - [`ChainError::Io`] if the file cannot be created or written
	/// - [`ChainError::Encode`] if the binary snapshot cannot be encoded
	pub fn save_as<P: AsRef<Path>>(&self, path: P, format: ModelFormat) -> Result<(), ChainError> {
		let path = path.as_ref();
		let mut writer = BufWriter::new(File::create(path)?);
		match format {
			ModelFormat::Json => serde_json::to_writer(&mut writer, &self.table)?,
			ModelFormat::Binary => {
				let bytes = postcard::to_stdvec(&self.table).map_err(ChainError::Encode)?;
				writer.write_all(&bytes)?;
			}
		}
		writer.flush()?;
		info!("saved {} tails to {}", self.size(), path.display());
		Ok(())
	}

	/// Replaces the frequency table with the one stored at `path`.
	pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ChainError> {
		let format = ModelFormat::from_path(&path);
		self.load_as(path, format)
	}

	/// Replaces the frequency table with the one stored at `path` in `format`.
	///
	/// The table is swapped only once fully decoded; on error the chain is
	/// left untouched. Usage stats are kept.
	///
	/// # Errors
	/// - [`ChainError::Io`] if the file cannot be opened or read
	/// - [`ChainError::Decode`] if the content is not a `{ tail: { word: count } }` table
	pub fn load_as<P: AsRef<Path>>(&mut self, path: P, format: ModelFormat) -> Result<(), ChainError> {
		let path = path.as_ref();
		let table: FrequencyTable = match format {
			ModelFormat::Json => serde_json::from_reader(BufReader::new(File::open(path)?))?,
			ModelFormat::Binary => {
				let bytes = std::fs::read(path)?;
				postcard::from_bytes(&bytes).map_err(DecodeError::Binary)?
			}
		};
		self.table = table;
		info!("loaded {} tails from {}", self.size(), path.display());
		Ok(())
	}
}
