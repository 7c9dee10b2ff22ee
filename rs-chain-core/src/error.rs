//! Error types for chain construction and persistence.

use std::{fmt, io};

/// Errors raised while decoding a persisted frequency table.
#[derive(Debug)]
pub enum DecodeError {
	/// The JSON file is not an object of `{ tail: { word: count } }` objects.
	Json(serde_json::Error),
	/// The binary snapshot could not be decoded.
	Binary(postcard::Error),
}

impl fmt::Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Json(e) => write!(f, "invalid JSON model: {e}"),
			Self::Binary(e) => write!(f, "invalid binary model: {e}"),
		}
	}
}

impl std::error::Error for DecodeError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Json(e) => Some(e),
			Self::Binary(e) => Some(e),
		}
	}
}

/// Errors returned by [`Chain`](crate::model::chain::Chain) operations.
///
/// Training and generation never fail; only construction and
/// persistence report errors.
#[derive(Debug)]
pub enum ChainError {
	/// A chain needs at least one context slot for the start sentinel.
	InvalidContextLength(usize),
	/// The model file could not be opened, read, created or written.
	Io(io::Error),
	/// The model file was read but its content is malformed.
	Decode(DecodeError),
	/// The table could not be encoded into a binary snapshot.
	Encode(postcard::Error),
}

impl fmt::Display for ChainError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidContextLength(n) => write!(f, "context length must be >= 1, got {n}"),
			Self::Io(e) => write!(f, "model I/O failed: {e}"),
			Self::Decode(e) => write!(f, "model decoding failed: {e}"),
			Self::Encode(e) => write!(f, "model encoding failed: {e}"),
		}
	}
}

impl std::error::Error for ChainError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::InvalidContextLength(_) => None,
			Self::Io(e) => Some(e),
			Self::Decode(e) => Some(e),
			Self::Encode(e) => Some(e),
		}
	}
}

impl From<io::Error> for ChainError {
	fn from(e: io::Error) -> Self {
		Self::Io(e)
	}
}

impl From<DecodeError> for ChainError {
	fn from(e: DecodeError) -> Self {
		Self::Decode(e)
	}
}

/// Splits a `serde_json` failure into the I/O and decode kinds.
impl From<serde_json::Error> for ChainError {
	fn from(e: serde_json::Error) -> Self {
		if e.is_io() {
			Self::Io(e.into())
		} else {
			Self::Decode(DecodeError::Json(e))
		}
	}
}
