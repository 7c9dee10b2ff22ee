use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk encoding of a chain's frequency table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelFormat {
	/// `{ tail: { word: count } }` JSON object.
	Json,
	/// Compact `postcard` snapshot of the same table.
	Binary,
}

impl ModelFormat {
	/// Extension written by [`build_output_path`] for this format.
	pub fn extension(self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Binary => "bin",
		}
	}

	/// Picks the format from a path: `.bin` is binary, anything else JSON.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		match path.as_ref().extension().and_then(OsStr::to_str) {
			Some(ext) if ext.eq_ignore_ascii_case("bin") => Self::Binary,
			_ => Self::Json,
		}
	}
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/input.txt` + `"json"` → `data/input.json`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Path of the model `name` saved in `dir` with the given extension.
///
/// The extension is appended, so dots inside `name` are kept:
/// `("data", "my.model", "json")` → `data/my.model.json`
pub fn model_path<P: AsRef<Path>>(dir: P, name: &str, extension: &str) -> PathBuf {
	dir.as_ref().join(format!("{name}.{extension}"))
}

/// Lists the stems of all saved models (`.json` or `.bin`) in a directory.
///
/// Returns sorted names without extension, deduplicated.
pub fn list_models<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut names = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}
		let known = [ModelFormat::Json, ModelFormat::Binary]
			.iter()
			.any(|format| path.extension() == Some(OsStr::new(format.extension())));
		if !known {
			continue;
		}
		if let Some(stem) = path.file_stem() {
			names.push(stem.to_string_lossy().to_string());
		}
	}

	names.sort();
	names.dedup();
	Ok(names)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn format_follows_extension() {
		assert_eq!(ModelFormat::from_path("model.bin"), ModelFormat::Binary);
		assert_eq!(ModelFormat::from_path("MODEL.BIN"), ModelFormat::Binary);
		assert_eq!(ModelFormat::from_path("model.json"), ModelFormat::Json);
		assert_eq!(ModelFormat::from_path("model"), ModelFormat::Json);
	}

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/input.txt", "json").unwrap();
		assert_eq!(path, PathBuf::from("data/input.json"));
		assert!(build_output_path("", "json").is_err());
	}

	#[test]
	fn model_path_keeps_dots_in_name() {
		assert_eq!(model_path("data", "my.model", "json"), PathBuf::from("data/my.model.json"));
		assert_eq!(model_path("data", "austen", ModelFormat::Binary.extension()), PathBuf::from("data/austen.bin"));
	}

	#[test]
	fn lists_only_model_files() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("shakespeare.json"), "{}").unwrap();
		fs::write(dir.path().join("shakespeare.bin"), b"").unwrap();
		fs::write(dir.path().join("austen.bin"), b"").unwrap();
		fs::write(dir.path().join("notes.txt"), "").unwrap();
		fs::create_dir(dir.path().join("nested.json")).unwrap();

		assert_eq!(list_models(dir.path()).unwrap(), vec!["austen", "shakespeare"]);
	}
}
