use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_chain_core::io::{ModelFormat, build_output_path};
use rs_chain_core::model::chain::Chain;

/// Train a word-level Markov chain and generate continuations of a seed text.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
	/// Number of context words the chain is keyed on
	#[arg(short, long, global = true, default_value_t = 2)]
	context_length: usize,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Build a model from a text file and save it
	Train {
		/// Training text, words separated by whitespace
		input: PathBuf,

		/// Where to save the model (`.bin` for binary); defaults to INPUT with a `.json` extension
		#[arg(short, long)]
		output: Option<PathBuf>,
	},
	/// Continue a seed text using a saved model
	Generate {
		/// Seed words; the continuation follows the last of them
		seed: Vec<String>,

		/// Saved model (`.json` or `.bin`)
		#[arg(short, long)]
		model: PathBuf,

		/// Number of sentences to complete
		#[arg(short, long, default_value_t = 1)]
		sentences: usize,

		/// Maximum number of words added to the seed
		#[arg(short = 'w', long, default_value_t = 100)]
		max_words: usize,

		/// Seed for the random generator, for reproducible output
		#[arg(long)]
		rng_seed: Option<u64>,

		/// Print the context-length usage histogram after generating
		#[arg(long)]
		stats: bool,
	},
	/// Print the number of stored contexts of a saved model
	Stats {
		#[arg(short, long)]
		model: PathBuf,
	},
}

fn load(context_length: usize, model: &Path) -> Result<Chain, Box<dyn std::error::Error>> {
	let mut chain = Chain::new(context_length)?;
	chain.load(model)?;
	Ok(chain)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let cli = Cli::parse();

	match cli.command {
		Command::Train { input, output } => {
			let mut chain = Chain::new(cli.context_length)?;
			chain.build(File::open(&input)?);

			let output = match output {
				Some(path) => path,
				None => build_output_path(&input, ModelFormat::Json.extension())?,
			};
			chain.save(&output)?;
			println!("{} contexts written to {}", chain.size(), output.display());
		}
		Command::Generate { seed, model, sentences, max_words, rng_seed, stats } => {
			let mut chain = load(cli.context_length, &model)?;
			let mut rng = match rng_seed {
				Some(seed) => StdRng::seed_from_u64(seed),
				None => StdRng::from_os_rng(),
			};

			let text = chain.generate(&seed.join(" "), sentences, max_words, &mut rng);
			println!("{text}");

			if stats {
				for (used, count) in chain.stats().iter().enumerate() {
					println!("{used} context words: {count}");
				}
			}
		}
		Command::Stats { model } => {
			let chain = load(cli.context_length, &model)?;
			info!("model {} uses {} context words", model.display(), chain.context_length());
			println!("{}", chain.size());
		}
	}

	Ok(())
}
