use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};
use clap::Parser;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use rs_chain_core::io::{ModelFormat, build_output_path, list_models, model_path};
use rs_chain_core::model::chain::Chain;

/// HTTP front-end serving continuations from a shared Markov chain.
#[derive(Parser, Clone)]
#[command(version, about)]
struct Args {
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(long, default_value_t = 5000)]
	port: u16,

	/// Directory holding training texts (`.txt`) and saved models (`.json`, `.bin`)
	#[arg(long, default_value = "./data")]
	data_dir: PathBuf,

	/// Number of context words the chain is keyed on
	#[arg(long, default_value_t = 2)]
	context_length: usize,

	/// Seed for the random generator, for reproducible output
	#[arg(long)]
	rng_seed: Option<u64>,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<String>,
	sentences: Option<usize>,
	max_words: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

#[derive(Serialize)]
struct StatsResponse {
	size: usize,
	usage: Vec<usize>,
}

/// Chain and random source, guarded together by one `Mutex`.
struct SharedData {
	chain: Chain,
	rng: StdRng,
	data_dir: PathBuf,
}

impl ModelQuery {
	/// Returns the requested model name, rejecting anything that could leave the data directory.
	fn model_name(&self) -> Result<&str, String> {
		match &self.name {
			Some(s) if s.trim().is_empty() => Err("Model name cannot be empty".into()),
			Some(s) if s.contains(['/', '\\']) || s.contains("..") => Err("Invalid model name".into()),
			Some(s) => Ok(s.trim()),
			None => Err("Missing model name".into()),
		}
	}
}

/// Loads `<name>.bin` if present, `<name>.json` otherwise.
fn load_model(data_dir: &Path, name: &str, context_length: usize) -> Result<Chain, String> {
	let mut chain = Chain::new(context_length).map_err(|e| e.to_string())?;
	let binary = model_path(data_dir, name, ModelFormat::Binary.extension());
	let path = if binary.exists() {
		binary
	} else {
		model_path(data_dir, name, ModelFormat::Json.extension())
	};
	chain.load(&path).map_err(|e| e.to_string())?;
	Ok(chain)
}

/// Builds a chain from `<name>.txt` and caches it as `<name>.bin`.
fn train_model(data_dir: &Path, name: &str, context_length: usize) -> Result<Chain, String> {
	let mut chain = Chain::new(context_length).map_err(|e| e.to_string())?;
	let input = model_path(data_dir, name, "txt");
	let file = File::open(&input).map_err(|e| format!("Failed to open {}: {e}", input.display()))?;
	chain.build(file);

	let output = build_output_path(&input, ModelFormat::Binary.extension()).map_err(|e| e.to_string())?;
	chain.save(&output).map_err(|e| e.to_string())?;
	Ok(chain)
}

/// GET `/v1/generate`
///
/// Continues `seed` (empty by default) for up to `sentences` sentences
/// and `max_words` words. Returns the generated text as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let seed = query.seed.as_deref().unwrap_or("");
	let sentences = query.sentences.unwrap_or(1);
	let max_words = query.max_words.unwrap_or(100);

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let SharedData { chain, rng, .. } = &mut *shared_data;

	HttpResponse::Ok().body(chain.generate(seed, sentences, max_words, rng))
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().json(StatsResponse {
		size: shared_data.chain.size(),
		usage: shared_data.chain.stats(),
	})
}

#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_models(&data_dir) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

/// PUT `/v1/load_model?name=`
///
/// Replaces the shared chain with a saved model from the data directory.
#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match query.model_name() {
		Ok(name) => name,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let context_length = shared_data.chain.context_length();
	match load_model(&shared_data.data_dir, name, context_length) {
		Ok(chain) => {
			shared_data.chain = chain;
			info!("model {name} loaded, {} contexts", shared_data.chain.size());
			HttpResponse::Ok().body("Model loaded successfully")
		}
		Err(e) => {
			error!("failed to load model {name}: {e}");
			HttpResponse::InternalServerError().body(format!("Failed to load model: {e}"))
		}
	}
}

/// PUT `/v1/train?name=`
///
/// Trains a fresh chain on `<name>.txt` and makes it the shared one.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match query.model_name() {
		Ok(name) => name,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let context_length = shared_data.chain.context_length();
	match train_model(&shared_data.data_dir, name, context_length) {
		Ok(chain) => {
			shared_data.chain = chain;
			info!("model {name} trained, {} contexts", shared_data.chain.size());
			HttpResponse::Ok().body("Model trained successfully")
		}
		Err(e) => {
			error!("failed to train model {name}: {e}");
			HttpResponse::InternalServerError().body(format!("Failed to train model: {e}"))
		}
	}
}

/// Main entry point for the server.
///
/// Starts with an empty chain wrapped in a `Mutex`; models are loaded or
/// trained through the `PUT` endpoints.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();

	let chain = Chain::new(args.context_length)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	let rng = match args.rng_seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};
	let shared_data = SharedData {
		chain,
		rng,
		data_dir: args.data_dir.clone(),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_stats)
			.service(get_models)
			.service(put_model)
			.service(put_train)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
