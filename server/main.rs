/// ferrite-style server
///
/// Arbitrary neural style transfer over HTTP. Served by a synchronous
/// tiny_http server with one thread per request.
///
/// Run with:
///   cargo run --release -- init-models models
///   cargo run --release -- serve
/// Then:
///   curl -F content_image=@photo.jpg -F style_image=@painting.jpg \
///        -F blending_ratio=0.8 http://127.0.0.1:8000/style -o out.jpg

mod handlers;
mod routes;
mod state;
mod util;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tiny_http::Server;
use tracing_subscriber::EnvFilter;

use ferrite_style::network::DEFAULT_BOTTLENECK_DIM;
use ferrite_style::{GraphModel, Pipeline, ServerConfig, CONTENT_DIM, STYLE_DIM};

use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "ferrite-style", version, about = "Neural style transfer HTTP service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load the models and serve POST /style.
    Serve {
        /// JSON config file; defaults apply to anything it leaves out.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides the configured listen address.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Write a style-predict / style-transform model pair to DIR.
    InitModels {
        dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BOTTLENECK_DIM)]
        bottleneck_dim: usize,
        #[arg(long, default_value_t = STYLE_DIM)]
        style_dim: usize,
        #[arg(long, default_value_t = CONTENT_DIM)]
        content_dim: usize,
        /// Xavier-initialized weights instead of the statistics-transfer pair.
        #[arg(long)]
        random: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve { config, addr } => serve(config.as_deref(), addr),
        Command::InitModels { dir, bottleneck_dim, style_dim, content_dim, random } => {
            init_models(&dir, bottleneck_dim, style_dim, content_dim, random)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

fn serve(config_path: Option<&Path>, addr: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => ServerConfig::load_json(path)?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = addr {
        config.addr = addr;
    }
    config.validate()?;

    let pipeline = Pipeline::from_config(config.pipeline.clone())?;
    let server = Server::http(&config.addr).map_err(|e| format!("failed to bind {}: {}", config.addr, e))?;
    let shared_state = Arc::new(AppState::new(pipeline, config.max_upload_bytes));

    tracing::info!(addr = %config.addr, "listening");

    // Each request runs on its own thread; the pipeline is shared read-only
    // and its engine pools hand each thread exclusive engines.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}

fn init_models(
    dir: &Path,
    bottleneck_dim: usize,
    style_dim: usize,
    content_dim: usize,
    random: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (predict, transform) = if random {
        (
            GraphModel::random_style_predict(style_dim, bottleneck_dim)?,
            GraphModel::random_style_transform(content_dim, bottleneck_dim)?,
        )
    } else {
        (
            GraphModel::adain_style_predict(style_dim, bottleneck_dim)?,
            GraphModel::adain_style_transform(content_dim, bottleneck_dim)?,
        )
    };

    std::fs::create_dir_all(dir)?;
    for (file, model) in [("style_predict.json", &predict), ("style_transform.json", &transform)] {
        let path = dir.join(file);
        model.save_json(&path)?;
        tracing::info!(model = %model.name, path = %path.display(), "wrote model");
    }
    Ok(())
}
