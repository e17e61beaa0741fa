//! tubetools server binary
//!
//! Reads configuration from an optional JSON file, CLI flags, environment
//! variables and `.env`, then serves the HTTP API until SIGINT/SIGTERM.

use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tubetools::{Config, TubeTools};

#[derive(Parser, Debug)]
#[command(name = "tubetools", version, about = "Local HTTP service around yt-dlp and ffmpeg")]
struct Cli {
    /// JSON configuration file; flags and environment override its values
    #[arg(long, env = "TUBETOOLS_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "BIND_ADDRESS")]
    bind_address: Option<IpAddr>,

    /// yt-dlp executable
    #[arg(long, env = "YTDLP_PATH")]
    ytdlp_path: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, env = "FFMPEG_PATH")]
    ffmpeg_path: Option<PathBuf>,

    /// Directory downloads are written to and served from
    #[arg(long, env = "DOWNLOADS_DIR")]
    downloads_dir: Option<PathBuf>,

    /// API key for summaries; without it summaries return raw content
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,

    /// Chat model used for summaries
    #[arg(long, env = "OPENAI_MODEL")]
    openai_model: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<Config>(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => Config::default(),
        };

        let api = &mut config.server.api;
        let ip = self.bind_address.unwrap_or(api.bind_address.ip());
        let port = self.port.unwrap_or(api.bind_address.port());
        api.bind_address = SocketAddr::new(ip, port);

        if let Some(path) = self.ytdlp_path {
            config.tools.ytdlp_path = Some(path);
        }
        if let Some(path) = self.ffmpeg_path {
            config.tools.ffmpeg_path = Some(path);
        }
        if let Some(dir) = self.downloads_dir {
            config.download.downloads_dir = dir;
        }
        if let Some(key) = self.openai_api_key {
            config.summary.api_key = Some(key);
        }
        if let Some(url) = self.openai_base_url {
            config.summary.base_url = url;
        }
        if let Some(model) = self.openai_model {
            config.summary.model = model;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubetools=info,tower_http=info")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    let tools = TubeTools::new(config)
        .await
        .context("initialising tubetools")?;

    match tools.ytdlp().version().await {
        Ok(version) => tracing::info!(%version, "yt-dlp found"),
        Err(e) => tracing::warn!(
            path = ?tools.ytdlp().binary_path(),
            error = %e,
            "yt-dlp is not usable; downloads will fail until it is installed"
        ),
    }

    tubetools::api::start_api_server(Arc::new(tools), tubetools::shutdown_signal())
        .await
        .context("API server failed")?;

    Ok(())
}
