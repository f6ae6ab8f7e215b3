use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use semrank::categories::CategorySet;
use semrank::config::Config;
use semrank::embedding::{Backend, ModelRegistry};

const DEFAULT_CATEGORIES: &str = "Flowers Colors Cars Weather Food";
const DEFAULT_TEXT: &str = "Roses are red, trucks are blue, and Seattle is grey right now";

/// semrank: rank categories by how close they are to a sentence.
///
/// Compares averaged GloVe word vectors with a sentence encoder
/// (all-MiniLM-L6-v2), both run locally.
#[derive(Parser)]
#[command(name = "semrank", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank categories against a sentence and print the result
    Rank {
        /// The sentence to rank categories against
        #[arg(long, default_value = DEFAULT_TEXT)]
        text: String,

        /// Space-separated category labels
        #[arg(long, default_value = DEFAULT_CATEGORIES)]
        categories: String,

        /// Backend to use (repeatable): glove_25d, glove_50d, glove_100d,
        /// sentence_transformer_384. Defaults to the configured GloVe size
        /// plus the sentence encoder.
        #[arg(long = "backend")]
        backends: Vec<Backend>,
    },

    /// Serve the web demo
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (overrides SEMRANK_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (overrides SEMRANK_BIND)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Download the sentence encoder model (~90 MB)
    DownloadModel,

    /// Show which model artifacts are installed
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("semrank=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            text,
            categories,
            backends,
        } => {
            let config = Config::load()?;
            let backends = if backends.is_empty() {
                config.default_backends()
            } else {
                backends
            };
            for &backend in &backends {
                config.require_backend(backend)?;
            }

            let categories = CategorySet::parse(&categories);
            if categories.is_empty() {
                println!("{}", "No categories given, nothing to rank.".dimmed());
                return Ok(());
            }

            let registry = ModelRegistry::new(&config.model_dir);
            let rankings =
                semrank::pipeline::compare(&registry, &text, &categories, &backends).await?;

            println!("Input: {}", text.bold());
            semrank::output::terminal::display_comparison(&rankings);
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let mut config = Config::load()?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }

            for backend in config.default_backends() {
                if let Err(e) = config.require_backend(backend) {
                    tracing::warn!("{e}");
                }
            }

            info!(model_dir = %config.model_dir.display(), "Starting web demo");
            let registry = ModelRegistry::new(&config.model_dir);
            semrank::web::run_server(semrank::web::AppState::new(config, registry)).await?;
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading sentence encoder...");
            println!("  Destination: {}", model_dir.display());

            semrank::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("Run `semrank status` to check the GloVe vectors too.");
        }

        Commands::Status => {
            let config = Config::load()?;
            semrank::status::show(&config);
        }
    }

    Ok(())
}
