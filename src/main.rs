use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use serde_json::json;
use tracing::{error, info, warn};

use deepstride::{client, groq::GroqClient, render, schema, web_server};

/// Shown by the terminal client when a request stays in flight this long.
const SLOW_HINT_DELAY: Duration = Duration::from_secs(5);

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the DeepStride web server.
    Serve {
        #[arg(
            long,
            env = "DEEPSTRIDE_PORT",
            default_value_t = 3000,
            help = "Port for the web server."
        )]
        port: u16,
    },
    /// Ask a running server for a learning path and print it.
    Generate {
        /// The learning goal to plan for.
        goal: String,
        #[arg(
            long,
            default_value = "http://127.0.0.1:3000",
            help = "Base URL of the DeepStride server."
        )]
        server: String,
        #[arg(
            long,
            default_value_t = client::DEFAULT_MAX_ATTEMPTS,
            help = "How many times to attempt the request."
        )]
        attempts: u32,
    },
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Initialize tracing (logging) subscriber
    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,deepstride=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => serve(port).await?,
        Commands::Generate {
            goal,
            server,
            attempts,
        } => generate(&goal, &server, attempts).await?,
    }

    Ok(())
}

async fn serve(port: u16) -> Result<()> {
    info!("Starting DeepStride server on port {}...", port);

    let groq = Arc::new(GroqClient::from_env());
    if !groq.has_api_key() {
        warn!("GROQ_API_KEY is not set; generation requests will fail against the real API");
    }

    // Start the web server in a separate asynchronous task
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = web_server::start_web_server(port, groq).await {
            error!("Web server failed: {:?}", e);
        }
    });

    // Keep the main task alive and wait for shutdown signals or server exit
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        _ = &mut ctrl_c => {
            info!("Ctrl-C received, initiating shutdown...");
        }
        res = &mut server_handle => {
            match res {
                Ok(_) => info!("Web server task completed unexpectedly."),
                Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                Err(e) => error!("Web server task failed: {:?}", e),
            }
        }
    }

    if !server_handle.is_finished() {
        server_handle.abort();
    }
    info!("Shutdown complete.");
    Ok(())
}

async fn generate(goal: &str, server: &str, attempts: u32) -> Result<()> {
    let goal = goal.trim();
    if goal.is_empty() {
        bail!("Please enter a learning goal");
    }

    let url = format!("{}/api/generate-path", server.trim_end_matches('/'));
    info!(%url, "Requesting learning path...");

    let http = reqwest::Client::new();
    let body = json!({ "goal": goal });
    let fetch = client::fetch_with_retry(&http, &url, &body, attempts, client::RETRY_BASE_DELAY);
    tokio::pin!(fetch);

    let result = tokio::select! {
        res = &mut fetch => res,
        _ = tokio::time::sleep(SLOW_HINT_DELAY) => {
            eprintln!("This might take a little longer due to high demand...");
            fetch.await
        }
    };

    match result {
        Ok(value) => match schema::validate_learning_path(&value) {
            Ok(path) => {
                println!("Your learning path for \"{}\":\n", goal);
                print!("{}", render::render_path(&path));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "server returned an unexpected response shape");
                bail!("Failed to generate path after multiple attempts");
            }
        },
        Err(e) => {
            error!(error = %e, "all fetch attempts failed");
            bail!("Failed to generate path after multiple attempts");
        }
    }
}
