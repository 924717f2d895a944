//! Axum web server: the DeepStride page, static assets, and the
//! `/api/generate-path` JSON endpoint.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::groq::GroqClient;

const GOAL_MIN_CHARS: usize = 3;
const GOAL_MAX_CHARS: usize = 500;

// The client-visible contract is intentionally coarse: two fixed messages,
// no provider or parser detail.
const INVALID_REQUEST_MESSAGE: &str = "Invalid request format";
const GENERATION_FAILED_MESSAGE: &str = "Failed to generate valid learning path structure";

// Shared application state
#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
    groq: Arc<GroqClient>,
}

// Minijinja Environment setup
fn create_minijinja_env() -> Result<AutoReloader> {
    // Use AutoReloader for development convenience
    let reloader = AutoReloader::new(|notifier| {
        let loader = path_loader("templates");
        let mut env = Environment::new();
        env.set_loader(loader);
        // Watch the templates directory for changes
        notifier.watch_path("templates", true);
        Ok(env)
    });
    Ok(reloader)
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<axum::response::Html<String>, axum::response::Html<String>> {
    // Acquire env, get template, and render within the same block
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                let context = minijinja::context! {
                    title => "DeepStride",
                    tagline => "Transform your learning journey into achievable steps. \
                                Set your goal, and let AI craft your personalized path to success.",
                };
                tmpl.render(context)
            })
        })
        .map(axum::response::Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            axum::response::Html(format!("Internal Server Error: {}", e))
        })
}

#[derive(Debug, Error)]
enum RequestError {
    #[error("request body is not valid JSON")]
    NotJson,
    #[error("request body has no `goal` field")]
    MissingGoal,
    #[error("`goal` is not a string")]
    NotAString,
    #[error("`goal` length {0} is outside the allowed 3..=500 characters")]
    BadLength(usize),
}

/// Validate the `{ "goal": string }` request body explicitly so every
/// rejection produces the same fixed 400 response.
fn parse_generate_request(body: &str) -> Result<String, RequestError> {
    let value: Value = serde_json::from_str(body).map_err(|_| RequestError::NotJson)?;
    let goal = value
        .get("goal")
        .ok_or(RequestError::MissingGoal)?
        .as_str()
        .ok_or(RequestError::NotAString)?;
    let length = goal.chars().count();
    if !(GOAL_MIN_CHARS..=GOAL_MAX_CHARS).contains(&length) {
        return Err(RequestError::BadLength(length));
    }
    Ok(goal.to_string())
}

async fn generate_path_handler(State(state): State<AppState>, body: String) -> Response {
    let goal = match parse_generate_request(&body) {
        Ok(goal) => goal,
        Err(e) => {
            warn!(error = %e, "rejecting generate-path request");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": INVALID_REQUEST_MESSAGE })),
            )
                .into_response();
        }
    };

    match state.groq.generate_learning_path(&goal).await {
        Ok(path) => (StatusCode::OK, Json(path)).into_response(),
        Err(e) => {
            // Full detail stays server-side; the client gets the generic message.
            error!(error = %e, "learning path generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": GENERATION_FAILED_MESSAGE })),
            )
                .into_response()
        }
    }
}

/// Build the application router. Separated from [`start_web_server`] so
/// tests can drive it directly with a substitute Groq client.
pub fn app(groq: Arc<GroqClient>) -> Result<Router> {
    let templates = create_minijinja_env().context("Failed to initialize template engine")?;
    let state = AppState {
        templates: Arc::new(templates),
        groq,
    };

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/api/generate-path", post(generate_path_handler))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(TraceLayer::new_for_http()))
}

pub async fn start_web_server(port: u16, groq: Arc<GroqClient>) -> Result<()> {
    let app = app(groq)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_goal() {
        let goal = parse_generate_request(r#"{"goal": "learn Rust"}"#).unwrap();
        assert_eq!(goal, "learn Rust");
    }

    #[test]
    fn test_parse_boundary_lengths() {
        assert!(parse_generate_request(r#"{"goal": "abc"}"#).is_ok());
        let max = "x".repeat(500);
        assert!(parse_generate_request(&format!(r#"{{"goal": "{max}"}}"#)).is_ok());
    }

    #[test]
    fn test_parse_rejects_short_and_long() {
        assert!(matches!(
            parse_generate_request(r#"{"goal": "ab"}"#),
            Err(RequestError::BadLength(2))
        ));
        let too_long = "x".repeat(501);
        assert!(matches!(
            parse_generate_request(&format!(r#"{{"goal": "{too_long}"}}"#)),
            Err(RequestError::BadLength(501))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(
            parse_generate_request("not json"),
            Err(RequestError::NotJson)
        ));
        assert!(matches!(
            parse_generate_request(r#"{"target": "learn Rust"}"#),
            Err(RequestError::MissingGoal)
        ));
        assert!(matches!(
            parse_generate_request(r#"{"goal": 42}"#),
            Err(RequestError::NotAString)
        ));
    }

    #[test]
    fn test_goal_length_counts_chars_not_bytes() {
        // Three non-ASCII scalars are within bounds even at nine bytes.
        assert!(parse_generate_request(r#"{"goal": "日本語"}"#).is_ok());
    }
}
