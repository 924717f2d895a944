//! Groq chat-completion client and the learning-path generation service.
//!
//! One provider call per invocation, no retry at this layer. The HTTP
//! endpoint decides what (little) of a failure the end user gets to see.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::constants;
use crate::schema::{self, LearningPath, SchemaError};

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 1500;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("provider request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("network error reaching the provider: {0}")]
    Network(#[from] reqwest::Error),
    #[error("completion content was empty or missing")]
    EmptyResponse,
    #[error("completion was not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("completion JSON did not match the learning path shape: {0}")]
    SchemaValidation(#[from] SchemaError),
}

// Subset of the chat-completion envelope we care about. Groq speaks the
// OpenAI wire format.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Stateless handle to the Groq API: configuration plus a reqwest client.
/// Constructed once in `main` and shared by `Arc` so tests can substitute
/// a client pointed at a mock server.
pub struct GroqClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            constants::GROQ_API_KEY.clone(),
            constants::GROQ_API_URL.clone(),
            constants::GROQ_MODEL.clone(),
        )
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Ask the model for a learning path and validate its reply.
    pub async fn generate_learning_path(&self, goal: &str) -> Result<LearningPath, GenerateError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = json!({
            "messages": [
                { "role": "system", "content": system_prompt(goal) },
                { "role": "user", "content": goal },
            ],
            "model": self.model,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "response_format": { "type": "json_object" },
        });

        debug!(%goal, model = %self.model, "requesting learning path from Groq");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            error!(%status, %message, "Groq API request failed");
            return Err(GenerateError::Api { status, message });
        }

        let completion: ChatCompletion = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerateError::EmptyResponse)?;

        let cleaned = strip_code_fences(&content);
        if cleaned.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        let parsed: Value = serde_json::from_str(&cleaned)?;
        let path = schema::validate_learning_path(&parsed)?;

        debug!(step_count = path.steps.len(), "validated learning path");
        Ok(path)
    }
}

/// The model is told not to emit markdown fences, but may anyway.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn system_prompt(goal: &str) -> String {
    format!(
        r#"You are an expert learning path generator. Create a detailed, step-by-step plan using this exact JSON format:
{{
  "steps": [
    {{
      "order": 1,
      "title": "Step Title",
      "description": "Detailed explanation",
      "resources": ["Resource 1 (https://example.com)", "Resource 2"],
      "estimatedTime": "X days"
    }}
  ]
}}

For the learning goal: "{goal}". Follow these rules:
1. Output ONLY raw JSON without markdown formatting
2. Keep resource strings in format "Display Text (URL)"
3. Ensure all URLs are properly parenthesized
4. Maintain consistent string formatting
5. Include exactly these fields in each step: order, title, description, resources, estimatedTime"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```json\n{\"steps\": []}\n```"),
            "{\"steps\": []}"
        );
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"steps\": []}  "), "{\"steps\": []}");
        assert_eq!(strip_code_fences("{\"steps\": []}"), "{\"steps\": []}");
    }

    #[test]
    fn test_strip_code_fences_empty() {
        assert_eq!(strip_code_fences("```json\n```"), "");
        assert_eq!(strip_code_fences("   "), "");
    }

    #[test]
    fn test_system_prompt_embeds_goal_and_rules() {
        let prompt = system_prompt("learn Rust");
        assert!(prompt.contains("\"learn Rust\""));
        assert!(prompt.contains("estimatedTime"));
        assert!(prompt.contains("Display Text (URL)"));
        assert!(prompt.contains("ONLY raw JSON"));
    }
}
