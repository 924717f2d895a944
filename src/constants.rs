// Environment-derived configuration, read once at startup.

use std::env;

// Use lazy_static to initialize static variables safely.
lazy_static::lazy_static! {
    pub static ref GROQ_API_KEY: String = env::var("GROQ_API_KEY").unwrap_or_default();
    pub static ref GROQ_API_URL: String = env::var("GROQ_API_URL")
        .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
    pub static ref GROQ_MODEL: String = env::var("GROQ_MODEL")
        .unwrap_or_else(|_| "deepseek-r1-distill-llama-70b".to_string());
}
