pub mod client;
pub mod constants;
pub mod groq;
pub mod render;
pub mod schema;
pub mod web_server;
