// Local Ollama generation service client

mod client;

pub use client::OllamaClient;
