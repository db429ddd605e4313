pub mod ollama_api;
