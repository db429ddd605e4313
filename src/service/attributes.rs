//! Image → attribute JSON, backed by a vision model.
//!
//! [`AttributeGenerator`] is the seam the upload handler depends on; the
//! production implementation talks to an Ollama server, tests plug in stubs.

use crate::api::ollama_api::OllamaApi;
use crate::config::{ATTRIBUTE_SYSTEM_PROMPT, ATTRIBUTE_USER_PROMPT, Config};
use crate::error::LostFoundError;
use crate::types::ollama::GenerateRequest;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Derives a JSON attribute document from image bytes.
///
/// Implementations return the model's JSON text verbatim; callers validate it.
#[async_trait]
pub trait AttributeGenerator: Send + Sync {
    async fn generate(&self, image: &[u8]) -> Result<String, LostFoundError>;
}

pub struct OllamaAttributeGenerator {
    client: reqwest::Client,
    base_url: Url,
    model: String,
}

impl OllamaAttributeGenerator {
    pub fn new(client: reqwest::Client, mut base_url: Url, model: impl Into<String>) -> Self {
        // `join` replaces the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client,
            base_url,
            model: model.into(),
        }
    }

    /// Build from config with a client bounded by `generator_timeout_secs`.
    pub fn from_config(cfg: &Config) -> Result<Self, LostFoundError> {
        let client = reqwest::Client::builder()
            .user_agent("lostfound/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.generator_timeout_secs))
            .build()?;
        Ok(Self::new(client, cfg.ollama_url.clone(), cfg.model.clone()))
    }

    fn build_request(&self, image: &[u8]) -> GenerateRequest<'_> {
        GenerateRequest {
            model: &self.model,
            prompt: ATTRIBUTE_USER_PROMPT,
            system: ATTRIBUTE_SYSTEM_PROMPT,
            images: vec![base64::engine::general_purpose::STANDARD.encode(image)],
            format: "json",
            stream: false,
        }
    }
}

#[async_trait]
impl AttributeGenerator for OllamaAttributeGenerator {
    async fn generate(&self, image: &[u8]) -> Result<String, LostFoundError> {
        let body = self.build_request(image);
        debug!(model = %self.model, bytes = image.len(), "requesting image attributes");

        let resp = OllamaApi::generate(&self.client, &self.base_url, &body).await?;
        if let Some(secs) = resp.duration_secs() {
            info!(model = %self.model, "attributes generated in {:.2}s", secs);
        }
        resp.response
            .ok_or_else(|| LostFoundError::Generation("response field missing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(base: &str) -> OllamaAttributeGenerator {
        OllamaAttributeGenerator::new(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            "llama3.2-vision",
        )
    }

    #[test]
    fn request_carries_base64_image_and_json_format() {
        let g = generator("http://localhost:11434");
        let body = serde_json::to_value(g.build_request(b"\xff\xd8jpeg")).unwrap();
        assert_eq!(body["model"], "llama3.2-vision");
        assert_eq!(body["format"], "json");
        assert_eq!(body["stream"], false);
        assert_eq!(body["images"][0], "/9hqcGVn");
        assert_eq!(body["system"], ATTRIBUTE_SYSTEM_PROMPT);
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let g = generator("http://gpu-box:8080/ollama");
        assert_eq!(
            g.base_url.join("api/generate").unwrap().as_str(),
            "http://gpu-box:8080/ollama/api/generate"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_generation_error() {
        // port 9 (discard) is closed on test hosts
        let g = generator("http://127.0.0.1:9");
        let err = g.generate(b"img").await.unwrap_err();
        assert!(err.is_generation());
    }
}
