use crate::error::LostFoundError;
use crate::types::ollama::{GenerateRequest, GenerateResponse};
use tracing::error;
use url::Url;

/// Stateless Ollama endpoints.
pub struct OllamaApi;

impl OllamaApi {
    /// Single non-streaming generate call. No retry.
    pub async fn generate(
        client: &reqwest::Client,
        base_url: &Url,
        body: &GenerateRequest<'_>,
    ) -> Result<GenerateResponse, LostFoundError> {
        let url = base_url.join("api/generate")?;
        let resp = client.post(url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            error!(status = %status, model = %body.model, "ollama generate failed");
            return Err(LostFoundError::UpstreamStatus(status));
        }
        Ok(resp.json::<GenerateResponse>().await?)
    }
}
