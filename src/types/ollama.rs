use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub system: &'a str,
    /// Base64 of the raw image bytes.
    pub images: Vec<String>,
    pub format: &'a str,
    pub stream: bool,
}

/// Non-streaming reply; only the fields we use.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
    /// Nanoseconds.
    #[serde(default)]
    pub total_duration: Option<u64>,
}

impl GenerateResponse {
    pub fn duration_secs(&self) -> Option<f64> {
        self.total_duration.map(|ns| ns as f64 / 1_000_000_000.0)
    }
}
