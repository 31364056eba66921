use async_trait::async_trait;
use murfai_core::{MurfError, ProviderError, Result, VoiceCatalog, VoiceDescriptor};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

mod engine;

pub use engine::{MurfSpeechEngine, SpeechRequest};

pub const MURF_API_BASE: &str = "https://api.murf.ai/v1";
pub const DEFAULT_SYNTHESIS_URL: &str = "https://api.murf.ai/v1/speech/generate";
pub(crate) const API_KEY_HEADER: &str = "api-key";

/// Voice catalog client for `GET <base>/speech/voices`.
#[derive(Debug, Clone)]
pub struct MurfClient {
    client: Client,
    api_base: String,
}

impl MurfClient {
    pub fn new() -> Self {
        Self::with_base_url(MURF_API_BASE)
    }

    pub fn with_base_url(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(Some(timeout))?;
        Ok(self)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn voices_url(&self) -> String {
        format!("{}/speech/voices", self.api_base)
    }
}

impl Default for MurfClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceCatalog for MurfClient {
    fn name(&self) -> &str {
        "murf"
    }

    async fn fetch_voices(&self, api_key: &str) -> Result<Vec<VoiceDescriptor>> {
        let url = self.voices_url();
        debug!("Fetching Murf voice catalog from {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| MurfError::Provider(ProviderError::Network(e.to_string())))?;

        let response = check_status(response).await?;
        let voices: Vec<VoiceDescriptor> = response
            .json()
            .await
            .map_err(|e| MurfError::Provider(ProviderError::Network(e.to_string())))?;

        info!("Fetched {} voices from Murf catalog", voices.len());
        Ok(voices)
    }
}

pub(crate) fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| MurfError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Passes 2xx responses through and maps everything else onto `ProviderError`.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MurfError::Provider(
            ProviderError::Authentication("Invalid API key".to_string()),
        )),
        StatusCode::TOO_MANY_REQUESTS => Err(MurfError::Provider(ProviderError::RateLimit)),
        status => {
            let error_text = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(MurfError::Provider(ProviderError::ProviderSpecific(format!(
                "Murf API error ({}): {}",
                status, error_text
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog_json() -> serde_json::Value {
        json!([
            {
                "voiceId": "en-UK-hazel",
                "displayName": "Hazel",
                "locale": "en-UK",
                "availableStyles": ["Conversational"]
            },
            {
                "voiceId": "fr-FR-adele",
                "displayName": "Adele",
                "locale": "fr-FR",
                "availableStyles": []
            }
        ])
    }

    #[test]
    fn test_provider_constants() {
        assert_eq!(MURF_API_BASE, "https://api.murf.ai/v1");
        assert_eq!(DEFAULT_SYNTHESIS_URL, "https://api.murf.ai/v1/speech/generate");
    }

    #[test]
    fn test_voices_url_construction() {
        assert_eq!(MurfClient::new().voices_url(), "https://api.murf.ai/v1/speech/voices");
        assert_eq!(
            MurfClient::with_base_url("http://localhost:1234/").voices_url(),
            "http://localhost:1234/speech/voices"
        );
    }

    #[test]
    fn test_client_name() {
        assert_eq!(MurfClient::default().name(), "murf");
    }

    #[tokio::test]
    async fn test_fetch_voices_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speech/voices"))
            .and(header("api-key", "k1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = MurfClient::with_base_url(mock_server.uri());
        let voices = client.fetch_voices("k1").await.unwrap();

        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].voice_id, "en-UK-hazel");
        assert_eq!(voices[0].available_styles, vec!["Conversational"]);
        assert!(voices[1].available_styles.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_voices_unauthorized_is_authentication() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speech/voices"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = MurfClient::with_base_url(mock_server.uri());
        let err = client.fetch_voices("bad-key").await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_fetch_voices_forbidden_is_authentication() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speech/voices"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = MurfClient::with_base_url(mock_server.uri());
        assert!(client.fetch_voices("bad-key").await.unwrap_err().is_authentication());
    }

    #[tokio::test]
    async fn test_fetch_voices_server_error_is_not_authentication() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speech/voices"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = MurfClient::with_base_url(mock_server.uri());
        let err = client.fetch_voices("k1").await.unwrap_err();
        assert!(!err.is_authentication());
        assert!(matches!(err, MurfError::Provider(ProviderError::ProviderSpecific(ref msg)) if msg.contains("boom")));
    }

    #[tokio::test]
    async fn test_fetch_voices_rate_limited() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speech/voices"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = MurfClient::with_base_url(mock_server.uri());
        let err = client.fetch_voices("k1").await.unwrap_err();
        assert!(matches!(err, MurfError::Provider(ProviderError::RateLimit)));
    }

    #[tokio::test]
    async fn test_fetch_voices_malformed_body_returns_no_partial_catalog() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/speech/voices"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[{\"voiceId\": \"a\"}, {"))
            .mount(&mock_server)
            .await;

        let client = MurfClient::with_base_url(mock_server.uri());
        let err = client.fetch_voices("k1").await.unwrap_err();
        assert!(matches!(err, MurfError::Provider(ProviderError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_voices_connection_refused_is_network_error() {
        let client = MurfClient::with_base_url("http://127.0.0.1:1");
        let err = client.fetch_voices("k1").await.unwrap_err();
        assert!(matches!(err, MurfError::Provider(ProviderError::Network(_))));
    }
}
