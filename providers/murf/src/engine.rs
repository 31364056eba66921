use async_trait::async_trait;
use bytes::Bytes;
use murfai_core::{
    AudioFormat, Configuration, MurfError, PronunciationDictionary, ProviderError, Result, SampleRate,
    SpeechSynthesizer, SynthesisResult,
};
use murfai_utils::{calculate_duration_seconds, detect_audio_format};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{build_client, check_status, API_KEY_HEADER};

/// Body of `POST /speech/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
    pub style: String,
    pub format: AudioFormat,
    pub sample_rate: SampleRate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_native_locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronunciation_dictionary: Option<PronunciationDictionary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeechResponse {
    #[serde(default)]
    audio_file: Option<String>,
    #[serde(default)]
    audio_length_in_seconds: Option<f32>,
    #[serde(default)]
    warning: Option<String>,
}

/// Builds and sends synthesis requests for one committed configuration.
#[derive(Debug, Clone)]
pub struct MurfSpeechEngine {
    client: Client,
    configuration: Configuration,
    pronunciation_dictionary: Option<PronunciationDictionary>,
}

impl MurfSpeechEngine {
    /// Fails when the stored pronunciation dictionary does not parse; the
    /// setup wizard rejects such input, so this indicates a corrupted record.
    pub fn new(configuration: Configuration) -> Result<Self> {
        Self::with_client(configuration, Client::new())
    }

    pub fn with_timeout(configuration: Configuration, timeout: Duration) -> Result<Self> {
        Self::with_client(configuration, build_client(Some(timeout))?)
    }

    pub fn with_client(configuration: Configuration, client: Client) -> Result<Self> {
        let pronunciation_dictionary = match configuration.pronunciation_dictionary.as_deref() {
            Some(raw) => PronunciationDictionary::parse(raw).map_err(|e| {
                MurfError::Configuration(format!("Stored pronunciation dictionary is invalid: {}", e))
            })?,
            None => None,
        };

        Ok(Self {
            client,
            configuration,
            pronunciation_dictionary,
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Run-time override first, then the locale stored at setup time.
    pub fn effective_locale(&self, override_locale: Option<&str>) -> Option<String> {
        override_locale
            .filter(|locale| !locale.is_empty())
            .or_else(|| self.configuration.default_locale_override())
            .map(str::to_string)
    }

    /// Multi-locale voices are addressed without their native locale prefix
    /// whenever another locale is requested, e.g. `en-US-carter` → `carter`.
    pub fn effective_voice_id(&self, effective_locale: Option<&str>) -> String {
        let voice_id = self.configuration.voice_id.as_str();
        let voice_locale = self
            .configuration
            .voice_locale
            .as_deref()
            .filter(|locale| !locale.is_empty());

        match (effective_locale, voice_locale) {
            (Some(_), Some(voice_locale)) => voice_id
                .strip_prefix(voice_locale)
                .and_then(|rest| rest.strip_prefix('-'))
                .unwrap_or(voice_id)
                .to_string(),
            _ => voice_id.to_string(),
        }
    }

    pub fn build_request(&self, text: &str, override_locale: Option<&str>) -> SpeechRequest {
        let multi_native_locale = self.effective_locale(override_locale);
        let voice_id = self.effective_voice_id(multi_native_locale.as_deref());

        SpeechRequest {
            text: text.to_string(),
            voice_id,
            style: self.configuration.style.clone(),
            format: self.configuration.audio_format,
            sample_rate: self.configuration.sample_rate,
            multi_native_locale,
            pronunciation_dictionary: self.pronunciation_dictionary.clone(),
        }
    }

    async fn request_audio_url(&self, request: &SpeechRequest) -> Result<SpeechResponse> {
        debug!(
            "Requesting Murf synthesis: voice_id={}, style={}, format={}, locale={:?}",
            request.voice_id, request.style, request.format, request.multi_native_locale
        );

        let response = self
            .client
            .post(&self.configuration.endpoint_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header(API_KEY_HEADER, &self.configuration.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| MurfError::Provider(ProviderError::Network(e.to_string())))?;

        let response = check_status(response).await?;
        response
            .json::<SpeechResponse>()
            .await
            .map_err(|e| MurfError::Provider(ProviderError::InvalidResponse(e.to_string())))
    }

    async fn download_audio(&self, audio_url: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(audio_url)
            .send()
            .await
            .map_err(|e| MurfError::Provider(ProviderError::Network(e.to_string())))?;

        check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| MurfError::Provider(ProviderError::Network(e.to_string())))
    }
}

#[async_trait]
impl SpeechSynthesizer for MurfSpeechEngine {
    fn name(&self) -> &str {
        "murf"
    }

    async fn synthesize(&self, text: &str, override_locale: Option<&str>) -> Result<SynthesisResult> {
        let request = self.build_request(text, override_locale);
        let response = self.request_audio_url(&request).await?;

        if let Some(warning) = &response.warning {
            warn!("Murf synthesis warning: {}", warning);
        }

        // The link expires after 72 hours; it is fetched immediately.
        let audio_url = response
            .audio_file
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                MurfError::Provider(ProviderError::InvalidResponse(
                    "No audio file URL in response".to_string(),
                ))
            })?;

        let audio_data = self.download_audio(&audio_url).await?;

        let format = self.configuration.audio_format;
        match detect_audio_format(&audio_data) {
            Ok(detected) if detected != format => {
                warn!("Murf returned {} audio for a {} request", detected, format)
            }
            Ok(_) => {}
            Err(e) => debug!("Could not sniff downloaded audio format: {}", e),
        }

        let mut result = SynthesisResult::new(audio_data, format, request.sample_rate, request.voice_id);
        result.duration = response
            .audio_length_in_seconds
            .or_else(|| calculate_duration_seconds(&result.audio_data, format));
        result.locale = request.multi_native_locale;
        Ok(result)
    }

    fn audio_format(&self) -> AudioFormat {
        self.configuration.audio_format
    }
}
