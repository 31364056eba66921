use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::MurfSettings;
use crate::language::{LanguageOverrideResolver, LanguageSignal};
use crate::store::ConfigEntry;
use crate::Result;
use murfai_core::{AudioFormat, Configuration, SpeechSynthesizer};
use murfai_provider::MurfSpeechEngine;

pub const FALLBACK_LANGUAGE: &str = "en-US";
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "de"];

/// Audio handed back to the host for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct TtsAudio {
    pub content_type: String,
    pub data: Bytes,
}

/// Host-facing text-to-speech endpoint for one committed configuration.
pub struct MurfTtsEntity {
    unique_id: String,
    name: String,
    default_language: String,
    audio_format: AudioFormat,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    resolver: LanguageOverrideResolver,
    signal: Option<Arc<dyn LanguageSignal>>,
}

impl MurfTtsEntity {
    pub fn new(configuration: &Configuration, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        // Records written before unique ids were stored carry an empty one.
        let unique_id = if configuration.unique_id.is_empty() {
            format!("{}_{}", configuration.style, configuration.voice_id)
        } else {
            configuration.unique_id.clone()
        };

        Self {
            unique_id,
            name: configuration.style.clone(),
            default_language: configuration
                .default_locale_override()
                .unwrap_or(FALLBACK_LANGUAGE)
                .to_string(),
            audio_format: configuration.audio_format,
            synthesizer,
            resolver: LanguageOverrideResolver::new(),
            signal: None,
        }
    }

    /// Builds the entity with a Murf HTTP engine for `entry`.
    pub fn from_entry(entry: &ConfigEntry, settings: &MurfSettings) -> Result<Self> {
        let engine = match settings.timeout() {
            Some(timeout) => MurfSpeechEngine::with_timeout(entry.data.clone(), timeout)?,
            None => MurfSpeechEngine::new(entry.data.clone())?,
        };
        Ok(Self::new(&entry.data, Arc::new(engine)))
    }

    pub fn with_language_signal(mut self, signal: Arc<dyn LanguageSignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn with_resolver(mut self, resolver: LanguageOverrideResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn supported_languages(&self) -> &'static [&'static str] {
        &SUPPORTED_LANGUAGES
    }

    pub fn content_type(&self) -> &'static str {
        self.audio_format.content_type()
    }

    /// Locale override for the next request.
    ///
    /// A detected language from the signal wins; otherwise the host language
    /// is used when it differs from the configured default.
    pub fn effective_language(&self, language: Option<&str>) -> Option<String> {
        let detected = self.signal.as_ref().and_then(|signal| signal.current());
        if let Some(locale) = self.resolver.resolve(detected.as_deref()) {
            return Some(locale);
        }

        language
            .filter(|language| !language.is_empty() && *language != self.default_language)
            .map(str::to_string)
    }

    pub async fn get_tts_audio(&self, message: &str, language: Option<&str>) -> Result<TtsAudio> {
        let override_locale = self.effective_language(language);
        debug!(
            "Synthesizing {} chars for {} (locale override: {:?})",
            message.chars().count(),
            self.unique_id,
            override_locale
        );

        let result = self
            .synthesizer
            .synthesize(message, override_locale.as_deref())
            .await
            .map_err(|e| {
                error!("Murf synthesis failed for {}: {}", self.unique_id, e);
                e
            })?;

        Ok(TtsAudio {
            content_type: self.content_type().to_string(),
            data: result.audio_data,
        })
    }
}

impl std::fmt::Debug for MurfTtsEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MurfTtsEntity")
            .field("unique_id", &self.unique_id)
            .field("name", &self.name)
            .field("default_language", &self.default_language)
            .field("synthesizer", &self.synthesizer.name())
            .finish()
    }
}
