use async_trait::async_trait;
use bytes::Bytes;

use crate::{AudioFormat, Result, SampleRate, VoiceDescriptor};

#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub audio_data: Bytes,
    pub format: AudioFormat,
    pub sample_rate: SampleRate,
    pub size_bytes: usize,
    pub duration: Option<f32>,
    /// Voice id actually sent, after any locale rewrite.
    pub voice_id: String,
    pub locale: Option<String>,
}

impl SynthesisResult {
    pub fn new(audio_data: Bytes, format: AudioFormat, sample_rate: SampleRate, voice_id: String) -> Self {
        let size_bytes = audio_data.len();
        Self {
            audio_data,
            format,
            sample_rate,
            size_bytes,
            duration: None,
            voice_id,
            locale: None,
        }
    }
}

/// Source of the provider's voice catalog.
#[async_trait]
pub trait VoiceCatalog: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches the full catalog for `api_key`. Never returns a partial list.
    async fn fetch_voices(&self, api_key: &str) -> Result<Vec<VoiceDescriptor>>;
}

/// Turns text into audio for one committed configuration.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, text: &str, override_locale: Option<&str>) -> Result<SynthesisResult>;

    fn audio_format(&self) -> AudioFormat;
}
