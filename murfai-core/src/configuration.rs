use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::collections::BTreeMap;

use crate::{AudioFormat, MurfError, Result, SampleRate};

/// Style used when the chosen voice advertises no styles at all.
pub const DEFAULT_STYLE: &str = "standard";

/// Pick-list sentinel for "no locale override". Stored as an empty string,
/// but older records may still carry it verbatim.
pub const NO_LOCALE_OVERRIDE: &str = "None";

/// Persisted settings of one completed setup. Keyed by `unique_id`.
///
/// Field names follow the flat key/value record the host stores, so a record
/// written by an older setup (`model`, `url`, `format_mp3`) still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub api_key: String,
    #[serde(rename = "url")]
    pub endpoint_url: String,
    #[serde(rename = "model")]
    pub voice_id: String,
    pub style: String,
    #[serde(rename = "format_mp3", with = "format_toggle")]
    pub audio_format: AudioFormat,
    /// Empty string (or the legacy `"None"`) means "no override".
    #[serde(default)]
    pub multi_native_locale: String,
    /// Raw JSON text; absent when the user left the field empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation_dictionary: Option<String>,
    #[serde(default)]
    pub sample_rate: SampleRate,
    #[serde(default)]
    pub voice_locale: Option<String>,
    #[serde(default)]
    pub unique_id: String,
}

impl Configuration {
    pub fn unique_id_for(voice_id: &str, style: &str) -> String {
        format!("{}_{}", voice_id, style)
    }

    /// The locale override stored at setup time, if any.
    pub fn default_locale_override(&self) -> Option<&str> {
        Some(self.multi_native_locale.trim()).filter(|locale| !locale.is_empty() && *locale != NO_LOCALE_OVERRIDE)
    }
}

mod format_toggle {
    use super::AudioFormat;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(format: &AudioFormat, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(matches!(format, AudioFormat::Mp3))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AudioFormat, D::Error> {
        Ok(AudioFormat::from_mp3_toggle(bool::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PronunciationType {
    #[serde(rename = "IPA")]
    Ipa,
    #[serde(rename = "SAY_AS")]
    SayAs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronunciationEntry {
    #[serde(rename = "type")]
    pub kind: PronunciationType,
    pub pronunciation: String,
}

/// Term → pronunciation mapping sent along with every synthesis request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PronunciationDictionary(pub BTreeMap<String, PronunciationEntry>);

impl PronunciationDictionary {
    /// Parses the user-entered JSON. Blank input yields `None`.
    ///
    /// Syntax errors are reported as `invalid_json`, well-formed JSON of the
    /// wrong shape as `invalid_pronunciation_dictionary`.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Self>(raw).map(Some).map_err(|e| {
            let reason = match e.classify() {
                Category::Syntax | Category::Eof => "invalid_json",
                Category::Data | Category::Io => "invalid_pronunciation_dictionary",
            };
            MurfError::validation("pronunciation_dictionary", reason)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
