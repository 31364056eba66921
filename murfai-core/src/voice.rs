use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The catalog sends `null` for fields it has no value for; read those as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Style details the catalog reports for one alternate locale of a voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleDetails {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_styles: Vec<String>,
}

/// One entry of the provider's voice catalog, as returned by `GET /speech/voices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    pub voice_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locale: String,
    #[serde(default)]
    pub display_language: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub accent: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_styles: Vec<String>,
    #[serde(default)]
    pub supported_locales: Option<BTreeMap<String, LocaleDetails>>,
}

impl VoiceDescriptor {
    pub fn new(voice_id: String, display_name: String, locale: String) -> Self {
        Self {
            voice_id,
            display_name,
            locale,
            display_language: None,
            gender: None,
            accent: None,
            description: None,
            available_styles: Vec::new(),
            supported_locales: None,
        }
    }

    pub fn with_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_styles = styles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_supported_locale(mut self, locale: impl Into<String>, details: LocaleDetails) -> Self {
        self.supported_locales
            .get_or_insert_with(BTreeMap::new)
            .insert(locale.into(), details);
        self
    }

    /// Keys of `supportedLocales`, empty when the catalog omitted the field.
    pub fn supported_locale_tags(&self) -> Vec<&str> {
        self.supported_locales
            .as_ref()
            .map(|locales| locales.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
