//! Pick-lists and lookups derived from a fetched voice catalog.

use murfai_core::VoiceDescriptor;
pub use murfai_core::NO_LOCALE_OVERRIDE;

use crate::form::SelectOption;

/// Only voices whose locale starts with one of these are offered.
pub const ALLOWED_LOCALE_PREFIXES: [&str; 2] = ["en-", "de-"];

/// Read-only view over one catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct VoiceIndex<'a> {
    voices: &'a [VoiceDescriptor],
}

impl<'a> VoiceIndex<'a> {
    pub fn new(voices: &'a [VoiceDescriptor]) -> Self {
        Self { voices }
    }

    /// Voices in an allowed locale, in catalog order.
    pub fn selectable(&self) -> impl Iterator<Item = &'a VoiceDescriptor> {
        self.voices.iter().filter(|voice| {
            ALLOWED_LOCALE_PREFIXES
                .iter()
                .any(|prefix| voice.locale.starts_with(prefix))
        })
    }

    pub fn voice_options(&self) -> Vec<SelectOption> {
        self.selectable()
            .map(|voice| {
                SelectOption::new(
                    voice.voice_id.clone(),
                    format!("{} ({})", voice.display_name, voice.locale),
                )
            })
            .collect()
    }

    pub fn is_selectable(&self, voice_id: &str) -> bool {
        self.selectable().any(|voice| voice.voice_id == voice_id)
    }

    pub fn find(&self, voice_id: &str) -> Option<&'a VoiceDescriptor> {
        self.voices.iter().find(|voice| voice.voice_id == voice_id)
    }

    /// `None` when the voice is not in the snapshot; an empty slice when it has no styles.
    pub fn styles_for(&self, voice_id: &str) -> Option<&'a [String]> {
        self.find(voice_id).map(|voice| voice.available_styles.as_slice())
    }

    pub fn locale_for(&self, voice_id: &str) -> Option<&'a str> {
        self.find(voice_id)
            .map(|voice| voice.locale.as_str())
            .filter(|locale| !locale.is_empty())
    }

    /// `None` sentinel followed by the voice's supported alternate locales.
    pub fn locale_override_options(&self, voice_id: &str) -> Vec<SelectOption> {
        let mut options = vec![SelectOption::plain(NO_LOCALE_OVERRIDE)];
        if let Some(voice) = self.find(voice_id) {
            options.extend(voice.supported_locale_tags().into_iter().map(SelectOption::plain));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murfai_core::LocaleDetails;

    fn catalog() -> Vec<VoiceDescriptor> {
        vec![
            VoiceDescriptor::new("fr-FR-adele".into(), "Adele".into(), "fr-FR".into()),
            VoiceDescriptor::new("en-UK-hazel".into(), "Hazel".into(), "en-UK".into())
                .with_styles(["Conversational"]),
            VoiceDescriptor::new("de-DE-lia".into(), "Lia".into(), "de-DE".into()),
            VoiceDescriptor::new("es-ES-elvira".into(), "Elvira".into(), "es-ES".into()),
            VoiceDescriptor::new("en-US-carter".into(), "Carter".into(), "en-US".into())
                .with_styles(["Calm", "Promo"])
                .with_supported_locale("de-DE", LocaleDetails::default())
                .with_supported_locale("fr-FR", LocaleDetails::default()),
            VoiceDescriptor::new("english-legacy".into(), "Legacy".into(), "en".into()),
        ]
    }

    #[test]
    fn test_selectable_keeps_catalog_order() {
        let voices = catalog();
        let index = VoiceIndex::new(&voices);
        let ids: Vec<&str> = index.selectable().map(|v| v.voice_id.as_str()).collect();
        assert_eq!(ids, vec!["en-UK-hazel", "de-DE-lia", "en-US-carter"]);
    }

    #[test]
    fn test_selectable_matches_prefix_rule_for_every_voice() {
        let voices = catalog();
        let index = VoiceIndex::new(&voices);
        for voice in &voices {
            let allowed = voice.locale.starts_with("en-") || voice.locale.starts_with("de-");
            assert_eq!(index.is_selectable(&voice.voice_id), allowed, "{}", voice.voice_id);
        }
    }

    #[test]
    fn test_voice_option_labels() {
        let voices = catalog();
        let options = VoiceIndex::new(&voices).voice_options();
        assert_eq!(options[0], SelectOption::new("en-UK-hazel", "Hazel (en-UK)"));
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_empty_catalog() {
        let index = VoiceIndex::new(&[]);
        assert!(index.voice_options().is_empty());
        assert!(index.find("en-UK-hazel").is_none());
        assert_eq!(index.locale_override_options("en-UK-hazel").len(), 1);
    }

    #[test]
    fn test_style_lookup() {
        let voices = catalog();
        let index = VoiceIndex::new(&voices);
        assert_eq!(index.styles_for("en-US-carter").unwrap(), ["Calm", "Promo"]);
        assert!(index.styles_for("de-DE-lia").unwrap().is_empty());
        assert!(index.styles_for("missing").is_none());
    }

    #[test]
    fn test_locale_lookup() {
        let voices = catalog();
        let index = VoiceIndex::new(&voices);
        assert_eq!(index.locale_for("en-UK-hazel"), Some("en-UK"));
        assert_eq!(index.locale_for("missing"), None);
    }

    #[test]
    fn test_locale_override_options() {
        let voices = catalog();
        let index = VoiceIndex::new(&voices);
        let values: Vec<String> = index
            .locale_override_options("en-US-carter")
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, vec!["None", "de-DE", "fr-FR"]);

        assert_eq!(index.locale_override_options("en-UK-hazel").len(), 1);
    }
}
