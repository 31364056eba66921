//! Core traits and types for the MurfAI text-to-speech integration
//!
//! This crate holds the typed data model shared by the HTTP provider and the
//! setup wizard: voice catalog records, the persisted configuration and the
//! error taxonomy.

pub mod audio;
pub mod configuration;
pub mod error;
pub mod tts;
pub mod voice;

pub use audio::*;
pub use configuration::*;
pub use error::*;
pub use tts::*;
pub use voice::*;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_configuration() -> Configuration {
        Configuration {
            api_key: "k1".to_string(),
            endpoint_url: "https://api.murf.ai/v1/speech/generate".to_string(),
            voice_id: "en-UK-hazel".to_string(),
            style: "Conversational".to_string(),
            audio_format: AudioFormat::Wav,
            multi_native_locale: String::new(),
            pronunciation_dictionary: None,
            sample_rate: SampleRate::Hz44100,
            voice_locale: Some("en-UK".to_string()),
            unique_id: Configuration::unique_id_for("en-UK-hazel", "Conversational"),
        }
    }

    #[test]
    fn test_audio_format_toggle() {
        assert_eq!(AudioFormat::from_mp3_toggle(true), AudioFormat::Mp3);
        assert_eq!(AudioFormat::from_mp3_toggle(false), AudioFormat::Wav);
        assert_eq!(AudioFormat::default(), AudioFormat::Wav);
    }

    #[test]
    fn test_audio_format_strings() {
        assert_eq!(AudioFormat::Mp3.as_str(), "MP3");
        assert_eq!(AudioFormat::Wav.to_string(), "WAV");
        assert_eq!(AudioFormat::Mp3.content_type(), "audio/mp3");
        assert_eq!(AudioFormat::Wav.extension(), "wav");
        assert_eq!(serde_json::to_value(AudioFormat::Mp3).unwrap(), json!("MP3"));
    }

    #[test]
    fn test_sample_rate_parsing() {
        assert_eq!("44100".parse::<SampleRate>().unwrap(), SampleRate::Hz44100);
        assert_eq!(SampleRate::try_from(8000u32).unwrap(), SampleRate::Hz8000);
        assert_eq!(SampleRate::default().as_u32(), 44100);

        let err = "22050".parse::<SampleRate>().unwrap_err();
        assert!(matches!(err, MurfError::Validation { ref field, .. } if field == "sample_rate"));
        assert!("fast".parse::<SampleRate>().is_err());
    }

    #[test]
    fn test_sample_rate_serializes_as_number() {
        assert_eq!(serde_json::to_value(SampleRate::Hz48000).unwrap(), json!(48000));
        let rate: SampleRate = serde_json::from_value(json!(24000)).unwrap();
        assert_eq!(rate, SampleRate::Hz24000);
        assert!(serde_json::from_value::<SampleRate>(json!(16000)).is_err());
    }

    #[test]
    fn test_sample_rate_reads_stored_string() {
        let rate: SampleRate = serde_json::from_value(json!("48000")).unwrap();
        assert_eq!(rate, SampleRate::Hz48000);
        assert!(serde_json::from_value::<SampleRate>(json!("16000")).is_err());
        assert!(serde_json::from_value::<SampleRate>(json!("fast")).is_err());
        assert!(serde_json::from_value::<SampleRate>(json!(true)).is_err());
    }

    #[test]
    fn test_voice_descriptor_from_catalog_json() {
        let voice: VoiceDescriptor = serde_json::from_value(json!({
            "voiceId": "en-US-carter",
            "displayName": "Carter",
            "locale": "en-US",
            "availableStyles": ["Conversational", "Calm"],
            "supportedLocales": {
                "de-DE": { "detail": "German", "availableStyles": ["Conversational"] },
                "fr-FR": { "detail": "French" }
            }
        }))
        .unwrap();

        assert_eq!(voice.voice_id, "en-US-carter");
        assert_eq!(voice.available_styles, vec!["Conversational", "Calm"]);
        assert_eq!(voice.supported_locale_tags(), vec!["de-DE", "fr-FR"]);
        assert!(voice.gender.is_none());
    }

    #[test]
    fn test_voice_descriptor_optional_fields_default() {
        let voice: VoiceDescriptor = serde_json::from_value(json!({ "voiceId": "x" })).unwrap();
        assert!(voice.available_styles.is_empty());
        assert!(voice.supported_locales.is_none());
        assert!(voice.supported_locale_tags().is_empty());
        assert_eq!(voice.locale, "");
    }

    #[test]
    fn test_voice_descriptor_null_fields_default() {
        let voices: Vec<VoiceDescriptor> = serde_json::from_value(json!([
            {
                "voiceId": "en-UK-hazel",
                "displayName": "Hazel",
                "locale": "en-UK",
                "availableStyles": ["Conversational"]
            },
            {
                "voiceId": "xx",
                "displayName": null,
                "locale": null,
                "availableStyles": null,
                "supportedLocales": {"de-DE": {"detail": null, "availableStyles": null}}
            }
        ]))
        .unwrap();

        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].display_name, "");
        assert_eq!(voices[1].locale, "");
        assert!(voices[1].available_styles.is_empty());
        let details = &voices[1].supported_locales.as_ref().unwrap()["de-DE"];
        assert!(details.detail.is_none());
        assert!(details.available_styles.is_empty());
    }

    #[test]
    fn test_voice_builder_helpers() {
        let voice = VoiceDescriptor::new("de-DE-lia".into(), "Lia".into(), "de-DE".into())
            .with_styles(["Promo"])
            .with_supported_locale("en-US", LocaleDetails::default());

        assert_eq!(voice.available_styles, vec!["Promo".to_string()]);
        assert_eq!(voice.supported_locale_tags(), vec!["en-US"]);
    }

    #[test]
    fn test_unique_id_is_voice_and_style() {
        assert_eq!(Configuration::unique_id_for("en-UK-hazel", "Conversational"), "en-UK-hazel_Conversational");
        assert_ne!(
            Configuration::unique_id_for("en-UK-hazel", "Calm"),
            Configuration::unique_id_for("en-UK-hazel", "Conversational")
        );
    }

    #[test]
    fn test_configuration_flat_record() {
        let config = sample_configuration();
        let record = serde_json::to_value(&config).unwrap();

        assert_eq!(record["model"], json!("en-UK-hazel"));
        assert_eq!(record["url"], json!("https://api.murf.ai/v1/speech/generate"));
        assert_eq!(record["format_mp3"], json!(false));
        assert_eq!(record["sample_rate"], json!(44100));
        assert_eq!(record["multi_native_locale"], json!(""));
        assert!(record.get("pronunciation_dictionary").is_none());

        let restored: Configuration = serde_json::from_value(record).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_configuration_legacy_record_shape() {
        let record = json!({
            "api_key": "k1",
            "url": "https://api.murf.ai/v1/speech/generate",
            "model": "en-UK-hazel",
            "style": "Calm",
            "format_mp3": false,
            "multi_native_locale": "None",
            "pronunciation_dictionary": "",
            "sample_rate": "44100"
        });

        let config: Configuration = serde_json::from_value(record).unwrap();
        assert_eq!(config.sample_rate, SampleRate::Hz44100);
        assert_eq!(config.audio_format, AudioFormat::Wav);
        assert!(config.default_locale_override().is_none());

        let stored = serde_json::to_value(&config).unwrap();
        assert_eq!(stored["sample_rate"], json!(44100));
    }

    #[test]
    fn test_configuration_default_locale_override() {
        let mut config = sample_configuration();
        assert!(config.default_locale_override().is_none());

        config.multi_native_locale = "de-DE".to_string();
        assert_eq!(config.default_locale_override(), Some("de-DE"));
    }

    #[test]
    fn test_pronunciation_dictionary_parse() {
        let dict = PronunciationDictionary::parse(
            r#"{"live": {"type": "IPA", "pronunciation": "laɪv"}, "2022": {"type": "SAY_AS", "pronunciation": "twenty twenty two"}}"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(dict.0.len(), 2);
        assert_eq!(dict.0["live"].kind, PronunciationType::Ipa);
        assert_eq!(dict.0["2022"].kind, PronunciationType::SayAs);
    }

    #[test]
    fn test_pronunciation_dictionary_blank_is_none() {
        assert!(PronunciationDictionary::parse("").unwrap().is_none());
        assert!(PronunciationDictionary::parse("   \n").unwrap().is_none());
    }

    #[test]
    fn test_pronunciation_dictionary_errors() {
        match PronunciationDictionary::parse("{not json") {
            Err(MurfError::Validation { field, reason }) => {
                assert_eq!(field, "pronunciation_dictionary");
                assert_eq!(reason, "invalid_json");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }

        match PronunciationDictionary::parse(r#"{"live": {"type": "PHONETIC", "pronunciation": "x"}}"#) {
            Err(MurfError::Validation { reason, .. }) => assert_eq!(reason, "invalid_pronunciation_dictionary"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_types() {
        let auth = MurfError::Provider(ProviderError::Authentication("Invalid API key".to_string()));
        assert!(auth.is_authentication());
        assert!(auth.to_string().contains("Invalid API key"));

        let network = MurfError::Provider(ProviderError::Network("Connection failed".to_string()));
        assert!(!network.is_authentication());

        let duplicate = MurfError::DuplicateConfiguration("en-UK-hazel_Calm".to_string());
        assert!(duplicate.to_string().contains("already configured"));
    }

    #[test]
    fn test_synthesis_result_size() {
        let result = SynthesisResult::new(
            bytes::Bytes::from_static(&[0u8; 64]),
            AudioFormat::Wav,
            SampleRate::Hz24000,
            "carter".to_string(),
        );
        assert_eq!(result.size_bytes, 64);
        assert!(result.duration.is_none());
        assert!(result.locale.is_none());
    }
}
