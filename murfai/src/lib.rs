//! Setup wizard and speech adapter for the Murf AI text-to-speech service
//!
//! The wizard ([`ProvisioningFlow`]) walks a user from an API key to a
//! committed [`Configuration`]; [`MurfTtsEntity`] then turns that
//! configuration into audio for the host.

pub mod config;
pub mod entity;
pub mod flow;
pub mod form;
pub mod language;
pub mod registry;
pub mod store;
pub mod voices;


// Re-export core types
pub use murfai_core::{
    AudioFormat, Configuration, LocaleDetails, MurfError, PronunciationDictionary, PronunciationEntry,
    PronunciationType, ProviderError, Result, SampleRate, SpeechSynthesizer, SynthesisResult, VoiceCatalog,
    VoiceDescriptor,
};

// Re-export main types
pub use config::MurfSettings;
pub use entity::{MurfTtsEntity, TtsAudio};
pub use flow::{AbortReason, FlowPhase, ProvisioningFlow, ProvisioningState, StepOutcome, StepResult};
pub use form::{FieldKind, FieldSpec, FormErrors, FormSchema, SelectOption, UserInput};
pub use language::{LanguageOverrideResolver, LanguageSignal, StateLanguageSignal};
pub use registry::{initialize_flows, ConfigFlowHandler, FlowRegistry, DOMAIN};
pub use store::{ConfigEntry, ConfigurationStore, JsonFileConfigurationStore, MemoryConfigurationStore};
pub use voices::VoiceIndex;

// Re-export the HTTP provider and utils
pub use murfai_provider as provider;
pub use murfai_utils as utils;
