//! The setup wizard.
//!
//! A wizard session is an explicit [`ProvisioningState`] value: the host keeps
//! it between steps and hands it back to [`ProvisioningFlow::step`] together
//! with whatever the user submitted. Nothing about a session lives on the flow
//! itself, so one flow instance serves any number of sessions.
//!
//! Steps run in the order `user` (API key) → `model` (voice) → `style` →
//! `options`, then the configuration is committed to a [`ConfigurationStore`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use murfai_core::{
    AudioFormat, Configuration, MurfError, PronunciationDictionary, SampleRate, VoiceCatalog, VoiceDescriptor,
    DEFAULT_STYLE,
};
use murfai_provider::DEFAULT_SYNTHESIS_URL;

use crate::form::{input_str, FieldKind, FieldSpec, FormErrors, FormSchema, SelectOption, UserInput, BASE_ERROR};
use crate::store::{ConfigEntry, ConfigurationStore};
use crate::voices::{VoiceIndex, NO_LOCALE_OVERRIDE};

pub const STEP_USER: &str = "user";
pub const STEP_MODEL: &str = "model";
pub const STEP_STYLE: &str = "style";
pub const STEP_OPTIONS: &str = "options";

pub const FIELD_API_KEY: &str = "api_key";
pub const FIELD_MODEL: &str = "model";
pub const FIELD_STYLE: &str = "style";
pub const FIELD_URL: &str = "url";
pub const FIELD_FORMAT_MP3: &str = "format_mp3";
pub const FIELD_MULTI_NATIVE_LOCALE: &str = "multi_native_locale";
pub const FIELD_PRONUNCIATION_DICTIONARY: &str = "pronunciation_dictionary";
pub const FIELD_SAMPLE_RATE: &str = "sample_rate";

pub const ERROR_REQUIRED: &str = "required";
pub const ERROR_INVALID_API_KEY: &str = "invalid_api_key";
pub const ERROR_API_KEY_REQUIRED: &str = "api_key_required";
pub const ERROR_UNKNOWN: &str = "unknown_error";
pub const ERROR_INVALID_CHOICE: &str = "invalid_choice";
pub const ERROR_INVALID_URL: &str = "invalid_url";
pub const ERROR_INVALID_JSON: &str = "invalid_json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    NoVoiceSelected,
    AlreadyConfigured,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoVoiceSelected => "no_voice_selected",
            Self::AlreadyConfigured => "already_configured",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum FlowPhase {
    AwaitingApiKey,
    AwaitingVoice,
    AwaitingStyle,
    AwaitingOptions,
    Committed,
    Aborted(AbortReason),
}

impl FlowPhase {
    /// Form step shown while in this phase; `None` once the session is over.
    pub fn step_id(&self) -> Option<&'static str> {
        match self {
            Self::AwaitingApiKey => Some(STEP_USER),
            Self::AwaitingVoice => Some(STEP_MODEL),
            Self::AwaitingStyle => Some(STEP_STYLE),
            Self::AwaitingOptions => Some(STEP_OPTIONS),
            Self::Committed | Self::Aborted(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.step_id().is_none()
    }
}

/// Everything one wizard session has collected so far.
///
/// Answers only ever accumulate: a later step never clears a field an earlier
/// step stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningState {
    pub flow_id: Uuid,
    pub phase: FlowPhase,
    pub api_key: Option<String>,
    pub voice_id: Option<String>,
    pub voice_locale: Option<String>,
    pub style: Option<String>,
    /// Raw answers submitted on the options step, merged across attempts.
    #[serde(default)]
    pub options: UserInput,
    #[serde(default)]
    pub voices: Vec<VoiceDescriptor>,
}

impl ProvisioningState {
    pub fn new() -> Self {
        Self {
            flow_id: Uuid::new_v4(),
            phase: FlowPhase::AwaitingApiKey,
            api_key: None,
            voice_id: None,
            voice_locale: None,
            style: None,
            options: UserInput::new(),
            voices: Vec::new(),
        }
    }

    pub fn voice_index(&self) -> VoiceIndex<'_> {
        VoiceIndex::new(&self.voices)
    }

    pub fn selected_voice(&self) -> Option<&VoiceDescriptor> {
        self.voice_id.as_deref().and_then(|id| self.voice_index().find(id))
    }
}

impl Default for ProvisioningState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Show this form (possibly the same step again, with errors).
    Form(FormSchema),
    Abort(AbortReason),
    CreateEntry(ConfigEntry),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub state: ProvisioningState,
    pub outcome: StepOutcome,
}

impl StepResult {
    pub fn form(&self) -> Option<&FormSchema> {
        match &self.outcome {
            StepOutcome::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn errors(&self) -> Option<&FormErrors> {
        self.form().map(|form| &form.errors)
    }
}

/// Answers of the options step after validation.
#[derive(Debug)]
struct DeliveryOptions {
    endpoint_url: String,
    audio_format: AudioFormat,
    multi_native_locale: String,
    pronunciation_dictionary: Option<String>,
    sample_rate: SampleRate,
}

type FieldResult<T> = std::result::Result<T, String>;

pub struct ProvisioningFlow {
    catalog: Arc<dyn VoiceCatalog>,
    store: Arc<dyn ConfigurationStore>,
    default_endpoint_url: String,
    default_api_key: Option<String>,
}

impl ProvisioningFlow {
    pub fn new(catalog: Arc<dyn VoiceCatalog>, store: Arc<dyn ConfigurationStore>) -> Self {
        Self {
            catalog,
            store,
            default_endpoint_url: DEFAULT_SYNTHESIS_URL.to_string(),
            default_api_key: None,
        }
    }

    /// Endpoint URL pre-filled on the options step.
    pub fn with_default_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.default_endpoint_url = url.into();
        self
    }

    /// API key pre-filled on the first step.
    pub fn with_default_api_key(mut self, api_key: Option<String>) -> Self {
        self.default_api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn store(&self) -> &Arc<dyn ConfigurationStore> {
        &self.store
    }

    /// Opens a new session on the API key step.
    pub fn start(&self) -> StepResult {
        let state = ProvisioningState::new();
        debug!("Starting Murf setup flow {}", state.flow_id);
        self.show_user_form(state, FormErrors::new())
    }

    /// Runs the current step of `state` with the user's submission.
    ///
    /// `None` input asks for the current step's form without submitting.
    pub async fn step(&self, state: ProvisioningState, input: Option<UserInput>) -> StepResult {
        match state.phase.clone() {
            FlowPhase::AwaitingApiKey => self.step_user(state, input).await,
            FlowPhase::AwaitingVoice => self.step_model(state, input),
            FlowPhase::AwaitingStyle => self.step_style(state, input),
            FlowPhase::AwaitingOptions => self.step_options(state, input).await,
            FlowPhase::Committed => StepResult {
                state,
                outcome: StepOutcome::Abort(AbortReason::AlreadyConfigured),
            },
            FlowPhase::Aborted(reason) => StepResult {
                state,
                outcome: StepOutcome::Abort(reason),
            },
        }
    }

    async fn step_user(&self, mut state: ProvisioningState, input: Option<UserInput>) -> StepResult {
        let Some(input) = input else {
            return self.show_user_form(state, FormErrors::new());
        };

        let Some(api_key) = input_str(&input, FIELD_API_KEY).filter(|key| !key.trim().is_empty()) else {
            return self.show_user_form(state, field_error(FIELD_API_KEY, ERROR_REQUIRED));
        };

        match self.catalog.fetch_voices(api_key).await {
            Ok(voices) => {
                debug!("Flow {} received {} voices", state.flow_id, voices.len());
                state.api_key = Some(api_key.to_string());
                state.voices = voices;
                state.phase = FlowPhase::AwaitingVoice;
                self.show_model_form(state, FormErrors::new())
            }
            Err(e) if e.is_authentication() => {
                warn!("Murf rejected the API key for flow {}", state.flow_id);
                self.show_user_form(state, field_error(FIELD_API_KEY, ERROR_INVALID_API_KEY))
            }
            Err(e) => {
                error!("Failed to fetch Murf voices: {}", e);
                self.show_user_form(state, field_error(BASE_ERROR, ERROR_UNKNOWN))
            }
        }
    }

    fn step_model(&self, mut state: ProvisioningState, input: Option<UserInput>) -> StepResult {
        let Some(input) = input else {
            return self.show_model_form(state, FormErrors::new());
        };

        let index = state.voice_index();
        let voice_id = match input_str(&input, FIELD_MODEL).filter(|id| !id.is_empty()) {
            None => return self.show_model_form(state, field_error(FIELD_MODEL, ERROR_REQUIRED)),
            Some(id) if !index.is_selectable(id) => {
                return self.show_model_form(state, field_error(FIELD_MODEL, ERROR_INVALID_CHOICE))
            }
            Some(id) => id.to_string(),
        };
        let voice_locale = index.locale_for(&voice_id).map(str::to_string);

        debug!("Flow {} selected voice {}", state.flow_id, voice_id);
        state.voice_id = Some(voice_id);
        state.voice_locale = voice_locale;
        state.phase = FlowPhase::AwaitingStyle;
        self.step_style(state, None)
    }

    fn step_style(&self, mut state: ProvisioningState, input: Option<UserInput>) -> StepResult {
        let styles = match state.voice_id.as_deref() {
            Some(voice_id) => state.voice_index().styles_for(voice_id).map(<[String]>::to_vec),
            None => None,
        };
        let Some(styles) = styles else {
            let err = MurfError::InconsistentState(format!(
                "selected voice {:?} is not in the fetched catalog",
                state.voice_id
            ));
            warn!("Aborting flow {}: {}", state.flow_id, err);
            return abort(state, AbortReason::NoVoiceSelected);
        };

        if styles.is_empty() {
            debug!("Voice has no styles, using '{}'", DEFAULT_STYLE);
            state.style = Some(DEFAULT_STYLE.to_string());
            state.phase = FlowPhase::AwaitingOptions;
            return self.show_options_form(state, FormErrors::new());
        }

        let Some(input) = input else {
            return show(state, style_form(&styles, FormErrors::new()));
        };

        match input_str(&input, FIELD_STYLE).filter(|style| !style.is_empty()) {
            None => show(state, style_form(&styles, field_error(FIELD_STYLE, ERROR_REQUIRED))),
            Some(style) if !styles.iter().any(|s| s == style) => {
                show(state, style_form(&styles, field_error(FIELD_STYLE, ERROR_INVALID_CHOICE)))
            }
            Some(style) => {
                state.style = Some(style.to_string());
                state.phase = FlowPhase::AwaitingOptions;
                self.show_options_form(state, FormErrors::new())
            }
        }
    }

    async fn step_options(&self, mut state: ProvisioningState, input: Option<UserInput>) -> StepResult {
        let Some(input) = input else {
            return self.show_options_form(state, FormErrors::new());
        };

        state.options.extend(input);
        match self.validate_options(&state) {
            Ok(options) => self.commit(state, options).await,
            Err(errors) => self.show_options_form(state, errors),
        }
    }

    fn validate_options(&self, state: &ProvisioningState) -> std::result::Result<DeliveryOptions, FormErrors> {
        let answers = &state.options;
        let locale_options = state
            .voice_id
            .as_deref()
            .map(|id| state.voice_index().locale_override_options(id))
            .unwrap_or_default();

        let mut errors = FormErrors::new();
        let endpoint_url = record(
            &mut errors,
            FIELD_URL,
            parse_endpoint_url(answers.get(FIELD_URL), &self.default_endpoint_url),
        );
        let audio_format = record(&mut errors, FIELD_FORMAT_MP3, parse_audio_format(answers.get(FIELD_FORMAT_MP3)));
        let multi_native_locale = record(
            &mut errors,
            FIELD_MULTI_NATIVE_LOCALE,
            parse_locale_override(answers.get(FIELD_MULTI_NATIVE_LOCALE), &locale_options),
        );
        let pronunciation_dictionary = record(
            &mut errors,
            FIELD_PRONUNCIATION_DICTIONARY,
            parse_pronunciation_dictionary(answers.get(FIELD_PRONUNCIATION_DICTIONARY)),
        );
        let sample_rate = record(&mut errors, FIELD_SAMPLE_RATE, parse_sample_rate(answers.get(FIELD_SAMPLE_RATE)));

        match (endpoint_url, audio_format, multi_native_locale, pronunciation_dictionary, sample_rate) {
            (Some(endpoint_url), Some(audio_format), Some(multi_native_locale), Some(pronunciation_dictionary), Some(sample_rate))
                if errors.is_empty() =>
            {
                Ok(DeliveryOptions {
                    endpoint_url,
                    audio_format,
                    multi_native_locale,
                    pronunciation_dictionary,
                    sample_rate,
                })
            }
            _ => Err(errors),
        }
    }

    async fn commit(&self, mut state: ProvisioningState, options: DeliveryOptions) -> StepResult {
        let Some(api_key) = state.api_key.clone().filter(|key| !key.trim().is_empty()) else {
            return self.show_options_form(state, field_error(BASE_ERROR, ERROR_API_KEY_REQUIRED));
        };
        let (Some(voice_id), Some(style)) = (state.voice_id.clone(), state.style.clone()) else {
            warn!("Flow {} reached commit without a voice and style", state.flow_id);
            return abort(state, AbortReason::NoVoiceSelected);
        };

        let display_name = state
            .selected_voice()
            .map(|voice| voice.display_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| voice_id.clone());
        let title = format!("MurfAI TTS ({}, {})", display_name, style);

        let configuration = Configuration {
            api_key,
            endpoint_url: options.endpoint_url,
            unique_id: Configuration::unique_id_for(&voice_id, &style),
            voice_id,
            style,
            audio_format: options.audio_format,
            multi_native_locale: options.multi_native_locale,
            pronunciation_dictionary: options.pronunciation_dictionary,
            sample_rate: options.sample_rate,
            voice_locale: state.voice_locale.clone(),
        };

        match self.store.insert(ConfigEntry::new(title, configuration)).await {
            Ok(entry) => {
                info!("Created Murf configuration '{}' ({})", entry.title, entry.unique_id());
                state.phase = FlowPhase::Committed;
                StepResult {
                    state,
                    outcome: StepOutcome::CreateEntry(entry),
                }
            }
            Err(MurfError::DuplicateConfiguration(unique_id)) => {
                info!("Murf configuration {} already exists", unique_id);
                abort(state, AbortReason::AlreadyConfigured)
            }
            Err(MurfError::Validation { field, reason }) => self.show_options_form(state, field_error(&field, &reason)),
            Err(e) => {
                error!("Failed to store Murf configuration: {}", e);
                self.show_options_form(state, field_error(BASE_ERROR, ERROR_UNKNOWN))
            }
        }
    }

    fn show_user_form(&self, state: ProvisioningState, errors: FormErrors) -> StepResult {
        let mut api_key = FieldSpec::required(FIELD_API_KEY, FieldKind::Text);
        if let Some(default) = &self.default_api_key {
            api_key = api_key.with_default(json!(default));
        }
        show(state, FormSchema::new(STEP_USER, vec![api_key]).with_errors(errors))
    }

    fn show_model_form(&self, state: ProvisioningState, errors: FormErrors) -> StepResult {
        let options = state.voice_index().voice_options();
        let form = FormSchema::new(
            STEP_MODEL,
            vec![FieldSpec::required(FIELD_MODEL, FieldKind::Select { options })],
        )
        .with_errors(errors);
        show(state, form)
    }

    fn show_options_form(&self, state: ProvisioningState, errors: FormErrors) -> StepResult {
        let locale_options = state
            .voice_id
            .as_deref()
            .map(|id| state.voice_index().locale_override_options(id))
            .unwrap_or_else(|| vec![SelectOption::plain(NO_LOCALE_OVERRIDE)]);
        let sample_rates: Vec<SelectOption> = SampleRate::ALL
            .iter()
            .map(|rate| SelectOption::plain(rate.to_string()))
            .collect();

        // Previously submitted answers are shown again instead of the defaults.
        let answered = |key: &str, default: Value| state.options.get(key).cloned().unwrap_or(default);

        let fields = vec![
            FieldSpec::optional(FIELD_URL, FieldKind::Text, answered(FIELD_URL, json!(self.default_endpoint_url))),
            FieldSpec::optional(FIELD_FORMAT_MP3, FieldKind::Boolean, answered(FIELD_FORMAT_MP3, json!(false))),
            FieldSpec::optional(
                FIELD_MULTI_NATIVE_LOCALE,
                FieldKind::Select { options: locale_options },
                answered(FIELD_MULTI_NATIVE_LOCALE, json!(NO_LOCALE_OVERRIDE)),
            ),
            FieldSpec::optional(
                FIELD_PRONUNCIATION_DICTIONARY,
                FieldKind::Multiline,
                answered(FIELD_PRONUNCIATION_DICTIONARY, json!("")),
            ),
            FieldSpec::optional(
                FIELD_SAMPLE_RATE,
                FieldKind::Select { options: sample_rates },
                answered(FIELD_SAMPLE_RATE, json!(SampleRate::default().to_string())),
            ),
        ];

        show(state, FormSchema::new(STEP_OPTIONS, fields).with_errors(errors))
    }
}

fn style_form(styles: &[String], errors: FormErrors) -> FormSchema {
    let options: Vec<SelectOption> = styles.iter().map(|style| SelectOption::plain(style.as_str())).collect();
    FormSchema::new(STEP_STYLE, vec![FieldSpec::required(FIELD_STYLE, FieldKind::Select { options })]).with_errors(errors)
}

fn show(state: ProvisioningState, form: FormSchema) -> StepResult {
    StepResult {
        state,
        outcome: StepOutcome::Form(form),
    }
}

fn abort(mut state: ProvisioningState, reason: AbortReason) -> StepResult {
    state.phase = FlowPhase::Aborted(reason);
    StepResult {
        state,
        outcome: StepOutcome::Abort(reason),
    }
}

fn field_error(field: &str, reason: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.insert(field.to_string(), reason.to_string());
    errors
}

fn record<T>(errors: &mut FormErrors, field: &str, result: FieldResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            errors.insert(field.to_string(), reason);
            None
        }
    }
}

fn parse_endpoint_url(value: Option<&Value>, default: &str) -> FieldResult<String> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(default.to_string()),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(default.to_string()),
        Some(Value::String(raw)) => raw.trim(),
        Some(_) => return Err(ERROR_INVALID_URL.to_string()),
    };

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(raw.to_string()),
        _ => Err(ERROR_INVALID_URL.to_string()),
    }
}

fn parse_audio_format(value: Option<&Value>) -> FieldResult<AudioFormat> {
    match value {
        None | Some(Value::Null) => Ok(AudioFormat::default()),
        Some(Value::Bool(format_mp3)) => Ok(AudioFormat::from_mp3_toggle(*format_mp3)),
        Some(_) => Err(ERROR_INVALID_CHOICE.to_string()),
    }
}

/// The "None" sentinel (or nothing at all) is stored as an empty string.
fn parse_locale_override(value: Option<&Value>, offered: &[SelectOption]) -> FieldResult<String> {
    let choice = match value {
        None | Some(Value::Null) => return Ok(String::new()),
        Some(Value::String(choice)) => choice.as_str(),
        Some(_) => return Err(ERROR_INVALID_CHOICE.to_string()),
    };

    if choice.is_empty() || choice == NO_LOCALE_OVERRIDE {
        Ok(String::new())
    } else if offered.iter().any(|option| option.value == choice) {
        Ok(choice.to_string())
    } else {
        Err(ERROR_INVALID_CHOICE.to_string())
    }
}

fn parse_pronunciation_dictionary(value: Option<&Value>) -> FieldResult<Option<String>> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) => raw,
        Some(_) => return Err(ERROR_INVALID_JSON.to_string()),
    };

    match PronunciationDictionary::parse(raw) {
        Ok(Some(_)) => Ok(Some(raw.trim().to_string())),
        Ok(None) => Ok(None),
        Err(MurfError::Validation { reason, .. }) => Err(reason),
        Err(_) => Err(ERROR_INVALID_JSON.to_string()),
    }
}

fn parse_sample_rate(value: Option<&Value>) -> FieldResult<SampleRate> {
    let rate = match value {
        None | Some(Value::Null) => return Ok(SampleRate::default()),
        Some(Value::String(raw)) => raw.parse().ok(),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .and_then(|n| SampleRate::try_from(n).ok()),
        Some(_) => None,
    };
    rate.ok_or_else(|| ERROR_INVALID_CHOICE.to_string())
}
