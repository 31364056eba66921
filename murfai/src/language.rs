use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Default key of the host state holding the last detected spoken language.
pub const DEFAULT_LANGUAGE_SIGNAL_KEY: &str = "input_text.last_detected_language";

const ABSENT_SIGNALS: [&str; 2] = ["unknown", "unavailable"];

/// Maps a detected short language code to the locale tag sent to Murf.
#[derive(Debug, Clone)]
pub struct LanguageOverrideResolver {
    table: HashMap<String, String>,
}

impl LanguageOverrideResolver {
    pub fn new() -> Self {
        let table = [("de", "de-DE"), ("en", "en-UK")]
            .into_iter()
            .map(|(code, locale)| (code.to_string(), locale.to_string()))
            .collect();
        Self { table }
    }

    /// `None` means "use the configuration's own locale".
    pub fn resolve(&self, signal: Option<&str>) -> Option<String> {
        let code = signal.map(str::trim).filter(|code| is_present(code))?;
        let locale = self
            .table
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string());
        debug!("Resolved detected language '{}' to '{}'", code, locale);
        Some(locale)
    }
}

impl Default for LanguageOverrideResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn is_present(value: &str) -> bool {
    !value.is_empty() && !ABSENT_SIGNALS.contains(&value)
}

/// Read side of the external "last detected language" signal.
pub trait LanguageSignal: Send + Sync {
    fn current(&self) -> Option<String>;
}

/// Signal backed by a shared key/value state table, read under one key.
#[derive(Debug, Clone)]
pub struct StateLanguageSignal {
    states: Arc<RwLock<HashMap<String, String>>>,
    key: String,
}

impl StateLanguageSignal {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_states(Arc::new(RwLock::new(HashMap::new())), key)
    }

    pub fn with_states(states: Arc<RwLock<HashMap<String, String>>>, key: impl Into<String>) -> Self {
        Self {
            states,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set(&self, value: impl Into<String>) {
        match self.states.write() {
            Ok(mut states) => {
                states.insert(self.key.clone(), value.into());
            }
            Err(_) => warn!("Language state table is poisoned; dropping update for {}", self.key),
        }
    }
}

impl LanguageSignal for StateLanguageSignal {
    fn current(&self) -> Option<String> {
        let states = self.states.read().ok()?;
        states
            .get(&self.key)
            .map(|value| value.trim().to_string())
            .filter(|value| is_present(value))
    }
}
