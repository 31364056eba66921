use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MurfError;

/// Output container requested from the provider. Only MP3 and WAV are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AudioFormat {
    Mp3,
    #[default]
    Wav,
}

impl AudioFormat {
    pub fn from_mp3_toggle(format_mp3: bool) -> Self {
        if format_mp3 {
            Self::Mp3
        } else {
            Self::Wav
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Wav => "WAV",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mp3",
            Self::Wav => "audio/wav",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of sample rates the provider accepts.
///
/// Serialized as a number. Older records stored the pick-list string
/// (`"44100"`), so both forms are read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredSampleRate", into = "u32")]
pub enum SampleRate {
    Hz8000,
    Hz24000,
    #[default]
    Hz44100,
    Hz48000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 4] = [
        SampleRate::Hz8000,
        SampleRate::Hz24000,
        SampleRate::Hz44100,
        SampleRate::Hz48000,
    ];

    pub fn as_u32(&self) -> u32 {
        match self {
            Self::Hz8000 => 8000,
            Self::Hz24000 => 24000,
            Self::Hz44100 => 44100,
            Self::Hz48000 => 48000,
        }
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = MurfError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|rate| rate.as_u32() == value)
            .ok_or_else(|| MurfError::validation("sample_rate", format!("unsupported sample rate {}", value)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSampleRate {
    Number(u32),
    Text(String),
}

impl TryFrom<StoredSampleRate> for SampleRate {
    type Error = MurfError;

    fn try_from(value: StoredSampleRate) -> Result<Self, Self::Error> {
        match value {
            StoredSampleRate::Number(value) => Self::try_from(value),
            StoredSampleRate::Text(value) => value.parse(),
        }
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.as_u32()
    }
}

impl FromStr for SampleRate {
    type Err = MurfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| MurfError::validation("sample_rate", format!("'{}' is not a number", s)))?;
        Self::try_from(value)
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}
