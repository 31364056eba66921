use murfai_core::{AudioFormat, MurfError, Result};

const WAV_HEADER_LEN: usize = 44;

/// Fields read from a canonical 44-byte RIFF/WAVE header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

pub fn detect_audio_format(data: &[u8]) -> Result<AudioFormat> {
    if data.len() < 12 {
        return Err(MurfError::Configuration(
            "Not enough data to detect audio format".to_string(),
        ));
    }

    if &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
        return Ok(AudioFormat::Wav);
    }

    // ID3 tag or MPEG frame sync
    if &data[0..3] == b"ID3" || (data[0] == 0xFF && (data[1] & 0xE0) == 0xE0) {
        return Ok(AudioFormat::Mp3);
    }

    Err(MurfError::Configuration("Unknown audio format".to_string()))
}

pub fn parse_wav_header(data: &[u8]) -> Option<WavInfo> {
    if data.len() < WAV_HEADER_LEN || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return None;
    }

    Some(WavInfo {
        channels: u16::from_le_bytes([data[22], data[23]]),
        sample_rate: u32::from_le_bytes([data[24], data[25], data[26], data[27]]),
        bits_per_sample: u16::from_le_bytes([data[34], data[35]]),
    })
}

/// Duration of a WAV payload. Compressed formats would need decoding, so MP3 yields `None`.
pub fn calculate_duration_seconds(data: &[u8], format: AudioFormat) -> Option<f32> {
    match format {
        AudioFormat::Wav => {
            let info = parse_wav_header(data)?;
            let bytes_per_second =
                info.sample_rate as usize * info.channels as usize * (info.bits_per_sample as usize / 8);
            if bytes_per_second == 0 || data.len() <= WAV_HEADER_LEN {
                return None;
            }
            Some((data.len() - WAV_HEADER_LEN) as f32 / bytes_per_second as f32)
        }
        AudioFormat::Mp3 => None,
    }
}
