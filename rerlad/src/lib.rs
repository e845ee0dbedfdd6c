//! rerlad - Audio format converter library
//!
//! Converts common audio formats to and from RLAD streams. The heavy
//! lifting lives in `librlad_audio`; this crate adds file decoding via
//! symphonia and WAV output.

pub mod audio;

use anyhow::{bail, Context, Result};
use librlad_audio::{convert, AudioChannels};

/// Re-export the stream info type
pub use librlad_audio::AudioInfo;

/// map a channel count onto a supported RLAD layout
fn channel_layout(channels: usize) -> Result<AudioChannels> {
    AudioChannels::try_from(channels as u8)
        .map_err(|_| anyhow::anyhow!("Unsupported channel count: {}", channels))
}

/// Encode any supported audio file's bytes into an RLAD stream
pub fn encode_from_audio(audio_bytes: &[u8], lossy: bool) -> Result<Vec<u8>> {
    let (samples_f32, sample_rate, channels) = audio::read_audio_from_bytes(audio_bytes)?;
    if samples_f32.is_empty() {
        bail!("Input file contains no audio");
    }

    let layout = channel_layout(channels)?;

    let mut samples = vec![0i16; samples_f32.len()];
    convert::convert_f32_to_i16(&samples_f32, &mut samples);

    let encoded = if lossy {
        librlad_audio::encode_lossy(&samples, layout, sample_rate)
    } else {
        librlad_audio::encode_lossless(&samples, layout, sample_rate)
    };
    encoded.map_err(|e| anyhow::anyhow!("Failed to encode RLAD stream: {}", e))
}

/// Decode an RLAD stream to an in-memory WAV file
pub fn decode_to_wav(data: &[u8]) -> Result<Vec<u8>> {
    let info = get_rlad_info(data)?;
    let samples =
        librlad_audio::decode(data).map_err(|e| anyhow::anyhow!("Failed to decode: {}", e))?;
    audio::write_wav_to_bytes(&samples, info.sample_rate, info.channels as usize)
}

/// Get information about an RLAD stream
pub fn get_rlad_info(data: &[u8]) -> Result<AudioInfo> {
    librlad_audio::info(data).context("Invalid RLAD stream")
}
