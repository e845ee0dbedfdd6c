#![allow(clippy::needless_range_loop)]

//! RLAD (Run-Length Accumulating Deltas) audio codec.
//!
//! A block-based lossless/lossy compression scheme for 16-bit LPCM:
//! per-channel sample deltas are classified into four precision tiers
//! per 8-sample chunk, adjacent same-tier chunks collapse into runs,
//! and deltas are bit-packed at the run's width. Lossy mode drops the
//! low 4 bits of every sample before encoding and restores the range
//! on decode.
//!
//! The convenience functions below cover the common paths; the
//! [`Reader`], [`Writer`] and [`BlockCodec`] types expose the
//! streaming and block-level machinery directly.

pub mod core;
pub mod rlad;

mod codec;
mod reader;
mod writer;

pub use self::core::{
    convert, simd, AudioChannels, AudioEncoding, CodecMode, RladError, Result, StreamHeader,
    BLOCK_FRAMES, CHUNKS_PER_CHANNEL, CHUNK_SAMPLES, MAGIC, MAX_BLOCK_DATA, MAX_CHANNELS,
    STREAM_HEADER_SIZE,
};
pub use codec::{codec_for, AudioCodec, RawFloatCodec, RawPcmCodec, RladCodec};
pub use reader::Reader;
pub use rlad::{BlockCodec, BlockHeader, RunHeader, Tier};
pub use writer::Writer;

// audio info for the info() function

/// info about an RLAD stream
#[derive(Debug, Clone)]
pub struct AudioInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u8,
    /// Total number of live frames
    pub frame_count: u64,
    /// Number of 512-frame blocks
    pub block_count: u32,
    /// Is this a lossless stream?
    pub lossless: bool,
    /// Duration in seconds
    pub duration_secs: f64,
    /// Compression ratio (raw PCM size / stream size)
    pub compression_ratio: f64,
}

// api functions

/// encode samples as a lossless RLAD stream
pub fn encode_lossless(
    samples: &[i16],
    channels: AudioChannels,
    sample_rate: u32,
) -> Result<Vec<u8>> {
    Writer::new(CodecMode::Lossless, channels, sample_rate).write_to_vec(samples)
}

/// encode samples as a lossy RLAD stream
///
/// Reconstruction matches the input with its low 4 bits zeroed.
pub fn encode_lossy(samples: &[i16], channels: AudioChannels, sample_rate: u32) -> Result<Vec<u8>> {
    Writer::new(CodecMode::Lossy, channels, sample_rate).write_to_vec(samples)
}

/// decode a complete RLAD stream to interleaved shorts
pub fn decode(data: &[u8]) -> Result<Vec<i16>> {
    let mut reader = Reader::open(data)?;
    let stride = reader.channels().count();
    let mut out = vec![0i16; reader.frame_count() as usize * stride];

    let mut filled = 0usize;
    loop {
        let n = reader.read(&mut out[filled * stride..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    out.truncate(filled * stride);
    Ok(out)
}

/// decode a complete RLAD stream to interleaved normalized floats
pub fn decode_f32(data: &[u8]) -> Result<Vec<f32>> {
    let mut reader = Reader::open(data)?;
    let stride = reader.channels().count();
    let mut out = vec![0.0f32; reader.frame_count() as usize * stride];

    let mut filled = 0usize;
    loop {
        let n = reader.read_f32(&mut out[filled * stride..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    out.truncate(filled * stride);
    Ok(out)
}

/// inspect a stream without decoding it
pub fn info(data: &[u8]) -> Result<AudioInfo> {
    if data.len() < STREAM_HEADER_SIZE {
        return Err(RladError::IncompleteHeader("stream header"));
    }
    let mut buf = [0u8; STREAM_HEADER_SIZE];
    buf.copy_from_slice(&data[..STREAM_HEADER_SIZE]);
    let header = StreamHeader::parse(&buf)?;

    let frame_count = header.frame_count();
    let raw_size = frame_count as f64 * header.channels.count() as f64 * 2.0;
    let compression_ratio = if data.is_empty() {
        0.0
    } else {
        raw_size / data.len() as f64
    };

    Ok(AudioInfo {
        sample_rate: header.sample_rate,
        channels: header.channels.count() as u8,
        frame_count,
        block_count: header.block_count,
        lossless: header.lossless,
        duration_secs: frame_count as f64 / header.sample_rate as f64,
        compression_ratio,
    })
}

// tests
