//! codec variants behind one trait
//!
//! Four implemented encodings share the [`AudioCodec`] seam: the two
//! raw passthrough codecs and the two RLAD modes. Each variant owns its
//! own buffers and tier table; there is no shared base state.

use crate::core::convert::{convert_f32_to_i16, convert_i16_to_f32};
use crate::core::error::{RladError, Result};
use crate::core::types::{AudioChannels, AudioEncoding, CodecMode, BLOCK_FRAMES};
use crate::rlad::{BlockCodec, BlockHeader};

/// one audio codec variant
///
/// `encode` appends wire bytes for the given interleaved shorts;
/// `decode_i16`/`decode_f32` append decoded interleaved samples and
/// return the frame count. Instances are single-threaded and reusable.
pub trait AudioCodec: std::fmt::Debug {
    /// channel layout the codec was built for
    fn channels(&self) -> AudioChannels;

    /// which encoding this codec implements
    fn encoding(&self) -> AudioEncoding;

    /// encode interleaved shorts, appending to `dst`; returns bytes written
    fn encode(&mut self, samples: &[i16], dst: &mut Vec<u8>) -> Result<usize>;

    /// decode wire bytes, appending interleaved shorts; returns frames decoded
    fn decode_i16(&mut self, src: &[u8], dst: &mut Vec<i16>) -> Result<usize>;

    /// decode wire bytes, appending normalized floats; returns frames decoded
    fn decode_f32(&mut self, src: &[u8], dst: &mut Vec<f32>) -> Result<usize>;
}

/// Build the codec for an encoding, or [`RladError::UnsupportedFormat`]
/// for encodings that are recognized but not implemented.
pub fn codec_for(encoding: AudioEncoding, channels: AudioChannels) -> Result<Box<dyn AudioCodec>> {
    match encoding {
        AudioEncoding::RawPcm => Ok(Box::new(RawPcmCodec::new(channels))),
        AudioEncoding::RawFloat => Ok(Box::new(RawFloatCodec::new(channels))),
        AudioEncoding::RladLossless => Ok(Box::new(RladCodec::new(CodecMode::Lossless, channels))),
        AudioEncoding::RladLossy => Ok(Box::new(RladCodec::new(CodecMode::Lossy, channels))),
        AudioEncoding::Flac | AudioEncoding::Vorbis | AudioEncoding::Opus => {
            Err(RladError::UnsupportedFormat(encoding.name()))
        }
    }
}

// raw pcm

/// uncompressed signed 16-bit little-endian PCM
#[derive(Debug)]
pub struct RawPcmCodec {
    channels: AudioChannels,
}

impl RawPcmCodec {
    /// new passthrough codec
    pub fn new(channels: AudioChannels) -> Self {
        RawPcmCodec { channels }
    }

    fn check_frames(&self, encoding: AudioEncoding, len: usize, unit: usize) -> Result<()> {
        let frame = unit * self.channels.count();
        if len % frame != 0 {
            return Err(RladError::IncompleteFrame {
                encoding: encoding.name(),
                channels: self.channels.count() as u8,
                remainder: len % frame,
            });
        }
        Ok(())
    }
}

impl AudioCodec for RawPcmCodec {
    fn channels(&self) -> AudioChannels {
        self.channels
    }

    fn encoding(&self) -> AudioEncoding {
        AudioEncoding::RawPcm
    }

    fn encode(&mut self, samples: &[i16], dst: &mut Vec<u8>) -> Result<usize> {
        self.check_frames(AudioEncoding::RawPcm, samples.len(), 1)?;
        let start = dst.len();
        for s in samples {
            dst.extend_from_slice(&s.to_le_bytes());
        }
        Ok(dst.len() - start)
    }

    fn decode_i16(&mut self, src: &[u8], dst: &mut Vec<i16>) -> Result<usize> {
        self.check_frames(AudioEncoding::RawPcm, src.len(), 2)?;
        dst.reserve(src.len() / 2);
        for pair in src.chunks_exact(2) {
            dst.push(i16::from_le_bytes([pair[0], pair[1]]));
        }
        Ok(src.len() / 2 / self.channels.count())
    }

    fn decode_f32(&mut self, src: &[u8], dst: &mut Vec<f32>) -> Result<usize> {
        let mut shorts = Vec::new();
        let frames = self.decode_i16(src, &mut shorts)?;
        let start = dst.len();
        dst.resize(start + shorts.len(), 0.0);
        convert_i16_to_f32(&shorts, &mut dst[start..]);
        Ok(frames)
    }
}

// raw float

/// uncompressed 32-bit little-endian float PCM
#[derive(Debug)]
pub struct RawFloatCodec {
    channels: AudioChannels,
}

impl RawFloatCodec {
    /// new passthrough codec
    pub fn new(channels: AudioChannels) -> Self {
        RawFloatCodec { channels }
    }

    fn check_bytes(&self, len: usize) -> Result<()> {
        let frame = 4 * self.channels.count();
        if len % frame != 0 {
            return Err(RladError::IncompleteFrame {
                encoding: AudioEncoding::RawFloat.name(),
                channels: self.channels.count() as u8,
                remainder: len % frame,
            });
        }
        Ok(())
    }
}

impl AudioCodec for RawFloatCodec {
    fn channels(&self) -> AudioChannels {
        self.channels
    }

    fn encoding(&self) -> AudioEncoding {
        AudioEncoding::RawFloat
    }

    fn encode(&mut self, samples: &[i16], dst: &mut Vec<u8>) -> Result<usize> {
        if samples.len() % self.channels.count() != 0 {
            return Err(RladError::IncompleteFrame {
                encoding: AudioEncoding::RawFloat.name(),
                channels: self.channels.count() as u8,
                remainder: samples.len() % self.channels.count(),
            });
        }
        let mut floats = vec![0.0f32; samples.len()];
        convert_i16_to_f32(samples, &mut floats);
        let start = dst.len();
        for f in &floats {
            dst.extend_from_slice(&f.to_le_bytes());
        }
        Ok(dst.len() - start)
    }

    fn decode_i16(&mut self, src: &[u8], dst: &mut Vec<i16>) -> Result<usize> {
        let mut floats = Vec::new();
        let frames = self.decode_f32(src, &mut floats)?;
        let start = dst.len();
        dst.resize(start + floats.len(), 0);
        convert_f32_to_i16(&floats, &mut dst[start..]);
        Ok(frames)
    }

    fn decode_f32(&mut self, src: &[u8], dst: &mut Vec<f32>) -> Result<usize> {
        self.check_bytes(src.len())?;
        dst.reserve(src.len() / 4);
        for quad in src.chunks_exact(4) {
            dst.push(f32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]));
        }
        Ok(src.len() / 4 / self.channels.count())
    }
}

// rlad

/// RLAD block codec behind the common trait
///
/// The wire form at this level is self-contained: one block header
/// followed by its payload, so any encoded blob decodes on its own.
/// The stream reader and writer drive the inner [`BlockCodec`]
/// directly instead, sharing one header per stream position.
#[derive(Debug)]
pub struct RladCodec {
    inner: BlockCodec,
    payload: Vec<u8>,
}

impl RladCodec {
    /// new codec in the given mode
    pub fn new(mode: CodecMode, channels: AudioChannels) -> Self {
        RladCodec {
            inner: BlockCodec::new(mode, channels),
            payload: Vec::new(),
        }
    }

    /// the wrapped block codec
    pub fn block_codec(&mut self) -> &mut BlockCodec {
        &mut self.inner
    }
}

impl AudioCodec for RladCodec {
    fn channels(&self) -> AudioChannels {
        self.inner.channels()
    }

    fn encoding(&self) -> AudioEncoding {
        match self.inner.mode() {
            CodecMode::Lossless => AudioEncoding::RladLossless,
            CodecMode::Lossy => AudioEncoding::RladLossy,
        }
    }

    fn encode(&mut self, samples: &[i16], dst: &mut Vec<u8>) -> Result<usize> {
        self.payload.clear();
        let mut payload = std::mem::take(&mut self.payload);
        let result = self.inner.encode(samples, false, &mut payload);
        self.payload = payload;
        result?;

        let header = self
            .inner
            .block_header()
            .ok_or_else(|| RladError::invalid_operation("No block header after encode"))?;

        let start = dst.len();
        header.write_to(dst)?;
        dst.extend_from_slice(&self.payload);
        Ok(dst.len() - start)
    }

    fn decode_i16(&mut self, src: &[u8], dst: &mut Vec<i16>) -> Result<usize> {
        let mut cursor = src;
        let header = BlockHeader::read_from(&mut cursor, self.inner.channels())?;
        self.inner.set_block_header(header)?;

        let expected = BLOCK_FRAMES * self.inner.channels().count();
        let start = dst.len();
        dst.resize(start + expected, 0);
        self.inner.decode_i16(cursor, &mut dst[start..])?;
        Ok(BLOCK_FRAMES)
    }

    fn decode_f32(&mut self, src: &[u8], dst: &mut Vec<f32>) -> Result<usize> {
        let mut cursor = src;
        let header = BlockHeader::read_from(&mut cursor, self.inner.channels())?;
        self.inner.set_block_header(header)?;

        let expected = BLOCK_FRAMES * self.inner.channels().count();
        let start = dst.len();
        dst.resize(start + expected, 0.0);
        self.inner.decode_f32(cursor, &mut dst[start..])?;
        Ok(BLOCK_FRAMES)
    }
}
