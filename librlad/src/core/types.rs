//! common types for the rlad codec

use crate::core::error::{RladError, Result};

// constants

/// Magic number "RLAD"
pub const MAGIC: [u8; 4] = [0x52, 0x4c, 0x41, 0x44];

/// stream header size in bytes (includes magic)
pub const STREAM_HEADER_SIZE: usize = 16;

/// frames per block; the final block is padded up to this
pub const BLOCK_FRAMES: usize = 512;

/// samples per chunk within one channel
pub const CHUNK_SAMPLES: usize = 8;

/// chunks per channel per block
pub const CHUNKS_PER_CHANNEL: usize = BLOCK_FRAMES / CHUNK_SAMPLES;

/// most channels any layout carries
pub const MAX_CHANNELS: usize = 8;

/// hard format limit on a block's payload size (15-bit field)
pub const MAX_BLOCK_DATA: usize = 0x7fff;

/// stream header flag byte for lossless mode
pub const LOSSLESS_FLAG: u8 = 0xff;

/// stream header flag byte for lossy mode
pub const LOSSY_FLAG: u8 = 0x00;

// types

/// channel layout
///
/// The discriminant is the channel count, which is also how the layout
/// is stored in the stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioChannels {
    Mono = 1,
    Stereo = 2,
    Quadraphonic = 4,
    FiveOne = 6,
    SevenOne = 8,
}

impl AudioChannels {
    /// number of channels in this layout
    #[inline]
    pub fn count(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for AudioChannels {
    type Error = RladError;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            1 => Ok(AudioChannels::Mono),
            2 => Ok(AudioChannels::Stereo),
            4 => Ok(AudioChannels::Quadraphonic),
            6 => Ok(AudioChannels::FiveOne),
            8 => Ok(AudioChannels::SevenOne),
            _ => Err(RladError::bad_rlad(format!("invalid channel count {}", v))),
        }
    }
}

/// lossless or lossy operation of the RLAD block codec
///
/// The mode selects the tier-to-bits table and whether the x16
/// quantization pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecMode {
    Lossless,
    Lossy,
}

/// sample encodings this library knows about
///
/// | Encoding      | Status      |
/// |---------------|-------------|
/// | RawPcm        | implemented |
/// | RawFloat      | implemented |
/// | RladLossless  | implemented |
/// | RladLossy     | implemented |
/// | Flac          | planned     |
/// | Vorbis        | planned     |
/// | Opus          | planned     |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// uncompressed signed 16-bit little-endian PCM
    RawPcm,
    /// uncompressed 32-bit little-endian float PCM
    RawFloat,
    /// RLAD with 16-bit-precision deltas, bit-exact
    RladLossless,
    /// RLAD with 12-bit-max deltas and a x16 quantization pass
    RladLossy,
    /// planned, unimplemented
    Flac,
    /// planned, unimplemented
    Vorbis,
    /// planned, unimplemented
    Opus,
}

impl AudioEncoding {
    /// short name used in error messages
    pub fn name(self) -> &'static str {
        match self {
            AudioEncoding::RawPcm => "PCM",
            AudioEncoding::RawFloat => "Float",
            AudioEncoding::RladLossless => "RLAD lossless",
            AudioEncoding::RladLossy => "RLAD lossy",
            AudioEncoding::Flac => "FLAC",
            AudioEncoding::Vorbis => "Vorbis",
            AudioEncoding::Opus => "Opus",
        }
    }

    /// does this library ship a codec for the encoding?
    pub fn is_implemented(self) -> bool {
        matches!(
            self,
            AudioEncoding::RawPcm
                | AudioEncoding::RawFloat
                | AudioEncoding::RladLossless
                | AudioEncoding::RladLossy
        )
    }
}

/// RLAD file-level header
///
/// Serializes to exactly [`STREAM_HEADER_SIZE`] bytes, all multi-byte
/// integers little-endian:
///
/// ```text
/// magic "RLAD" (4) | lossless flag (1) | channels (1) |
/// last_block_frames (2) | sample_rate (4) | block_count (4)
/// ```
#[derive(Debug, Clone)]
pub struct StreamHeader {
    /// true for bit-exact mode, false for the x16 quantized mode
    pub lossless: bool,
    /// channel layout
    pub channels: AudioChannels,
    /// live frames in the terminal block (1..=512)
    pub last_block_frames: u16,
    /// sample rate in Hz
    pub sample_rate: u32,
    /// total number of blocks, >= 1
    pub block_count: u32,
}

impl StreamHeader {
    /// total live frames across the stream
    pub fn frame_count(&self) -> u64 {
        (self.block_count as u64 - 1) * BLOCK_FRAMES as u64 + self.last_block_frames as u64
    }

    /// codec mode implied by the lossless flag
    pub fn mode(&self) -> CodecMode {
        if self.lossless {
            CodecMode::Lossless
        } else {
            CodecMode::Lossy
        }
    }

    /// serialize to the 16-byte wire form
    pub fn to_bytes(&self) -> [u8; STREAM_HEADER_SIZE] {
        let mut buf = [0u8; STREAM_HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4] = if self.lossless { LOSSLESS_FLAG } else { LOSSY_FLAG };
        buf[5] = self.channels as u8;
        buf[6..8].copy_from_slice(&self.last_block_frames.to_le_bytes());
        buf[8..12].copy_from_slice(&self.sample_rate.to_le_bytes());
        buf[12..16].copy_from_slice(&self.block_count.to_le_bytes());
        buf
    }

    /// parse and validate the 16-byte wire form
    pub fn parse(buf: &[u8; STREAM_HEADER_SIZE]) -> Result<Self> {
        if buf[0..4] != MAGIC {
            return Err(RladError::bad_rlad("bad magic"));
        }

        let lossless = match buf[4] {
            LOSSLESS_FLAG => true,
            LOSSY_FLAG => false,
            other => {
                return Err(RladError::bad_rlad(format!(
                    "invalid lossless flag 0x{:02x}",
                    other
                )))
            }
        };

        let channels = AudioChannels::try_from(buf[5])?;

        let last_block_frames = u16::from_le_bytes([buf[6], buf[7]]);
        if last_block_frames == 0 || last_block_frames as usize > BLOCK_FRAMES {
            return Err(RladError::bad_rlad(format!(
                "invalid terminal block frame count {}",
                last_block_frames
            )));
        }

        let sample_rate = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);

        let block_count = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);
        if block_count == 0 {
            return Err(RladError::bad_rlad("zero block count"));
        }

        Ok(StreamHeader {
            lossless,
            channels,
            last_block_frames,
            sample_rate,
            block_count,
        })
    }
}
