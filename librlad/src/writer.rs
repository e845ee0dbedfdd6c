//! one-shot writer for RLAD streams
//!
//! Splits interleaved samples into 512-frame blocks, zero-pads the
//! terminal block, and writes the stream header followed by each
//! block's header and payload.

use std::io::Write;

use tracing::debug;

use crate::core::error::{RladError, Result};
use crate::core::types::{AudioChannels, CodecMode, StreamHeader, BLOCK_FRAMES};
use crate::rlad::BlockCodec;

/// stream writer for one codec configuration
pub struct Writer {
    mode: CodecMode,
    channels: AudioChannels,
    sample_rate: u32,
}

impl Writer {
    /// new writer
    pub fn new(mode: CodecMode, channels: AudioChannels, sample_rate: u32) -> Self {
        Writer {
            mode,
            channels,
            sample_rate,
        }
    }

    /// Encode `samples` as a complete stream into `sink`.
    ///
    /// The sample count must be a non-zero whole number of frames.
    pub fn write<W: Write>(&self, samples: &[i16], mut sink: W) -> Result<()> {
        let stride = self.channels.count();
        if samples.is_empty() {
            return Err(RladError::invalid_operation(
                "RLAD encoding must be given at least one frame",
            ));
        }
        if samples.len() % stride != 0 {
            return Err(RladError::IncompleteFrame {
                encoding: "RLAD",
                channels: stride as u8,
                remainder: samples.len() % stride,
            });
        }

        let total_frames = samples.len() / stride;
        let block_count = total_frames.div_ceil(BLOCK_FRAMES);
        let last_block_frames = total_frames - (block_count - 1) * BLOCK_FRAMES;

        let header = StreamHeader {
            lossless: self.mode == CodecMode::Lossless,
            channels: self.channels,
            last_block_frames: last_block_frames as u16,
            sample_rate: self.sample_rate,
            block_count: block_count as u32,
        };
        sink.write_all(&header.to_bytes())?;

        let mut codec = BlockCodec::new(self.mode, self.channels);
        let mut payload = Vec::new();
        let block_samples = BLOCK_FRAMES * stride;
        let mut padded = vec![0i16; block_samples];

        for b in 0..block_count {
            let is_last = b + 1 == block_count;
            let start = b * block_samples;

            let block: &[i16] = if is_last && last_block_frames < BLOCK_FRAMES {
                // physical blocks are always 512 frames; pad with silence
                padded.fill(0);
                padded[..samples.len() - start].copy_from_slice(&samples[start..]);
                &padded
            } else {
                &samples[start..start + block_samples]
            };

            payload.clear();
            codec.encode(block, is_last, &mut payload)?;
            let block_header = codec
                .block_header()
                .ok_or_else(|| RladError::invalid_operation("No block header after encode"))?;
            block_header.write_to(&mut sink)?;
            sink.write_all(&payload)?;
        }

        debug!(
            blocks = block_count,
            frames = total_frames,
            "wrote rlad stream"
        );
        Ok(())
    }

    /// [`Writer::write`] into a fresh byte vector
    pub fn write_to_vec(&self, samples: &[i16]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(samples, &mut out)?;
        Ok(out)
    }
}
