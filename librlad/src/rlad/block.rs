//! end-to-end encode and decode of one 512-frame block
//!
//! Encoding runs samples -> deltas -> tier classification -> bit
//! packing, building the block header's run tables as the payload is
//! written. Decoding walks the header's run tables, unpacks chunks and
//! reconstructs samples with a wrapping 16-bit running sum per channel.

use tracing::trace;

use crate::core::convert::{convert_i16_to_f32, dequantize, quantize};
use crate::core::error::{RladError, Result};
use crate::core::types::{
    AudioChannels, CodecMode, BLOCK_FRAMES, CHUNKS_PER_CHANNEL, CHUNK_SAMPLES,
};
use crate::rlad::bitpack::{pack_chunk, unpack_chunk};
use crate::rlad::header::BlockHeader;
use crate::rlad::runs::{classify_chunk, compress_runs, compute_deltas, RunHeader, Tier};

/// codec for one block of RLAD audio
///
/// A codec instance owns one [`BlockHeader`]: `encode` overwrites it
/// with the header of the block just produced, and `decode` consumes
/// whichever header was produced or installed last. Instances are not
/// thread-safe; the scratch buffers are reused across calls.
#[derive(Debug)]
pub struct BlockCodec {
    mode: CodecMode,
    channels: AudioChannels,
    header: BlockHeader,
    header_valid: bool,
    /// lossy working copy and float-decode scratch
    scratch: Vec<i16>,
    /// one deinterleaved channel
    chan: [i16; BLOCK_FRAMES],
    /// delta sequence of that channel
    deltas: [i16; BLOCK_FRAMES],
}

impl BlockCodec {
    /// new codec for the given mode and layout
    pub fn new(mode: CodecMode, channels: AudioChannels) -> Self {
        BlockCodec {
            mode,
            channels,
            header: BlockHeader::new(channels),
            header_valid: false,
            scratch: Vec::new(),
            chan: [0; BLOCK_FRAMES],
            deltas: [0; BLOCK_FRAMES],
        }
    }

    /// codec mode
    pub fn mode(&self) -> CodecMode {
        self.mode
    }

    /// channel layout
    pub fn channels(&self) -> AudioChannels {
        self.channels
    }

    /// header of the last encoded block, or the installed one
    pub fn block_header(&self) -> Option<&BlockHeader> {
        self.header_valid.then_some(&self.header)
    }

    /// install a parsed header ahead of a decode
    pub fn set_block_header(&mut self, header: BlockHeader) -> Result<()> {
        if header.channel_count() != self.channels.count() {
            return Err(RladError::invalid_operation(format!(
                "block header is for {} channels, codec expects {}",
                header.channel_count(),
                self.channels.count()
            )));
        }
        self.header = header;
        self.header_valid = true;
        Ok(())
    }

    /// Encode exactly 512 interleaved frames, appending the packed
    /// payload to `dst` and leaving the block header readable through
    /// [`BlockCodec::block_header`]. Returns the payload byte count.
    pub fn encode(&mut self, samples: &[i16], last_block: bool, dst: &mut Vec<u8>) -> Result<usize> {
        let stride = self.channels.count();
        let expected = BLOCK_FRAMES * stride;
        if samples.len() != expected {
            return Err(RladError::invalid_operation(format!(
                "RLAD encoding must be given exactly {} frames per block, got {}",
                BLOCK_FRAMES,
                samples.len() / stride
            )));
        }

        self.header = BlockHeader::new(self.channels);
        self.header.set_last_block(last_block);
        self.header_valid = false;

        // lossy shrinks everything to the 12-bit domain first
        let src: &[i16] = if self.mode == CodecMode::Lossy {
            self.scratch.clear();
            self.scratch.extend_from_slice(samples);
            quantize(&mut self.scratch);
            &self.scratch
        } else {
            samples
        };

        let start = dst.len();
        let mut tiers = [Tier::Tiny; CHUNKS_PER_CHANNEL];
        let mut runs = [RunHeader::default(); CHUNKS_PER_CHANNEL];

        for c in 0..stride {
            for (i, s) in self.chan.iter_mut().enumerate() {
                *s = src[i * stride + c];
            }
            let seed = self.header.channel_seed(c)?;
            compute_deltas(&self.chan, &mut self.deltas, seed);

            for (k, tier) in tiers.iter_mut().enumerate() {
                *tier = classify_chunk(&self.deltas[k * CHUNK_SAMPLES..], self.mode)?;
            }

            let run_count = compress_runs(&tiers, &mut runs);
            self.header.set_runs(c, &runs[..run_count])?;

            let mut packed = [0u8; 16];
            for (k, tier) in tiers.iter().enumerate() {
                let n = pack_chunk(
                    tier.bps(self.mode),
                    &self.deltas[k * CHUNK_SAMPLES..],
                    &mut packed,
                );
                dst.extend_from_slice(&packed[..n]);
            }
        }

        let size = dst.len() - start;
        debug_assert_eq!(size, self.header.computed_data_size(self.mode));
        self.header.set_data_size(size);
        self.header_valid = true;

        trace!(size, last_block, "encoded rlad block");
        Ok(size)
    }

    /// Decode one block into `dst` as shorts.
    ///
    /// Requires a block header (from a prior `encode` or
    /// [`BlockCodec::set_block_header`]) and at least `data_size` bytes
    /// of payload in `src`. Writes all 512 frames; on the terminal
    /// block only the stream header knows how many of them are live.
    pub fn decode_i16(&mut self, src: &[u8], dst: &mut [i16]) -> Result<()> {
        if !self.header_valid {
            return Err(RladError::invalid_operation(
                "No block header has been set for decode",
            ));
        }

        let data_size = self.header.data_size();
        if src.len() < data_size {
            return Err(RladError::IncompleteData {
                op: "RLAD data decode",
                missing: data_size - src.len(),
            });
        }

        let stride = self.channels.count();
        let expected = BLOCK_FRAMES * stride;
        if dst.len() < expected {
            return Err(RladError::invalid_operation(format!(
                "RLAD decoding must be given room for {} frames, got {}",
                BLOCK_FRAMES,
                dst.len() / stride
            )));
        }

        // a header whose run tables disagree with its payload size (or
        // do not cover the block) cannot be walked safely
        if self.header.computed_data_size(self.mode) != data_size {
            return Err(RladError::bad_rlad(
                "block run tables disagree with payload size",
            ));
        }

        let mut cursor = 0usize;
        let mut d8 = [0i16; CHUNK_SAMPLES];

        for c in 0..stride {
            let mut sum = self.header.channel_seed(c)?;
            let mut frame = 0usize;

            for run in self.header.runs(c)? {
                let bps = run.tier().bps(self.mode);
                for _ in 0..run.count() {
                    if frame >= BLOCK_FRAMES {
                        return Err(RladError::bad_rlad("run table overruns block"));
                    }
                    cursor += unpack_chunk(bps, &src[cursor..], &mut d8);
                    for &d in &d8 {
                        sum = sum.wrapping_add(d);
                        dst[frame * stride + c] = sum;
                        frame += 1;
                    }
                }
            }

            if frame != BLOCK_FRAMES {
                return Err(RladError::bad_rlad("run table does not cover block"));
            }
        }

        if self.mode == CodecMode::Lossy {
            dequantize(&mut dst[..expected]);
        }

        trace!(data_size, "decoded rlad block");
        Ok(())
    }

    /// Decode one block into `dst` as normalized floats.
    pub fn decode_f32(&mut self, src: &[u8], dst: &mut [f32]) -> Result<()> {
        let expected = BLOCK_FRAMES * self.channels.count();
        if dst.len() < expected {
            return Err(RladError::invalid_operation(format!(
                "RLAD decoding must be given room for {} frames, got {}",
                BLOCK_FRAMES,
                dst.len() / self.channels.count()
            )));
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.resize(expected, 0);
        let result = self.decode_i16(src, &mut scratch);
        if result.is_ok() {
            convert_i16_to_f32(&scratch, &mut dst[..expected]);
        }
        self.scratch = scratch;
        result
    }
}
