//! in-memory and wire representation of a block header
//!
//! Wire layout, little-endian:
//!
//! ```text
//! u16   (data_size & 0x7fff) | (is_last_block << 15)
//! u8 x channel_count          run counts
//! u8 x run_count[c]           run headers, channel by channel
//! ```
//!
//! The `data_size` payload bytes follow immediately; reading and
//! writing the payload belongs to the block codec and the stream
//! reader/writer. There is no checksum.

use std::io::{self, Read, Write};

use crate::core::error::{RladError, Result};
use crate::core::types::{AudioChannels, CodecMode, CHUNKS_PER_CHANNEL, MAX_BLOCK_DATA, MAX_CHANNELS};
use crate::rlad::runs::RunHeader;

/// read exactly `buf.len()` bytes or fail with the named header portion
fn read_header_bytes<R: Read>(r: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => return Err(RladError::IncompleteHeader(what)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// header of one 512-frame block
///
/// Run tables live in fixed arrays sized for the worst case (64 runs
/// by 8 channels); a header never allocates. The per-channel seed is
/// the start value of the decoder's accumulator, fixed at zero in this
/// revision of the format but part of the decode contract.
#[derive(Debug, Clone)]
pub struct BlockHeader {
    data_size: u16,
    is_last_block: bool,
    channel_count: u8,
    run_counts: [u8; MAX_CHANNELS],
    runs: [[RunHeader; CHUNKS_PER_CHANNEL]; MAX_CHANNELS],
    seeds: [i16; MAX_CHANNELS],
}

impl BlockHeader {
    /// empty header for the given layout
    pub fn new(channels: AudioChannels) -> Self {
        BlockHeader {
            data_size: 0,
            is_last_block: false,
            channel_count: channels.count() as u8,
            run_counts: [0; MAX_CHANNELS],
            runs: [[RunHeader::default(); CHUNKS_PER_CHANNEL]; MAX_CHANNELS],
            seeds: [0; MAX_CHANNELS],
        }
    }

    /// payload byte length of the block
    #[inline]
    pub fn data_size(&self) -> usize {
        self.data_size as usize
    }

    /// set the payload byte length (must fit the 15-bit field)
    pub fn set_data_size(&mut self, size: usize) {
        debug_assert!(size <= MAX_BLOCK_DATA);
        self.data_size = size as u16;
    }

    /// is this the terminal block of the stream?
    #[inline]
    pub fn is_last_block(&self) -> bool {
        self.is_last_block
    }

    /// mark or unmark the terminal block
    pub fn set_last_block(&mut self, last: bool) {
        self.is_last_block = last;
    }

    /// number of channels the header describes
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channel_count as usize
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channel_count as usize {
            return Err(RladError::ArgumentOutOfRange {
                what: "channel index",
                value: channel,
                limit: self.channel_count as usize,
            });
        }
        Ok(())
    }

    /// number of runs recorded for a channel
    pub fn run_count(&self, channel: usize) -> Result<usize> {
        self.check_channel(channel)?;
        Ok(self.run_counts[channel] as usize)
    }

    /// the recorded runs of a channel
    pub fn runs(&self, channel: usize) -> Result<&[RunHeader]> {
        self.check_channel(channel)?;
        Ok(&self.runs[channel][..self.run_counts[channel] as usize])
    }

    /// replace the run table of a channel
    pub fn set_runs(&mut self, channel: usize, runs: &[RunHeader]) -> Result<()> {
        self.check_channel(channel)?;
        if runs.len() > CHUNKS_PER_CHANNEL {
            return Err(RladError::ArgumentOutOfRange {
                what: "run count",
                value: runs.len(),
                limit: CHUNKS_PER_CHANNEL + 1,
            });
        }
        self.runs[channel][..runs.len()].copy_from_slice(runs);
        self.run_counts[channel] = runs.len() as u8;
        Ok(())
    }

    /// accumulator start value for a channel (zero in this revision)
    pub fn channel_seed(&self, channel: usize) -> Result<i16> {
        self.check_channel(channel)?;
        Ok(self.seeds[channel])
    }

    /// payload size implied by the run tables in the given mode
    pub fn computed_data_size(&self, mode: CodecMode) -> usize {
        let mut size = 0usize;
        for ch in 0..self.channel_count as usize {
            for run in &self.runs[ch][..self.run_counts[ch] as usize] {
                size += run.tier().bps(mode) as usize * run.count();
            }
        }
        size
    }

    /// serialized size of the header itself (not the payload)
    pub fn wire_size(&self) -> usize {
        let mut size = 2 + self.channel_count as usize;
        for ch in 0..self.channel_count as usize {
            size += self.run_counts[ch] as usize;
        }
        size
    }

    /// write the wire form
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let word = (self.data_size & 0x7fff) | if self.is_last_block { 0x8000 } else { 0 };
        w.write_all(&word.to_le_bytes())?;

        w.write_all(&self.run_counts[..self.channel_count as usize])?;

        for ch in 0..self.channel_count as usize {
            for run in &self.runs[ch][..self.run_counts[ch] as usize] {
                w.write_all(&[run.byte()])?;
            }
        }
        Ok(())
    }

    /// read the wire form for a known channel layout
    pub fn read_from<R: Read>(r: &mut R, channels: AudioChannels) -> Result<Self> {
        let mut header = BlockHeader::new(channels);
        let n = channels.count();

        let mut word = [0u8; 2];
        read_header_bytes(r, &mut word, "block size")?;
        let word = u16::from_le_bytes(word);
        header.data_size = word & 0x7fff;
        header.is_last_block = word & 0x8000 != 0;

        let mut counts = [0u8; MAX_CHANNELS];
        read_header_bytes(r, &mut counts[..n], "run counts")?;
        for &count in &counts[..n] {
            if count as usize > CHUNKS_PER_CHANNEL {
                return Err(RladError::bad_rlad(format!(
                    "run count {} exceeds {} chunks",
                    count, CHUNKS_PER_CHANNEL
                )));
            }
        }
        header.run_counts[..n].copy_from_slice(&counts[..n]);

        let mut bytes = [0u8; CHUNKS_PER_CHANNEL];
        for ch in 0..n {
            let count = counts[ch] as usize;
            read_header_bytes(r, &mut bytes[..count], "run headers")?;
            for (i, &b) in bytes[..count].iter().enumerate() {
                header.runs[ch][i] = RunHeader::from_byte(b);
            }
        }

        Ok(header)
    }
}
