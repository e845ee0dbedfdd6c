//! buffered block-by-block reader for RLAD streams
//!
//! The reader owns its byte source and decodes strictly forward, one
//! block at a time. Whole blocks land directly in the caller's buffer;
//! partial consumption goes through a scratch block whose unread tail
//! is carried in an overflow buffer for the next call. After any error
//! the reader's position and overflow state are undefined and the
//! reader should be discarded.

use std::io::{self, Read};

use tracing::debug;

use crate::core::convert::convert_i16_to_f32;
use crate::core::error::{RladError, Result};
use crate::core::types::{
    AudioChannels, StreamHeader, BLOCK_FRAMES, STREAM_HEADER_SIZE,
};
use crate::rlad::{BlockCodec, BlockHeader};

/// read until `buf` is full or the source ends, returning the fill
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// reader for one RLAD stream
#[derive(Debug)]
pub struct Reader<R> {
    src: R,
    header: StreamHeader,
    codec: BlockCodec,
    block_index: u32,
    frames_read: u64,
    /// one decoded block, used for partially consumed blocks
    scratch: Vec<i16>,
    /// decoded samples the caller did not take on the last read
    overflow: Vec<i16>,
    overflow_pos: usize,
    overflow_len: usize,
    /// current block payload
    payload: Vec<u8>,
}

impl<R: Read> Reader<R> {
    /// Open a stream: parse and validate the 16-byte file header and
    /// size the block buffers.
    pub fn open(mut src: R) -> Result<Self> {
        let mut buf = [0u8; STREAM_HEADER_SIZE];
        let got = read_full(&mut src, &mut buf)?;
        if got < STREAM_HEADER_SIZE {
            return Err(RladError::IncompleteHeader("stream header"));
        }

        let header = StreamHeader::parse(&buf)?;
        debug!(
            lossless = header.lossless,
            channels = header.channels.count(),
            sample_rate = header.sample_rate,
            blocks = header.block_count,
            "opened rlad stream"
        );

        let block_samples = BLOCK_FRAMES * header.channels.count();
        let codec = BlockCodec::new(header.mode(), header.channels);

        Ok(Reader {
            src,
            header,
            codec,
            block_index: 0,
            frames_read: 0,
            scratch: vec![0; block_samples],
            overflow: vec![0; block_samples],
            overflow_pos: 0,
            overflow_len: 0,
            payload: Vec::new(),
        })
    }

    /// channel layout of the stream
    pub fn channels(&self) -> AudioChannels {
        self.header.channels
    }

    /// sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    /// total live frames in the stream
    pub fn frame_count(&self) -> u64 {
        self.header.frame_count()
    }

    /// frames not yet handed to the caller
    pub fn remaining(&self) -> u64 {
        self.header.frame_count() - self.frames_read
    }

    /// is this a lossless stream?
    pub fn is_lossless(&self) -> bool {
        self.header.lossless
    }

    /// Read interleaved shorts into `dst`.
    ///
    /// The destination length is rounded down to whole frames. Returns
    /// the number of frames written; 0 once the stream is exhausted.
    pub fn read(&mut self, dst: &mut [i16]) -> Result<usize> {
        let stride = self.header.channels.count();
        let dst_frames = dst.len() / stride;
        let mut written = 0usize;

        // serve buffered samples from the previous block first
        while self.overflow_len > self.overflow_pos && written < dst_frames {
            let have = (self.overflow_len - self.overflow_pos) / stride;
            let take = have.min(dst_frames - written);
            let from = self.overflow_pos;
            dst[written * stride..(written + take) * stride]
                .copy_from_slice(&self.overflow[from..from + take * stride]);
            self.overflow_pos += take * stride;
            written += take;
        }

        while written < dst_frames && self.block_index < self.header.block_count {
            let live = self.fetch_block()?;
            let room = dst_frames - written;

            if live == BLOCK_FRAMES && room >= BLOCK_FRAMES {
                // whole block straight into the caller's buffer
                self.codec.decode_i16(
                    &self.payload,
                    &mut dst[written * stride..(written + BLOCK_FRAMES) * stride],
                )?;
                written += BLOCK_FRAMES;
            } else {
                self.codec.decode_i16(&self.payload, &mut self.scratch)?;
                let take = live.min(room);
                dst[written * stride..(written + take) * stride]
                    .copy_from_slice(&self.scratch[..take * stride]);
                written += take;
                self.stash_overflow(take, live);
            }
            self.block_index += 1;
        }

        self.frames_read += written as u64;
        Ok(written)
    }

    /// Read normalized floats into `dst`; otherwise identical to
    /// [`Reader::read`].
    pub fn read_f32(&mut self, dst: &mut [f32]) -> Result<usize> {
        let stride = self.header.channels.count();
        let dst_frames = dst.len() / stride;
        let mut written = 0usize;

        while self.overflow_len > self.overflow_pos && written < dst_frames {
            let have = (self.overflow_len - self.overflow_pos) / stride;
            let take = have.min(dst_frames - written);
            let from = self.overflow_pos;
            convert_i16_to_f32(
                &self.overflow[from..from + take * stride],
                &mut dst[written * stride..(written + take) * stride],
            );
            self.overflow_pos += take * stride;
            written += take;
        }

        while written < dst_frames && self.block_index < self.header.block_count {
            let live = self.fetch_block()?;
            let room = dst_frames - written;

            if live == BLOCK_FRAMES && room >= BLOCK_FRAMES {
                self.codec.decode_f32(
                    &self.payload,
                    &mut dst[written * stride..(written + BLOCK_FRAMES) * stride],
                )?;
                written += BLOCK_FRAMES;
            } else {
                self.codec.decode_i16(&self.payload, &mut self.scratch)?;
                let take = live.min(room);
                convert_i16_to_f32(
                    &self.scratch[..take * stride],
                    &mut dst[written * stride..(written + take) * stride],
                );
                written += take;
                self.stash_overflow(take, live);
            }
            self.block_index += 1;
        }

        self.frames_read += written as u64;
        Ok(written)
    }

    /// Parse the next block header, pull its payload and install the
    /// header in the codec. Returns the block's live frame count.
    fn fetch_block(&mut self) -> Result<usize> {
        let block_header = BlockHeader::read_from(&mut self.src, self.header.channels)?;
        let data_size = block_header.data_size();

        self.payload.resize(data_size, 0);
        let got = read_full(&mut self.src, &mut self.payload)?;
        if got < data_size {
            return Err(RladError::IncompleteData {
                op: "block data read",
                missing: data_size - got,
            });
        }

        self.codec.set_block_header(block_header)?;

        let is_last = self.block_index + 1 == self.header.block_count;
        Ok(if is_last {
            self.header.last_block_frames as usize
        } else {
            BLOCK_FRAMES
        })
    }

    /// carry the unconsumed tail of the scratch block into the overflow
    fn stash_overflow(&mut self, taken_frames: usize, live_frames: usize) {
        let stride = self.header.channels.count();
        if taken_frames < live_frames {
            let from = taken_frames * stride;
            let len = (live_frames - taken_frames) * stride;
            self.overflow[..len].copy_from_slice(&self.scratch[from..from + len]);
            self.overflow_pos = 0;
            self.overflow_len = len;
        } else {
            self.overflow_pos = 0;
            self.overflow_len = 0;
        }
    }
}
