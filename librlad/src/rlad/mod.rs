//! the RLAD block format: bit packing, run classification, block headers
//! and the block codec itself

pub mod bitpack;
pub mod block;
pub mod header;
pub mod runs;

pub use block::BlockCodec;
pub use header::BlockHeader;
pub use runs::{classify_chunk, compress_runs, compute_deltas, RunHeader, Tier};
