//! Error types for RLAD encoding, decoding and stream parsing.
//!
//! | Category | Variants |
//! |----------|----------|
//! | Format | [`BadFormat`], [`UnsupportedFormat`] |
//! | Truncation | [`IncompleteHeader`], [`IncompleteData`], [`IncompleteFrame`] |
//! | Misuse | [`InvalidOperation`], [`ArgumentOutOfRange`] |
//! | Arithmetic | [`ArithmeticOverflow`] |
//! | I/O | [`Io`] |
//!
//! [`BadFormat`]: RladError::BadFormat
//! [`UnsupportedFormat`]: RladError::UnsupportedFormat
//! [`IncompleteHeader`]: RladError::IncompleteHeader
//! [`IncompleteData`]: RladError::IncompleteData
//! [`IncompleteFrame`]: RladError::IncompleteFrame
//! [`InvalidOperation`]: RladError::InvalidOperation
//! [`ArgumentOutOfRange`]: RladError::ArgumentOutOfRange
//! [`ArithmeticOverflow`]: RladError::ArithmeticOverflow
//! [`Io`]: RladError::Io

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, RladError>;

/// Error type for RLAD operations.
///
/// Nothing is swallowed: every failure inside the codec or the stream
/// reader propagates to the caller as one of these variants. After a
/// failed read the reader's position and overflow state are undefined
/// and the reader should be discarded.
#[derive(Error, Debug)]
pub enum RladError {
    /// A magic number, tag or enumerated field failed validation.
    #[error("{expected} format error: {detail}")]
    BadFormat {
        /// format the data claimed to be
        expected: &'static str,
        /// what was actually wrong
        detail: String,
    },

    /// Short read while parsing a stream or block header.
    ///
    /// The payload names the header portion that could not be read in
    /// full ("stream header", "block size", "run counts", "run headers").
    #[error("incomplete header: {0}")]
    IncompleteHeader(&'static str),

    /// Short read while fetching a block payload or other bulk data.
    #[error("incomplete data during {op}: {missing} bytes missing")]
    IncompleteData {
        /// operation that hit the short read
        op: &'static str,
        /// bytes that could not be read
        missing: usize,
    },

    /// Byte count not divisible by the frame size at a boundary where
    /// whole frames are required.
    #[error("{encoding} data does not hold whole {channels}-channel frames ({remainder} bytes left over)")]
    IncompleteFrame {
        /// encoding being processed
        encoding: &'static str,
        /// channel count of the stream
        channels: u8,
        /// trailing bytes that do not form a frame
        remainder: usize,
    },

    /// Format discriminator is recognized but not implemented.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(&'static str),

    /// Misuse of the codec API (no header set, wrong frame count, ...).
    ///
    /// Displays as the bare message so callers can match on the
    /// documented prefixes ("RLAD encoding must ...", "No block header ...").
    #[error("{0}")]
    InvalidOperation(String),

    /// Structural out-of-range access, e.g. a channel index >= 8.
    #[error("{what} out of range: {value} (limit {limit})")]
    ArgumentOutOfRange {
        /// what was indexed
        what: &'static str,
        /// the offending value
        value: usize,
        /// first value that is no longer valid
        limit: usize,
    },

    /// A value left the representable range of its precision tier.
    ///
    /// Raised by lossy encoding when a quantized delta exceeds the
    /// 12-bit Full tier instead of silently truncating it.
    #[error("arithmetic overflow in {what}")]
    ArithmeticOverflow {
        /// computation that overflowed
        what: &'static str,
    },

    /// An I/O error surfaced unchanged from the byte source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RladError {
    /// invalid-operation error from anything stringy
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// bad-format error for the RLAD container
    pub fn bad_rlad(detail: impl Into<String>) -> Self {
        Self::BadFormat {
            expected: "RLAD",
            detail: detail.into(),
        }
    }
}
