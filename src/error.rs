//! Error handling for the interop library.
//!
//! This module defines the error types that can occur while opening and decoding
//! metrics files. Running out of bytes in the middle of a record is *not* an error:
//! it is how every record stream ends, and the incomplete tail is dropped.

use std::path::PathBuf;

use thiserror::Error;

use crate::MetricKind;

/// A specialized `Result` type for interop operations.
///
/// This type is used throughout the library for any operation that can fail.
/// It's equivalent to `std::result::Result<T, InteropError>`.
pub type Result<T> = std::result::Result<T, InteropError>;

/// Error types for metric decoding.
///
/// A decode call either returns a complete table or one of these errors; the
/// rows decoded before the failure point are never handed back.
///
/// # Examples
///
/// ```rust
/// use interop::{decode_reader, DecodeOptions, InteropError, MetricKind};
/// use std::io::Cursor;
///
/// // Tile file cut off inside its two-byte header
/// let cursor = Cursor::new(vec![2u8]);
/// match decode_reader(cursor, 1, MetricKind::Tile, &DecodeOptions::default()) {
///     Err(InteropError::Io(io_err)) => {
///         println!("I/O error: {}", io_err);
///     }
///     Err(e) => println!("Other error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum InteropError {
    /// I/O error from the underlying file or reader.
    ///
    /// Covers files that cannot be opened or stat-ed, and headers shorter
    /// than their layout (`UnexpectedEof`).
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Compression/decompression error from niffler.
    ///
    /// Raised when a compressed metrics file (gzip, zstd, ...) cannot be set up for
    /// reading.
    #[cfg(feature = "niffler")]
    #[error("Niffler error")]
    Niffler(#[from] niffler::Error),

    /// A length-prefixed text field declares more bytes than the configured ceiling.
    #[error("Oversized {field} field at byte {pos}: declared length {len} exceeds maximum {max}")]
    OversizedField {
        field: &'static str,
        len: usize,
        max: usize,
        pos: u64,
    },

    /// The header's declared record length disagrees with the known layout.
    ///
    /// Only raised when [`DecodeOptions::strict_record_len`](crate::DecodeOptions) is set.
    #[error("Record length mismatch for {kind} metrics, expected ({expected}), found ({actual})")]
    RecordLengthMismatch {
        kind: MetricKind,
        expected: usize,
        actual: usize,
    },

    /// The file name does not correspond to any known metrics file.
    #[error("Unrecognised metrics file: {0}")]
    UnknownMetricFile(PathBuf),
}
