//! # interop - Decoders for Sequencing-Run Metrics Files
//!
//! `interop` reads the binary metrics files a sequencing instrument writes into a
//! run's `InterOp/` directory and turns each one into column-oriented tables ready
//! for downstream statistics.
//!
//! ## Format Overview
//!
//! Every file is a short header followed by a homogeneous stream of little-endian,
//! packed (unpadded) records:
//!
//! | Kind | Header | Record |
//! |---|---|---|
//! | Extraction | version, record length | 38 bytes |
//! | Quality | version, record length | 206 bytes (50 quality buckets) |
//! | Error | version, record length | 30 bytes |
//! | Tile | version, record length | 10 bytes |
//! | CorrectedIntensity | version, record length | 48 bytes |
//! | Image | version, record length | 12 bytes |
//! | Control | version | variable (two length-prefixed strings) |
//!
//! Decoding stops at the first point where a complete record can no longer be
//! read; an incomplete tail is dropped. 16-bit fields are widened to `i32`, the
//! packed extraction timestamp has its two flag bits cleared.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use interop::{read_quality_metrics, read_tile_metrics, TileCode};
//!
//! # fn main() -> interop::Result<()> {
//! let tiles = read_tile_metrics("InterOp/TileMetricsOut.bin")?;
//! let codes = tiles.column("code").and_then(|c| c.as_int()).unwrap_or_default();
//! let values = tiles.column("value").and_then(|c| c.as_float()).unwrap_or_default();
//! for (code, value) in codes.iter().zip(values) {
//!     if TileCode::from_code(*code as u16) == Some(TileCode::DensityPf) {
//!         println!("density PF: {value}");
//!     }
//! }
//!
//! let quality = read_quality_metrics("InterOp/QMetricsOut.bin")?;
//! println!("{} records x {} buckets", quality.nclust.nrows(), quality.nclust.ncols());
//! # Ok(())
//! # }
//! ```
//!
//! ## Decoding In-Memory Data
//!
//! ```rust
//! use interop::{decode_reader, DecodeOptions, MetricKind};
//! use std::io::Cursor;
//!
//! # fn main() -> interop::Result<()> {
//! // Tile metrics: header then lane, tile, code (u16) and value (f32)
//! let mut bytes = vec![2u8, 10];
//! for x in [1u16, 1101, 100] {
//!     bytes.extend_from_slice(&x.to_le_bytes());
//! }
//! bytes.extend_from_slice(&512.5f32.to_le_bytes());
//! let size = bytes.len() as u64;
//!
//! let options = DecodeOptions::default();
//! let table = decode_reader(Cursor::new(bytes), size, MetricKind::Tile, &options)?;
//! assert_eq!(table.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, InteropError>`. Files that cannot be opened
//! surface as [`InteropError::Io`]; Control text fields longer than the configured
//! ceiling surface as [`InteropError::OversizedField`]. A failed decode never
//! returns the rows read before the failure.

mod constructs;
mod error;
mod io;
mod options;
mod parallel;
mod transform;

pub use constructs::{
    Column, ColumnTable, CountMatrix, FieldDescriptor, FieldType, FormatDescriptor, Header,
    HeaderLayout, MetricKind, MetricTable, QualityTable, Record, TileCode, Transform, Value,
    CONTROL_MIN_RECORD_SIZE, MAX_FIELD_LEN, QUALITY_BINS,
};
pub(crate) use constructs::TableBuilder;
pub use error::{InteropError, Result};
pub use io::{
    decode, decode_reader, decode_source, decode_with, read_control_metrics,
    read_corrected_intensity_metrics, read_error_metrics, read_extraction_metrics,
    read_image_metrics, read_quality_metrics, read_tile_metrics, BoxedReader, ByteSource,
    ControlRecords, FixedRecords, Records,
};
pub use options::DecodeOptions;
pub use parallel::{MetricFile, RunDirectory};
pub use transform::{mask_timestamp, TIMESTAMP_MASK};
