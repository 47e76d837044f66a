//! Whole-file decoding into column tables.

use std::{io::Read, iter::FusedIterator, path::Path};

use log::debug;

use crate::{
    BoxedReader, ByteSource, ColumnTable, ControlRecords, DecodeOptions, FixedRecords, Header,
    MetricKind, MetricTable, QualityTable, Record, TableBuilder,
};

/// Lazy, non-restartable sequence of records from one metrics file.
///
/// # Examples
///
/// ```rust
/// use interop::{ByteSource, DecodeOptions, MetricKind, Records, Value};
/// use std::io::Cursor;
///
/// # fn main() -> interop::Result<()> {
/// // Image metrics: 2-byte header then 12-byte records of six u16 fields
/// let mut bytes = vec![1u8, 12];
/// for x in [1u16, 1101, 1, 0, 200, 1800] {
///     bytes.extend_from_slice(&x.to_le_bytes());
/// }
/// let size = bytes.len() as u64;
/// let source = ByteSource::new(Cursor::new(bytes), size);
///
/// for record in Records::open(source, MetricKind::Image, &DecodeOptions::default())? {
///     let record = record?;
///     assert_eq!(record.get("maxcont"), Some(&Value::Int(1800)));
/// }
/// # Ok(())
/// # }
/// ```
pub enum Records<R: Read> {
    Fixed(FixedRecords<R>),
    Control(ControlRecords<R>),
}
impl<R: Read> Records<R> {
    /// Reads the header and prepares the decoder matching `kind`'s layout.
    pub fn open(
        source: ByteSource<R>,
        kind: MetricKind,
        options: &DecodeOptions,
    ) -> crate::Result<Self> {
        let desc = kind.descriptor();
        match desc.record_size {
            Some(record_size) => {
                FixedRecords::new(source, desc, record_size, options).map(Self::Fixed)
            }
            None => ControlRecords::new(source, desc, options).map(Self::Control),
        }
    }

    pub fn header(&self) -> Header {
        match self {
            Self::Fixed(r) => r.header(),
            Self::Control(r) => r.header(),
        }
    }
}
impl Records<BoxedReader> {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        kind: MetricKind,
        options: &DecodeOptions,
    ) -> crate::Result<Self> {
        Self::open(ByteSource::from_path(path, options)?, kind, options)
    }
}
impl<R: Read> Iterator for Records<R> {
    type Item = crate::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Fixed(r) => r.next(),
            Self::Control(r) => r.next(),
        }
    }
}
impl<R: Read> FusedIterator for Records<R> {}

/// Decodes every record of `source` into a table.
///
/// Either the whole file decodes or an error is returned; rows decoded before a
/// failure are discarded.
pub fn decode_source<R: Read>(
    source: ByteSource<R>,
    kind: MetricKind,
    options: &DecodeOptions,
) -> crate::Result<MetricTable> {
    let desc = kind.descriptor();
    let capacity = desc.estimate_records(source.size());
    debug!(
        "decoding {} metrics: {} bytes, up to {} records",
        kind,
        source.size(),
        capacity
    );

    let mut builder = TableBuilder::new(desc, capacity);
    for record in Records::open(source, kind, options)? {
        builder.push(record?);
    }
    let table = builder.finish();

    debug!("decoded {} {} records", table.len(), kind);
    Ok(table)
}

/// Decodes from any reader; `size` is the total byte length used to pre-size columns.
pub fn decode_reader<R: Read>(
    reader: R,
    size: u64,
    kind: MetricKind,
    options: &DecodeOptions,
) -> crate::Result<MetricTable> {
    decode_source(ByteSource::new(reader, size), kind, options)
}

/// Decodes the file at `path` as `kind`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or stat-ed, if the header is
/// shorter than its layout, or if a Control text field is oversized.
///
/// # Examples
///
/// ```rust,no_run
/// use interop::{decode_with, DecodeOptions, MetricKind};
///
/// # fn main() -> interop::Result<()> {
/// let options = DecodeOptions::default().mmap(true);
/// let table = decode_with("InterOp/TileMetricsOut.bin", MetricKind::Tile, &options)?;
/// println!("{} tile records", table.len());
/// # Ok(())
/// # }
/// ```
pub fn decode_with<P: AsRef<Path>>(
    path: P,
    kind: MetricKind,
    options: &DecodeOptions,
) -> crate::Result<MetricTable> {
    decode_source(ByteSource::from_path(path, options)?, kind, options)
}

/// Decodes the file at `path` as `kind` with default options.
pub fn decode<P: AsRef<Path>>(path: P, kind: MetricKind) -> crate::Result<MetricTable> {
    decode_with(path, kind, &DecodeOptions::default())
}

fn read_columns<P: AsRef<Path>>(path: P, kind: MetricKind) -> crate::Result<ColumnTable> {
    match decode(path, kind)? {
        MetricTable::Columns(table) => Ok(table),
        MetricTable::Quality(table) => Ok(table.key),
    }
}

/// Decodes `ExtractionMetricsOut.bin`: per-cycle FWHM focus, intensity and timestamp.
///
/// ```rust,no_run
/// # fn main() -> interop::Result<()> {
/// let table = interop::read_extraction_metrics("InterOp/ExtractionMetricsOut.bin")?;
/// let fwhm_a = table.column("fwhmA").and_then(|c| c.as_float()).unwrap_or_default();
/// # Ok(())
/// # }
/// ```
pub fn read_extraction_metrics<P: AsRef<Path>>(path: P) -> crate::Result<ColumnTable> {
    read_columns(path, MetricKind::Extraction)
}

/// Decodes `QMetricsOut.bin` into the lane/tile/cycle key table and the
/// `records x 50` quality-bucket count matrix.
pub fn read_quality_metrics<P: AsRef<Path>>(path: P) -> crate::Result<QualityTable> {
    match decode(path, MetricKind::Quality)? {
        MetricTable::Quality(table) => Ok(table),
        MetricTable::Columns(_) => unreachable!("quality layout always carries a count matrix"),
    }
}

/// Decodes `ErrorMetricsOut.bin`.
pub fn read_error_metrics<P: AsRef<Path>>(path: P) -> crate::Result<ColumnTable> {
    read_columns(path, MetricKind::Error)
}

/// Decodes `TileMetricsOut.bin`; see [`TileCode`](crate::TileCode) for the `code` column.
pub fn read_tile_metrics<P: AsRef<Path>>(path: P) -> crate::Result<ColumnTable> {
    read_columns(path, MetricKind::Tile)
}

/// Decodes `CorrectedIntMetricsOut.bin`.
pub fn read_corrected_intensity_metrics<P: AsRef<Path>>(path: P) -> crate::Result<ColumnTable> {
    read_columns(path, MetricKind::CorrectedIntensity)
}

/// Decodes `ControlMetricsOut.bin`.
pub fn read_control_metrics<P: AsRef<Path>>(path: P) -> crate::Result<ColumnTable> {
    read_columns(path, MetricKind::Control)
}

/// Decodes `ImageMetricsOut.bin`.
pub fn read_image_metrics<P: AsRef<Path>>(path: P) -> crate::Result<ColumnTable> {
    read_columns(path, MetricKind::Image)
}
