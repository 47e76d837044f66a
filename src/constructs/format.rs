use std::{fmt, path::Path};

use crate::{HeaderLayout, InteropError};

/// Number of quality-score buckets carried by every Quality record
pub const QUALITY_BINS: usize = 50;

/// Smallest possible Control record: lane, tile, read, two empty strings, cluster count
pub const CONTROL_MIN_RECORD_SIZE: usize = 3 * 2 + 2 + 2 + 4;

/// Default ceiling for length-prefixed text fields
pub const MAX_FIELD_LEN: usize = 256;

/// The seven known metrics file kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricKind {
    Extraction,
    Quality,
    Error,
    Tile,
    CorrectedIntensity,
    Control,
    Image,
}
impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        Self::Extraction,
        Self::Quality,
        Self::Error,
        Self::Tile,
        Self::CorrectedIntensity,
        Self::Control,
        Self::Image,
    ];

    pub fn descriptor(&self) -> &'static FormatDescriptor {
        match self {
            Self::Extraction => &EXTRACTION,
            Self::Quality => &QUALITY,
            Self::Error => &ERROR,
            Self::Tile => &TILE,
            Self::CorrectedIntensity => &CORRECTED_INTENSITY,
            Self::Control => &CONTROL,
            Self::Image => &IMAGE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Extraction => "Extraction",
            Self::Quality => "Quality",
            Self::Error => "Error",
            Self::Tile => "Tile",
            Self::CorrectedIntensity => "CorrectedIntensity",
            Self::Control => "Control",
            Self::Image => "Image",
        }
    }

    /// Canonical file name written by the instrument into the run's `InterOp/` folder
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Extraction => "ExtractionMetricsOut.bin",
            Self::Quality => "QMetricsOut.bin",
            Self::Error => "ErrorMetricsOut.bin",
            Self::Tile => "TileMetricsOut.bin",
            Self::CorrectedIntensity => "CorrectedIntMetricsOut.bin",
            Self::Control => "ControlMetricsOut.bin",
            Self::Image => "ImageMetricsOut.bin",
        }
    }

    /// Infers the kind from a canonical file name, ignoring a trailing compression suffix.
    ///
    /// ```rust
    /// use interop::MetricKind;
    ///
    /// # fn main() -> interop::Result<()> {
    /// let kind = MetricKind::from_path("run/InterOp/QMetricsOut.bin.gz")?;
    /// assert_eq!(kind, MetricKind::Quality);
    /// assert!(MetricKind::from_path("run/RunInfo.xml").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InteropError::UnknownMetricFile(path.to_path_buf()))?;
        let name = [".gz", ".bz2", ".xz", ".zst"]
            .iter()
            .find_map(|ext| name.strip_suffix(ext))
            .unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|kind| kind.file_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| InteropError::UnknownMetricFile(path.to_path_buf()))
    }
}
impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary type of a record field (all little-endian).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    U16,
    U32,
    U64,
    F32,
    /// Fixed-length array of `u32`
    U32Array(usize),
    /// u16 length prefix followed by that many UTF-8 bytes
    Text,
}
impl FieldType {
    /// Width in bytes, `None` for variable-width fields
    pub const fn width(&self) -> Option<usize> {
        match self {
            Self::U16 => Some(2),
            Self::U32 | Self::F32 => Some(4),
            Self::U64 => Some(8),
            Self::U32Array(n) => Some(4 * *n),
            Self::Text => None,
        }
    }
}

/// Semantic post-processing applied to a decoded field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    None,
    /// Clear the two high flag bits of a packed timestamp
    MaskTimestamp,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// Byte offset within a fixed-width record (stream order for variable layouts)
    pub offset: usize,
    pub ty: FieldType,
    pub transform: Transform,
}

const fn field(name: &'static str, offset: usize, ty: FieldType) -> FieldDescriptor {
    FieldDescriptor {
        name,
        offset,
        ty,
        transform: Transform::None,
    }
}

/// Static layout of one metrics file kind.
#[derive(Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub kind: MetricKind,
    pub header: HeaderLayout,
    /// Fixed record size, `None` for variable-length records
    pub record_size: Option<usize>,
    pub fields: &'static [FieldDescriptor],
}
impl FormatDescriptor {
    pub fn header_size(&self) -> usize {
        self.header.size()
    }

    /// Number of slots to reserve for a file of `file_size` bytes.
    ///
    /// Exact for fixed layouts (incomplete tails are not counted). For variable layouts
    /// it is the most records that could fit if every record were minimal.
    pub fn estimate_records(&self, file_size: u64) -> usize {
        let body = file_size.saturating_sub(self.header_size() as u64);
        let unit = self.record_size.unwrap_or(CONTROL_MIN_RECORD_SIZE) as u64;
        usize::try_from(body / unit).unwrap_or(usize::MAX)
    }
}

pub static EXTRACTION: FormatDescriptor = FormatDescriptor {
    kind: MetricKind::Extraction,
    header: HeaderLayout::VersionAndLength,
    record_size: Some(38),
    fields: &[
        field("lane", 0, FieldType::U16),
        field("tile", 2, FieldType::U16),
        field("cycle", 4, FieldType::U16),
        field("fwhmA", 6, FieldType::F32),
        field("fwhmC", 10, FieldType::F32),
        field("fwhmG", 14, FieldType::F32),
        field("fwhmT", 18, FieldType::F32),
        field("intA", 22, FieldType::U16),
        field("intC", 24, FieldType::U16),
        field("intG", 26, FieldType::U16),
        field("intT", 28, FieldType::U16),
        // 100ns ticks since 0001-01-01, top two bits are flags
        FieldDescriptor {
            name: "datetime",
            offset: 30,
            ty: FieldType::U64,
            transform: Transform::MaskTimestamp,
        },
    ],
};

pub static QUALITY: FormatDescriptor = FormatDescriptor {
    kind: MetricKind::Quality,
    header: HeaderLayout::VersionAndLength,
    record_size: Some(206),
    fields: &[
        field("lane", 0, FieldType::U16),
        field("tile", 2, FieldType::U16),
        field("cycle", 4, FieldType::U16),
        field("nclust", 6, FieldType::U32Array(QUALITY_BINS)),
    ],
};

pub static ERROR: FormatDescriptor = FormatDescriptor {
    kind: MetricKind::Error,
    header: HeaderLayout::VersionAndLength,
    record_size: Some(30),
    fields: &[
        field("lane", 0, FieldType::U16),
        field("tile", 2, FieldType::U16),
        field("cycle", 4, FieldType::U16),
        field("erate", 6, FieldType::F32),
        field("n", 10, FieldType::U32),
        field("n1e", 14, FieldType::U32),
        field("n2e", 18, FieldType::U32),
        field("n3e", 22, FieldType::U32),
        field("n4e", 26, FieldType::U32),
    ],
};

pub static TILE: FormatDescriptor = FormatDescriptor {
    kind: MetricKind::Tile,
    header: HeaderLayout::VersionAndLength,
    record_size: Some(10),
    fields: &[
        field("lane", 0, FieldType::U16),
        field("tile", 2, FieldType::U16),
        field("code", 4, FieldType::U16),
        field("value", 6, FieldType::F32),
    ],
};

pub static CORRECTED_INTENSITY: FormatDescriptor = FormatDescriptor {
    kind: MetricKind::CorrectedIntensity,
    header: HeaderLayout::VersionAndLength,
    record_size: Some(48),
    fields: &[
        field("lane", 0, FieldType::U16),
        field("tile", 2, FieldType::U16),
        field("cycle", 4, FieldType::U16),
        field("avgint", 6, FieldType::U16),
        field("avgintA", 8, FieldType::U16),
        field("avgintC", 10, FieldType::U16),
        field("avgintG", 12, FieldType::U16),
        field("avgintT", 14, FieldType::U16),
        field("avgintclA", 16, FieldType::U16),
        field("avgintclC", 18, FieldType::U16),
        field("avgintclG", 20, FieldType::U16),
        field("avgintclT", 22, FieldType::U16),
        field("bcNC", 24, FieldType::F32),
        field("bcA", 28, FieldType::F32),
        field("bcC", 32, FieldType::F32),
        field("bcG", 36, FieldType::F32),
        field("bcT", 40, FieldType::F32),
        field("srratio", 44, FieldType::F32),
    ],
};

pub static CONTROL: FormatDescriptor = FormatDescriptor {
    kind: MetricKind::Control,
    header: HeaderLayout::VersionOnly,
    record_size: None,
    fields: &[
        field("lane", 0, FieldType::U16),
        field("tile", 2, FieldType::U16),
        field("read", 4, FieldType::U16),
        field("control", 6, FieldType::Text),
        field("index", 8, FieldType::Text),
        field("nclust", 10, FieldType::U32),
    ],
};

pub static IMAGE: FormatDescriptor = FormatDescriptor {
    kind: MetricKind::Image,
    header: HeaderLayout::VersionAndLength,
    record_size: Some(12),
    fields: &[
        field("lane", 0, FieldType::U16),
        field("tile", 2, FieldType::U16),
        field("cycle", 4, FieldType::U16),
        field("channelid", 6, FieldType::U16),
        field("mincont", 8, FieldType::U16),
        field("maxcont", 10, FieldType::U16),
    ],
};
