use bytemuck::{Pod, Zeroable};

/// Leading bytes of every metrics file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaderLayout {
    /// 1 byte: version (Control metrics)
    VersionOnly,
    /// 2 bytes: version, declared record length
    VersionAndLength,
}
impl HeaderLayout {
    pub const fn size(&self) -> usize {
        match self {
            Self::VersionOnly => 1,
            Self::VersionAndLength => 2,
        }
    }
}

/// On-disk form of the two byte header
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct RawHeader {
    pub version: u8,
    pub record_len: u8,
}

/// Decoded file header.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    /// Format version as written by the instrument
    pub version: u8,
    /// Declared record length; absent for variable-length layouts
    pub record_len: Option<u8>,
}
impl Header {
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `layout.size()`.
    pub fn from_bytes(layout: HeaderLayout, bytes: &[u8]) -> Self {
        match layout {
            HeaderLayout::VersionOnly => Self {
                version: bytes[0],
                record_len: None,
            },
            HeaderLayout::VersionAndLength => {
                let raw: RawHeader = bytemuck::pod_read_unaligned(&bytes[..2]);
                Self {
                    version: raw.version,
                    record_len: Some(raw.record_len),
                }
            }
        }
    }
}
