const MAX_PHASING_READ: u16 = 50;
const MAX_ALIGNED_READ: u16 = 100;

/// Meaning of the `code` column of Tile metrics.
///
/// The decoder passes codes through untouched; this is for callers that want to
/// pivot the long-format tile table.
///
/// ```rust
/// use interop::TileCode;
///
/// assert_eq!(TileCode::from_code(103), Some(TileCode::ClusterCountPf));
/// assert_eq!(TileCode::from_code(203), Some(TileCode::Prephasing { read: 2 }));
/// assert_eq!(TileCode::PercentAligned { read: 3 }.code(), Some(302));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileCode {
    /// Cluster density (k/mm2)
    Density,
    /// Cluster density passing filter (k/mm2)
    DensityPf,
    ClusterCount,
    ClusterCountPf,
    Phasing { read: u16 },
    Prephasing { read: u16 },
    PercentAligned { read: u16 },
    ControlLane,
}
impl TileCode {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            100 => Some(Self::Density),
            101 => Some(Self::DensityPf),
            102 => Some(Self::ClusterCount),
            103 => Some(Self::ClusterCountPf),
            200..=299 if code % 2 == 0 => Some(Self::Phasing {
                read: (code - 200) / 2 + 1,
            }),
            200..=299 => Some(Self::Prephasing {
                read: (code - 201) / 2 + 1,
            }),
            300..=399 => Some(Self::PercentAligned {
                read: code - 300 + 1,
            }),
            400 => Some(Self::ControlLane),
            _ => None,
        }
    }

    /// Inverse of [`from_code`](Self::from_code).
    ///
    /// Returns `None` for reads outside the encodable range: 1 to 50 for
    /// (pre)phasing, 1 to 100 for percent aligned.
    pub fn code(&self) -> Option<u16> {
        match *self {
            Self::Density => Some(100),
            Self::DensityPf => Some(101),
            Self::ClusterCount => Some(102),
            Self::ClusterCountPf => Some(103),
            Self::Phasing { read } if (1..=MAX_PHASING_READ).contains(&read) => {
                Some(200 + (read - 1) * 2)
            }
            Self::Prephasing { read } if (1..=MAX_PHASING_READ).contains(&read) => {
                Some(201 + (read - 1) * 2)
            }
            Self::PercentAligned { read } if (1..=MAX_ALIGNED_READ).contains(&read) => {
                Some(300 + read - 1)
            }
            Self::ControlLane => Some(400),
            _ => None,
        }
    }
}
