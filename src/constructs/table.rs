use crate::{FieldType, FormatDescriptor, MetricKind, Record, Value};

/// A homogeneous column of decoded values.
///
/// Unsigned 16-bit record fields are widened to `i32`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Column {
    Int(Vec<i32>),
    UInt(Vec<u32>),
    /// Packed timestamps, flag bits already cleared
    Timestamp(Vec<u64>),
    Float(Vec<f32>),
    Text(Vec<String>),
}
impl Column {
    /// Empty column of the type a field decodes into.
    pub(crate) fn for_field(ty: FieldType, capacity: usize) -> Self {
        match ty {
            FieldType::U16 => Self::Int(Vec::with_capacity(capacity)),
            FieldType::U32 | FieldType::U32Array(_) => Self::UInt(Vec::with_capacity(capacity)),
            FieldType::U64 => Self::Timestamp(Vec::with_capacity(capacity)),
            FieldType::F32 => Self::Float(Vec::with_capacity(capacity)),
            FieldType::Text => Self::Text(Vec::with_capacity(capacity)),
        }
    }

    fn push(&mut self, value: Value) {
        match (self, value) {
            (Self::Int(v), Value::Int(x)) => v.push(x),
            (Self::UInt(v), Value::UInt(x)) => v.push(x),
            (Self::Timestamp(v), Value::Timestamp(x)) => v.push(x),
            (Self::Float(v), Value::Float(x)) => v.push(x),
            (Self::Text(v), Value::Text(x)) => v.push(x),
            (_, value) => unreachable!("value {value:?} does not match its column type"),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::UInt(v) => v.len(),
            Self::Timestamp(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_int(&self) -> Option<&[i32]> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<&[u32]> {
        match self {
            Self::UInt(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&[u64]> {
        match self {
            Self::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&[f32]> {
        match self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Renders row `idx` for text output.
    pub fn display_at(&self, idx: usize) -> Option<String> {
        match self {
            Self::Int(v) => v.get(idx).map(|x| x.to_string()),
            Self::UInt(v) => v.get(idx).map(|x| x.to_string()),
            Self::Timestamp(v) => v.get(idx).map(|x| x.to_string()),
            Self::Float(v) => v.get(idx).map(|x| x.to_string()),
            Self::Text(v) => v.get(idx).cloned(),
        }
    }
}

/// Ordered mapping from column name to equal-length columns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ColumnTable {
    kind: MetricKind,
    names: Vec<&'static str>,
    columns: Vec<Column>,
}
impl ColumnTable {
    /// Empty table with one typed column per scalar field of the descriptor.
    ///
    /// Array fields are skipped; they live in a [`CountMatrix`].
    pub(crate) fn for_descriptor(desc: &FormatDescriptor, capacity: usize) -> Self {
        let (names, columns): (Vec<_>, Vec<_>) = desc
            .fields
            .iter()
            .filter(|f| !matches!(f.ty, FieldType::U32Array(_)))
            .map(|f| (f.name, Column::for_field(f.ty, capacity)))
            .unzip();
        Self {
            kind: desc.kind,
            names,
            columns,
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Number of rows (records)
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|idx| &self.columns[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Column)> {
        self.names.iter().copied().zip(self.columns.iter())
    }
}

/// Row-major `records x columns` matrix of cluster counts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CountMatrix {
    ncols: usize,
    data: Vec<u32>,
}
impl CountMatrix {
    pub(crate) fn with_capacity(ncols: usize, nrows: usize) -> Self {
        Self {
            ncols,
            data: Vec::with_capacity(ncols * nrows),
        }
    }

    pub(crate) fn push_row(&mut self, row: &[u32]) {
        debug_assert_eq!(row.len(), self.ncols);
        self.data.extend_from_slice(row);
    }

    pub fn nrows(&self) -> usize {
        if self.ncols == 0 {
            0
        } else {
            self.data.len() / self.ncols
        }
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Count of bucket `col` for record `row`
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if col >= self.ncols {
            return None;
        }
        self.data.get(row * self.ncols + col).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[u32]> {
        let start = row * self.ncols;
        self.data.get(start..start + self.ncols)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.data.chunks_exact(self.ncols.max(1))
    }

    /// Total clusters per record
    pub fn row_sums(&self) -> Vec<u64> {
        self.rows()
            .map(|r| r.iter().map(|&x| x as u64).sum())
            .collect()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }
}

/// Collects decoded records into columns, in file order.
pub(crate) struct TableBuilder {
    table: ColumnTable,
    counts: Option<CountMatrix>,
}
impl TableBuilder {
    pub fn new(desc: &FormatDescriptor, capacity: usize) -> Self {
        let counts = desc.fields.iter().find_map(|f| match f.ty {
            FieldType::U32Array(n) => Some(CountMatrix::with_capacity(n, capacity)),
            _ => None,
        });
        Self {
            table: ColumnTable::for_descriptor(desc, capacity),
            counts,
        }
    }

    pub fn push(&mut self, record: Record) {
        let mut columns = self.table.columns.iter_mut();
        for value in record.into_values() {
            match value {
                Value::Counts(row) => {
                    if let Some(counts) = self.counts.as_mut() {
                        counts.push_row(&row);
                    }
                }
                value => {
                    if let Some(column) = columns.next() {
                        column.push(value);
                    }
                }
            }
        }
    }

    pub fn finish(self) -> MetricTable {
        match self.counts {
            Some(nclust) => MetricTable::Quality(QualityTable {
                key: self.table,
                nclust,
            }),
            None => MetricTable::Columns(self.table),
        }
    }
}

/// Quality metrics: key columns plus the per-bucket count matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QualityTable {
    pub key: ColumnTable,
    pub nclust: CountMatrix,
}
impl QualityTable {
    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Result of decoding a file of any kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MetricTable {
    Columns(ColumnTable),
    Quality(QualityTable),
}
impl MetricTable {
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Columns(t) => t.kind(),
            Self::Quality(t) => t.key.kind(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Columns(t) => t.len(),
            Self::Quality(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The scalar columns (the key table for Quality metrics)
    pub fn columns(&self) -> &ColumnTable {
        match self {
            Self::Columns(t) => t,
            Self::Quality(t) => &t.key,
        }
    }

    pub fn into_columns(self) -> Option<ColumnTable> {
        match self {
            Self::Columns(t) => Some(t),
            Self::Quality(_) => None,
        }
    }

    pub fn into_quality(self) -> Option<QualityTable> {
        match self {
            Self::Quality(t) => Some(t),
            Self::Columns(_) => None,
        }
    }
}
