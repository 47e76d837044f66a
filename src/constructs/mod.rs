mod format;
mod header;
mod record;
mod table;
mod tile_code;

pub use format::{
    FieldDescriptor, FieldType, FormatDescriptor, MetricKind, Transform, CONTROL_MIN_RECORD_SIZE,
    MAX_FIELD_LEN, QUALITY_BINS,
};
pub use header::{Header, HeaderLayout};
pub use record::{Record, Value};
pub use table::{Column, ColumnTable, CountMatrix, MetricTable, QualityTable};
pub(crate) use table::TableBuilder;
pub use tile_code::TileCode;
