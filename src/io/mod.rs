mod control;
mod decode;
mod fixed;
mod source;

pub use control::ControlRecords;
pub use decode::{
    decode, decode_reader, decode_source, decode_with, read_control_metrics,
    read_corrected_intensity_metrics, read_error_metrics, read_extraction_metrics,
    read_image_metrics, read_quality_metrics, read_tile_metrics, Records,
};
pub use fixed::FixedRecords;
pub use source::{BoxedReader, ByteSource};
