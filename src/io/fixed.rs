//! Generic engine for fixed-width record layouts.

use std::{io::Read, iter::FusedIterator};

use log::{debug, warn};

use crate::{
    transform::{apply_u64, read_f32, read_u16, read_u32, read_u32_array, read_u64, widen_u16},
    ByteSource, DecodeOptions, FieldType, FormatDescriptor, Header, InteropError, Record, Value,
};

/// Streams fixed-width records out of a byte source.
///
/// Iteration stops cleanly once fewer than one record's worth of bytes remain;
/// an incomplete trailing record is dropped, never padded.
pub struct FixedRecords<R: Read> {
    source: ByteSource<R>,
    desc: &'static FormatDescriptor,
    header: Header,

    /// Holds exactly one record
    buffer: Vec<u8>,

    /// Records yielded so far
    count: usize,

    eof: bool,
}
impl<R: Read> FixedRecords<R> {
    pub(crate) fn new(
        mut source: ByteSource<R>,
        desc: &'static FormatDescriptor,
        record_size: usize,
        options: &DecodeOptions,
    ) -> crate::Result<Self> {
        let header = source.read_header(desc.header)?;
        check_record_len(desc, record_size, &header, options)?;
        Ok(Self {
            source,
            desc,
            header,
            buffer: vec![0; record_size],
            count: 0,
            eof: false,
        })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn records_read(&self) -> usize {
        self.count
    }
}

impl<R: Read> Iterator for FixedRecords<R> {
    type Item = crate::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            return None;
        }
        match self.source.fill(&mut self.buffer) {
            Ok(n) if n == self.buffer.len() => {
                self.count += 1;
                Some(Ok(decode_fixed(self.desc, &self.buffer)))
            }
            Ok(n) => {
                self.eof = true;
                debug!(
                    "{} metrics: {} records, {} trailing bytes discarded",
                    self.desc.kind, self.count, n
                );
                None
            }
            Err(e) => {
                self.eof = true;
                Some(Err(e))
            }
        }
    }
}
impl<R: Read> FusedIterator for FixedRecords<R> {}

/// Compares the header's declared record length with the layout.
fn check_record_len(
    desc: &FormatDescriptor,
    record_size: usize,
    header: &Header,
    options: &DecodeOptions,
) -> crate::Result<()> {
    let Some(declared) = header.record_len.map(usize::from) else {
        return Ok(());
    };
    if declared == record_size {
        return Ok(());
    }
    if options.strict_record_len {
        return Err(InteropError::RecordLengthMismatch {
            kind: desc.kind,
            expected: record_size,
            actual: declared,
        });
    }
    warn!(
        "{} metrics header declares {}-byte records, decoding as {} bytes",
        desc.kind, declared, record_size
    );
    Ok(())
}

/// Decodes every field of one packed record.
fn decode_fixed(desc: &'static FormatDescriptor, bytes: &[u8]) -> Record {
    let values = desc
        .fields
        .iter()
        .map(|field| match field.ty {
            FieldType::U16 => Value::Int(widen_u16(read_u16(bytes, field.offset))),
            FieldType::U32 => Value::UInt(read_u32(bytes, field.offset)),
            FieldType::U64 => Value::Timestamp(apply_u64(
                field.transform,
                read_u64(bytes, field.offset),
            )),
            FieldType::F32 => Value::Float(read_f32(bytes, field.offset)),
            FieldType::U32Array(n) => {
                let mut counts = vec![0u32; n];
                read_u32_array(bytes, field.offset, &mut counts);
                Value::Counts(counts)
            }
            FieldType::Text => unreachable!("text fields only occur in variable-length layouts"),
        })
        .collect();
    Record::new(desc, values)
}
