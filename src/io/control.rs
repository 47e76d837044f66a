//! Decoder for the variable-length Control metrics layout.
//!
//! Each record is `lane:u16 tile:u16 read:u16`, then two u16-length-prefixed
//! text fields (control name, index name), then `nclust:u32`.

use std::{io::Read, iter::FusedIterator};

use log::{debug, trace};

use crate::{
    transform::{check_text_len, decode_text, read_u16, read_u32, widen_u16},
    ByteSource, DecodeOptions, FormatDescriptor, Header, Record, Value, CONTROL_MIN_RECORD_SIZE,
};

/// lane, tile, read, control name length
const PREFIX_SIZE: usize = 8;

const NCLUST_SIZE: usize = 4;

/// Streams Control records out of a byte source.
///
/// Text lengths above [`DecodeOptions::max_field_len`] fail the decode. A record
/// cut short by the end of the file ends the stream silently.
pub struct ControlRecords<R: Read> {
    source: ByteSource<R>,
    desc: &'static FormatDescriptor,
    header: Header,

    /// Scratch space for one text field, never grown past `max_field_len`
    text: Vec<u8>,
    max_field_len: usize,

    /// Records yielded so far
    count: usize,

    eof: bool,
}
impl<R: Read> ControlRecords<R> {
    pub(crate) fn new(
        mut source: ByteSource<R>,
        desc: &'static FormatDescriptor,
        options: &DecodeOptions,
    ) -> crate::Result<Self> {
        let header = source.read_header(desc.header)?;
        Ok(Self {
            source,
            desc,
            header,
            text: Vec::with_capacity(options.max_field_len),
            max_field_len: options.max_field_len,
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

    /// Fills `buf` completely, or returns `false` at end of data.
    fn read_exact_or_end(&mut self, buf: &mut [u8], start: u64) -> crate::Result<bool> {
        let n = self.source.fill(buf)?;
        if n < buf.len() {
            debug!(
                "{} metrics: {} records, {} trailing bytes discarded",
                self.desc.kind,
                self.count,
                self.source.position() - start
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Reads one length-prefixed text body of `len` bytes.
    ///
    /// `trailing` is the number of bytes a record needs after this text when every
    /// remaining field is minimal. An oversized length only fails the decode when
    /// those bytes are present; otherwise the record is a truncated tail.
    fn read_text(
        &mut self,
        field: &'static str,
        len: usize,
        len_pos: u64,
        trailing: usize,
        start: u64,
    ) -> crate::Result<Option<String>> {
        if let Err(e) = check_text_len(field, len, self.max_field_len, len_pos) {
            let mut rest = [0u8; CONTROL_MIN_RECORD_SIZE - PREFIX_SIZE];
            if !self.read_exact_or_end(&mut rest[..trailing], start)? {
                return Ok(None);
            }
            return Err(e);
        }
        let mut text = std::mem::take(&mut self.text);
        text.resize(len, 0);
        let complete = self.read_exact_or_end(&mut text, start)?;
        let value = complete.then(|| decode_text(&text));
        self.text = text;
        Ok(value)
    }

    fn read_record(&mut self) -> crate::Result<Option<Record>> {
        let start = self.source.position();
        trace!("control record at byte {}", start);

        let mut prefix = [0u8; PREFIX_SIZE];
        if !self.read_exact_or_end(&mut prefix, start)? {
            return Ok(None);
        }
        let lane = widen_u16(read_u16(&prefix, 0));
        let tile = widen_u16(read_u16(&prefix, 2));
        let read = widen_u16(read_u16(&prefix, 4));
        let control_len = usize::from(read_u16(&prefix, 6));

        let Some(control) = self.read_text(
            "control",
            control_len,
            start + 6,
            CONTROL_MIN_RECORD_SIZE - PREFIX_SIZE,
            start,
        )?
        else {
            return Ok(None);
        };

        let mut len_bytes = [0u8; 2];
        let index_len_pos = self.source.position();
        if !self.read_exact_or_end(&mut len_bytes, start)? {
            return Ok(None);
        }
        let index_len = usize::from(read_u16(&len_bytes, 0));
        let Some(index) = self.read_text("index", index_len, index_len_pos, NCLUST_SIZE, start)?
        else {
            return Ok(None);
        };

        let mut nclust = [0u8; NCLUST_SIZE];
        if !self.read_exact_or_end(&mut nclust, start)? {
            return Ok(None);
        }

        let values = vec![
            Value::Int(lane),
            Value::Int(tile),
            Value::Int(read),
            Value::Text(control),
            Value::Text(index),
            Value::UInt(read_u32(&nclust, 0)),
        ];
        Ok(Some(Record::new(self.desc, values)))
    }
}

impl<R: Read> Iterator for ControlRecords<R> {
    type Item = crate::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => {
                self.count += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                self.eof = true;
                None
            }
            Err(e) => {
                self.eof = true;
                Some(Err(e))
            }
        }
    }
}
impl<R: Read> FusedIterator for ControlRecords<R> {}
