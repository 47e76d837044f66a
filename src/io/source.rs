//! Byte sources for metrics files.
//!
//! A [`ByteSource`] owns its handle for the duration of one decode call; dropping it
//! closes the file (or unmaps it) on every exit path.

use std::{
    fs::File,
    io::{BufReader, Cursor, ErrorKind, Read},
    path::Path,
};

use log::debug;
use memmap2::Mmap;

use crate::{DecodeOptions, Header, HeaderLayout};

pub type BoxedReader = Box<dyn Read + Send>;

#[cfg(feature = "niffler")]
const NIFFLER_SNIFF_LEN: u64 = 5;

/// Sequential reader that knows the on-disk size of what it reads.
///
/// # Examples
///
/// ```rust
/// use interop::{ByteSource, HeaderLayout};
/// use std::io::Cursor;
///
/// # fn main() -> interop::Result<()> {
/// let bytes = vec![3u8, 10, 0xAA, 0xBB];
/// let size = bytes.len() as u64;
/// let mut source = ByteSource::new(Cursor::new(bytes), size);
///
/// let header = source.read_header(HeaderLayout::VersionAndLength)?;
/// assert_eq!(header.version, 3);
/// assert_eq!(header.record_len, Some(10));
///
/// let mut buf = [0u8; 4];
/// assert_eq!(source.fill(&mut buf)?, 2);
/// # Ok(())
/// # }
/// ```
pub struct ByteSource<R: Read = BoxedReader> {
    /// Inner reader providing the data stream
    inner: R,

    /// Size of the file in bytes as reported by `stat`
    size: u64,

    /// Bytes consumed so far
    pos: u64,
}
impl<R: Read> ByteSource<R> {
    pub fn new(inner: R, size: u64) -> Self {
        Self {
            inner,
            size,
            pos: 0,
        }
    }

    /// Size in bytes of the underlying file (compressed size for compressed input).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Reads the leading header bytes.
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEof` I/O error if the source is shorter than the layout.
    pub fn read_header(&mut self, layout: HeaderLayout) -> crate::Result<Header> {
        let mut bytes = [0u8; 2];
        let bytes = &mut bytes[..layout.size()];
        self.inner.read_exact(bytes)?;
        self.pos += bytes.len() as u64;
        Ok(Header::from_bytes(layout, bytes))
    }

    /// Reads until `buf` is full or the source is exhausted.
    ///
    /// Returns the number of bytes written into `buf`; anything short of
    /// `buf.len()` means end of data.
    pub fn fill(&mut self, buf: &mut [u8]) -> crate::Result<usize> {
        let mut read = 0;
        while read < buf.len() {
            match self.inner.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.pos += read as u64;
        Ok(read)
    }
}

impl ByteSource<BoxedReader> {
    /// Opens a metrics file.
    ///
    /// The file is read through a buffered handle, or through a memory map when
    /// [`DecodeOptions::mmap`] is set. With the `niffler` feature, compressed files
    /// (gzip, zstd, ...) are transparently decompressed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or stat-ed, or if decompression
    /// cannot be set up.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        let rdr: BoxedReader = if options.mmap && size > 0 {
            let map = unsafe { Mmap::map(&file)? };
            Box::new(Cursor::new(map))
        } else {
            Box::new(BufReader::new(file))
        };
        debug!(
            "opened {} ({} bytes, mmap: {})",
            path.display(),
            size,
            options.mmap
        );

        // too short to carry a compression magic number
        #[cfg(feature = "niffler")]
        if size >= NIFFLER_SNIFF_LEN {
            let (pt, format) = niffler::send::get_reader(rdr)?;
            debug!("compression format of {}: {:?}", path.display(), format);
            return Ok(Self::new(pt, size));
        }
        Ok(Self::new(rdr, size))
    }
}
