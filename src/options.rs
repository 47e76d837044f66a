use crate::MAX_FIELD_LEN;

/// Knobs for a decode call.
///
/// The defaults reproduce the instrument reader's behaviour: the declared record
/// length in the header is ignored and text fields may be up to 256 bytes.
///
/// ```rust
/// use interop::DecodeOptions;
///
/// let options = DecodeOptions::default().strict_record_len(true).mmap(true);
/// assert!(options.strict_record_len);
/// assert_eq!(options.max_field_len, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecodeOptions {
    /// Largest accepted length for a length-prefixed text field
    pub max_field_len: usize,
    /// Fail when the header's declared record length differs from the known layout
    pub strict_record_len: bool,
    /// Read through a memory map instead of a buffered file handle
    pub mmap: bool,
}
impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_field_len: MAX_FIELD_LEN,
            strict_record_len: false,
            mmap: false,
        }
    }
}
impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn max_field_len(mut self, max_field_len: usize) -> Self {
        self.max_field_len = max_field_len;
        self
    }
    pub fn strict_record_len(mut self, strict: bool) -> Self {
        self.strict_record_len = strict;
        self
    }
    pub fn mmap(mut self, mmap: bool) -> Self {
        self.mmap = mmap;
        self
    }
}
