//! Per-field decoding and semantic transforms shared by every record layout.
//!
//! Records are packed: fields sit at arbitrary byte offsets, so every read here
//! is unaligned and little-endian regardless of host byte order.

use crate::{InteropError, Transform};

/// Clears the two high flag bits of a packed timestamp
pub const TIMESTAMP_MASK: u64 = 0x3FFF_FFFF_FFFF_FFFF;

/// Strips the flag bits from a packed 64-bit timestamp.
///
/// ```rust
/// assert_eq!(interop::mask_timestamp(0xC000_0000_0000_0001), 1);
/// ```
#[inline]
pub fn mask_timestamp(raw: u64) -> u64 {
    raw & TIMESTAMP_MASK
}

#[inline]
pub(crate) fn apply_u64(transform: Transform, raw: u64) -> u64 {
    match transform {
        Transform::None => raw,
        Transform::MaskTimestamp => mask_timestamp(raw),
    }
}

#[inline]
pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le(bytemuck::pod_read_unaligned(&bytes[offset..offset + 2]))
}

#[inline]
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le(bytemuck::pod_read_unaligned(&bytes[offset..offset + 4]))
}

#[inline]
pub(crate) fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le(bytemuck::pod_read_unaligned(&bytes[offset..offset + 8]))
}

#[inline]
pub(crate) fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(bytes, offset))
}

/// Fills `out` with consecutive `u32`s starting at `offset`.
pub(crate) fn read_u32_array(bytes: &[u8], offset: usize, out: &mut [u32]) {
    let end = offset + 4 * out.len();
    let src = &bytes[offset..end];
    // `out` is aligned, so copy the raw bytes straight in and fix byte order after
    bytemuck::cast_slice_mut::<u32, u8>(out).copy_from_slice(src);
    for x in out.iter_mut() {
        *x = u32::from_le(*x);
    }
}

/// 16-bit record fields are exposed as `i32`
#[inline]
pub(crate) fn widen_u16(x: u16) -> i32 {
    i32::from(x)
}

/// Rejects a declared text length above the ceiling.
pub(crate) fn check_text_len(
    field: &'static str,
    len: usize,
    max: usize,
    pos: u64,
) -> crate::Result<()> {
    if len > max {
        return Err(InteropError::OversizedField {
            field,
            len,
            max,
            pos,
        });
    }
    Ok(())
}

/// Decodes exactly `bytes` as text. Invalid sequences become U+FFFD.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_timestamp() {
        assert_eq!(mask_timestamp(0xC000_0000_0000_0001), 1);
        assert_eq!(mask_timestamp(0x8000_0000_0000_0000), 0);
        assert_eq!(mask_timestamp(0x4000_0000_0000_0002), 2);
        assert_eq!(mask_timestamp(TIMESTAMP_MASK), TIMESTAMP_MASK);
        assert_eq!(apply_u64(Transform::None, u64::MAX), u64::MAX);
        assert_eq!(apply_u64(Transform::MaskTimestamp, u64::MAX), TIMESTAMP_MASK);
    }

    #[test]
    fn test_unaligned_reads() {
        let mut bytes = vec![0xAA];
        bytes.extend_from_slice(&0x1234u16.to_le_bytes());
        bytes.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&0x0102030405060708u64.to_le_bytes());

        assert_eq!(read_u16(&bytes, 1), 0x1234);
        assert_eq!(read_u32(&bytes, 3), 0xDEADBEEF);
        assert_eq!(read_f32(&bytes, 7), 1.5);
        assert_eq!(read_u64(&bytes, 11), 0x0102030405060708);
    }

    #[test]
    fn test_read_u32_array() {
        let mut bytes = vec![0u8; 3];
        for i in 0..5u32 {
            bytes.extend_from_slice(&(i * 1000).to_le_bytes());
        }
        let mut out = [0u32; 5];
        read_u32_array(&bytes, 3, &mut out);
        assert_eq!(out, [0, 1000, 2000, 3000, 4000]);
    }

    #[test]
    fn test_widen_u16() {
        assert_eq!(widen_u16(u16::MAX), 65535);
        assert_eq!(widen_u16(0), 0);
    }

    #[test]
    fn test_check_text_len() {
        assert!(check_text_len("control", 256, 256, 0).is_ok());
        assert!(matches!(
            check_text_len("index", 257, 256, 40),
            Err(InteropError::OversizedField {
                field: "index",
                len: 257,
                max: 256,
                pos: 40
            })
        ));
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"phiX1"), "phiX1");
        assert_eq!(decode_text(b""), "");
        // embedded NUL is kept, length is authoritative
        assert_eq!(decode_text(b"a\0b"), "a\0b");
        assert_eq!(decode_text(&[0x66, 0xFF]), "f\u{FFFD}");
    }
}
