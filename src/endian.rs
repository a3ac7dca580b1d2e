/*!
 * Byte-Order Conversion
 * Host⇄little/big-endian integer conversion and checked buffer field access
 *
 * Pure functions, no syscalls. The buffer accessors are the typed "field
 * at offset" view over caller-owned byte buffers; bounds violations are
 * caller contract errors, reported before touching the buffer.
 */

use crate::core::errors::{Result, SysError};

macro_rules! conversions {
    ($($ty:ident: $to_le:ident, $from_le:ident, $to_be:ident, $from_be:ident;)+) => {
        $(
            #[inline]
            #[must_use]
            pub fn $to_le(x: $ty) -> $ty {
                x.to_le()
            }

            #[inline]
            #[must_use]
            pub fn $from_le(x: $ty) -> $ty {
                $ty::from_le(x)
            }

            #[inline]
            #[must_use]
            pub fn $to_be(x: $ty) -> $ty {
                x.to_be()
            }

            #[inline]
            #[must_use]
            pub fn $from_be(x: $ty) -> $ty {
                $ty::from_be(x)
            }
        )+
    };
}

conversions! {
    u16: host_to_le16, le16_to_host, host_to_be16, be16_to_host;
    i16: host_to_le16_signed, le16_to_host_signed, host_to_be16_signed, be16_to_host_signed;
    u32: host_to_le32, le32_to_host, host_to_be32, be32_to_host;
    i32: host_to_le32_signed, le32_to_host_signed, host_to_be32_signed, be32_to_host_signed;
    u64: host_to_le64, le64_to_host, host_to_be64, be64_to_host;
    i64: host_to_le64_signed, le64_to_host_signed, host_to_be64_signed, be64_to_host_signed;
}

/// Byte order of a field stored in a caller-owned buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
    Host,
}

#[inline]
fn field<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N]> {
    offset
        .checked_add(N)
        .and_then(|end| buf.get(offset..end))
        .and_then(|s| <[u8; N]>::try_from(s).ok())
        .ok_or_else(|| {
            SysError::invalid_argument(format!(
                "field at offset {offset} (+{N}) exceeds buffer of {} bytes",
                buf.len()
            ))
        })
}

#[inline]
fn field_mut<const N: usize>(buf: &mut [u8], offset: usize) -> Result<&mut [u8]> {
    let len = buf.len();
    offset
        .checked_add(N)
        .and_then(|end| buf.get_mut(offset..end))
        .ok_or_else(|| {
            SysError::invalid_argument(format!(
                "field at offset {offset} (+{N}) exceeds buffer of {len} bytes"
            ))
        })
}

macro_rules! accessors {
    ($($ty:ident: $get:ident, $put:ident, $n:literal;)+) => {
        $(
            /// Read a field of this width at `offset`
            pub fn $get(buf: &[u8], offset: usize, order: ByteOrder) -> Result<$ty> {
                let raw = field::<$n>(buf, offset)?;
                Ok(match order {
                    ByteOrder::Little => $ty::from_le_bytes(raw),
                    ByteOrder::Big => $ty::from_be_bytes(raw),
                    ByteOrder::Host => $ty::from_ne_bytes(raw),
                })
            }

            /// Write a field of this width at `offset`, in place
            pub fn $put(buf: &mut [u8], offset: usize, value: $ty, order: ByteOrder) -> Result<()> {
                let bytes = match order {
                    ByteOrder::Little => value.to_le_bytes(),
                    ByteOrder::Big => value.to_be_bytes(),
                    ByteOrder::Host => value.to_ne_bytes(),
                };
                field_mut::<$n>(buf, offset)?.copy_from_slice(&bytes);
                Ok(())
            }
        )+
    };
}

accessors! {
    u8: get_u8, put_u8, 1;
    i8: get_i8, put_i8, 1;
    u16: get_u16, put_u16, 2;
    i16: get_i16, put_i16, 2;
    u32: get_u32, put_u32, 4;
    i32: get_i32, put_i32, 4;
    u64: get_u64, put_u64, 8;
    i64: get_i64, put_i64, 8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_both_orders() {
        let x: u32 = 0x0102_0304;
        assert_eq!(le32_to_host(host_to_le32(x)), x);
        assert_eq!(be32_to_host(host_to_be32(x)), x);
        let y: i16 = -2;
        assert_eq!(le16_to_host_signed(host_to_le16_signed(y)), y);
        assert_eq!(be16_to_host_signed(host_to_be16_signed(y)), y);
    }

    #[test]
    fn test_swapped_representation() {
        // On either host endianness, LE and BE forms of an asymmetric
        // value differ by a byte swap.
        let x: u16 = 0x1234;
        assert_eq!(host_to_le16(x).swap_bytes(), host_to_be16(x));
    }

    #[test]
    fn test_buffer_field_access() {
        let mut buf = [0u8; 8];
        put_u32(&mut buf, 2, 0xAABB_CCDD, ByteOrder::Big).unwrap();
        assert_eq!(buf[2..6], [0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(get_u32(&buf, 2, ByteOrder::Big).unwrap(), 0xAABB_CCDD);
        assert_eq!(get_u32(&buf, 2, ByteOrder::Little).unwrap(), 0xDDCC_BBAA);
    }

    #[test]
    fn test_out_of_bounds_is_invalid_argument() {
        let buf = [0u8; 4];
        assert!(matches!(
            get_u64(&buf, 0, ByteOrder::Host),
            Err(SysError::InvalidArgument(_))
        ));
        let mut buf = [0u8; 4];
        assert!(put_u16(&mut buf, 3, 1, ByteOrder::Host).is_err());
    }

    #[test]
    fn test_offset_near_usize_max_reports_cleanly() {
        // End-of-field arithmetic must not wrap before the bounds check
        let buf = [0u8; 16];
        assert!(matches!(
            get_u64(&buf, usize::MAX - 4, ByteOrder::Host),
            Err(SysError::InvalidArgument(_))
        ));
        let mut buf = [0u8; 16];
        assert!(put_u32(&mut buf, usize::MAX, 1, ByteOrder::Host).is_err());
    }
}
