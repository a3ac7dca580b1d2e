/*!
 * Flag-Table Codec
 * Ordered named-flag to platform-bitmask conversion, both directions
 *
 * Every option list crossing the syscall boundary goes through one of
 * these tables: an ordered sequence of named flags, each mapped to its
 * platform constant or to an "unsupported here" sentinel. Encoding never
 * sets a bit for an unsupported flag; decoding reports only supported bits,
 * in table order, so output ordering is deterministic regardless of how
 * the kernel lays the bits out.
 */

use crate::core::errors::{Result, SysError};
use std::fmt;

/// Ordered mapping from named flags to platform bit values
///
/// `None` is the sentinel for a flag that exists in the portable vocabulary
/// but has no constant on the current platform.
#[derive(Debug, Clone)]
pub struct FlagTable<F> {
    name: &'static str,
    entries: Vec<(F, Option<u64>)>,
}

impl<F: Copy + PartialEq + fmt::Debug> FlagTable<F> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Append a supported flag with its platform bit value
    pub fn with(mut self, flag: F, bits: u64) -> Self {
        self.entries.push((flag, Some(bits)));
        self
    }

    /// Append a flag that has no constant on this platform
    pub fn without(mut self, flag: F) -> Self {
        self.entries.push((flag, None));
        self
    }

    /// Table name, used in error context
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Platform bit value for a flag, or `None` when unsupported
    pub fn bits(&self, flag: F) -> Option<u64> {
        self.entries
            .iter()
            .find(|(f, _)| *f == flag)
            .and_then(|(_, b)| *b)
    }

    pub fn is_supported(&self, flag: F) -> bool {
        self.bits(flag).is_some()
    }

    /// Encode a flag list into a bitmask, failing fast on unsupported flags
    ///
    /// A flag mapped to the sentinel raises `NotAvailable` rather than
    /// silently clearing the bit: a caller asking for e.g. atomic rename
    /// exchange must not silently degrade to a plain rename.
    pub fn encode(&self, flags: &[F]) -> Result<u64> {
        let mut mask = 0u64;
        for &flag in flags {
            match self.lookup(flag)? {
                Some(bits) => mask |= bits,
                None => {
                    return Err(SysError::not_available(format!(
                        "{} flag {:?}",
                        self.name, flag
                    )))
                }
            }
        }
        Ok(mask)
    }

    /// Encode a flag list, dropping unsupported flags instead of failing
    ///
    /// Call-site policy for flags whose absence is harmless (the original
    /// open-flag convention: missing O_DSYNC encodes as 0).
    pub fn encode_lenient(&self, flags: &[F]) -> Result<u64> {
        let mut mask = 0u64;
        for &flag in flags {
            if let Some(bits) = self.lookup(flag)? {
                mask |= bits;
            }
        }
        Ok(mask)
    }

    /// Decode a bitmask into the flags present, in table order
    ///
    /// Only bits named in the table are reported; unsupported entries and
    /// zero-valued bits never appear.
    pub fn decode(&self, mask: u64) -> Vec<F> {
        self.entries
            .iter()
            .filter_map(|&(flag, bits)| match bits {
                Some(b) if b != 0 && mask & b == b => Some(flag),
                _ => None,
            })
            .collect()
    }

    fn lookup(&self, flag: F) -> Result<Option<u64>> {
        self.entries
            .iter()
            .find(|(f, _)| *f == flag)
            .map(|(_, b)| *b)
            .ok_or_else(|| {
                SysError::invalid_argument(format!("{} has no entry for {:?}", self.name, flag))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Demo {
        A,
        B,
        Missing,
    }

    fn table() -> FlagTable<Demo> {
        FlagTable::new("demo")
            .with(Demo::A, 0x1)
            .with(Demo::B, 0x4)
            .without(Demo::Missing)
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let t = table();
        for &f in &[Demo::A, Demo::B] {
            let mask = t.encode(&[f]).unwrap();
            assert_eq!(t.decode(mask), vec![f]);
        }
        let mask = t.encode(&[Demo::B, Demo::A]).unwrap();
        // Decode order follows the table, not the request
        assert_eq!(t.decode(mask), vec![Demo::A, Demo::B]);
    }

    #[test]
    fn test_strict_encode_rejects_unsupported() {
        let err = table().encode(&[Demo::A, Demo::Missing]).unwrap_err();
        assert!(err.is_not_available());
    }

    #[test]
    fn test_lenient_encode_drops_unsupported() {
        let mask = table().encode_lenient(&[Demo::A, Demo::Missing]).unwrap();
        assert_eq!(mask, 0x1);
    }

    #[test]
    fn test_decode_ignores_unnamed_bits() {
        assert_eq!(table().decode(0x1 | 0x80), vec![Demo::A]);
    }
}
