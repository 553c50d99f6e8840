use crate::error::{ItemModelError, Result};

/// Fixed 2-byte signature preceding every item payload.
pub const MAGIC: [u8; 2] = *b"JM";

/// Canonical, order-normalized bit sequence for one item payload (magic
/// prefix excluded). Offsets are stream offsets: offset 0 is the first bit
/// a reader consumes, and multi-bit fields are stored least-significant bit
/// first at ascending offsets.
///
/// The on-disk convention this normalizes is the format's byte-reversal
/// trick: render each payload byte MSB-first, then concatenate the per-byte
/// chunks in reverse byte order. Reversing that whole string bit-for-bit
/// yields exactly this stream order, so the two views describe the same
/// bits. The equivalence is pinned down by tests in this module; every
/// other component works purely in stream offsets.
///
/// Length is a multiple of 8 at the codec boundary. It may go unaligned
/// while records are being spliced in or out; [`crate::assemble`] restores
/// alignment by appending zero bits after the terminator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitString {
    bits: Vec<u8>,
}

impl BitString {
    /// Normalize a raw payload (no magic prefix) into stream order.
    pub fn from_payload(payload: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(payload.len() * 8);
        for &byte in payload {
            for k in 0..8 {
                bits.push((byte >> k) & 1);
            }
        }
        Self { bits }
    }

    /// Wrap bits already in stream order.
    pub(crate) fn from_raw_bits(bits: Vec<u8>) -> Self {
        Self { bits }
    }

    /// Normalize a full item buffer, validating the `JM` signature.
    pub fn from_d2i(data: &[u8]) -> Result<Self> {
        if data.len() < 2 || data[..2] != MAGIC {
            return Err(ItemModelError::InvalidSignature);
        }
        Ok(Self::from_payload(&data[2..]))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    fn check_span(&self, offset: usize, want: usize) -> Result<()> {
        if offset.checked_add(want).is_none_or(|end| end > self.bits.len()) {
            return Err(ItemModelError::Bounds {
                offset,
                want,
                available: self.bits.len().saturating_sub(offset),
            });
        }
        Ok(())
    }

    /// Read `width` bits (at most 32) starting at `offset` as an unsigned
    /// integer.
    pub fn number_at(&self, offset: usize, width: usize) -> Result<u32> {
        debug_assert!(width <= 32, "field widths are at most 32 bits");
        self.check_span(offset, width)?;
        let mut value = 0u32;
        for k in 0..width {
            value |= u32::from(self.bits[offset + k]) << k;
        }
        Ok(value)
    }

    /// Overwrite the span starting at `offset` with pre-encoded bits.
    pub(crate) fn overwrite(&mut self, offset: usize, encoded: &[u8]) -> Result<()> {
        self.check_span(offset, encoded.len())?;
        self.bits[offset..offset + encoded.len()].copy_from_slice(encoded);
        Ok(())
    }

    /// Insert pre-encoded bits so they occupy `offset..offset + len`,
    /// pushing every later bit forward.
    pub(crate) fn splice_in(&mut self, offset: usize, encoded: &[u8]) -> Result<()> {
        if offset > self.bits.len() {
            return Err(ItemModelError::Bounds {
                offset,
                want: 0,
                available: self.bits.len(),
            });
        }
        self.bits.splice(offset..offset, encoded.iter().copied());
        Ok(())
    }

    /// Remove the span `offset..offset + width`, pulling every later bit
    /// backward.
    pub(crate) fn splice_out(&mut self, offset: usize, width: usize) -> Result<()> {
        self.check_span(offset, width)?;
        self.bits.drain(offset..offset + width);
        Ok(())
    }

    /// True when no bit at `from` or beyond is set.
    pub(crate) fn tail_is_zero(&self, from: usize) -> bool {
        self.bits[from.min(self.bits.len())..].iter().all(|&b| b == 0)
    }

    /// Append zero bits up to the next byte boundary. Returns the number of
    /// bits added.
    pub(crate) fn pad_to_byte(&mut self) -> usize {
        let pad = (8 - self.bits.len() % 8) % 8;
        self.bits.extend(std::iter::repeat_n(0, pad));
        pad
    }

    /// Serialize back to raw payload bytes. An unaligned tail is padded
    /// with zero bits; set bits are never dropped.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bits.len().div_ceil(8));
        for chunk in self.bits.chunks(8) {
            let mut byte = 0u8;
            for (k, &bit) in chunk.iter().enumerate() {
                byte |= bit << k;
            }
            out.push(byte);
        }
        out
    }

    /// Serialize to a full item buffer with the `JM` signature prepended.
    pub fn to_d2i(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.bits.len().div_ceil(8));
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.to_payload());
        out
    }
}

/// Encode `value` into `width` bits in stream order (LSB first).
pub(crate) fn encode_field(out: &mut Vec<u8>, value: u32, width: u8) -> Result<()> {
    if width < 32 && value >= 1u32 << width {
        return Err(ItemModelError::Encoding { value, bits: width });
    }
    for k in 0..width {
        out.push(((value >> k) & 1) as u8);
    }
    Ok(())
}
