use crate::bits::{BitString, encode_field};
use crate::error::Result;

/// Builds a [`BitString`] field by field in stream order, the inverse of
/// [`crate::BitReader`]. Used to assemble item records from scratch.
#[derive(Default)]
pub struct BitWriter {
    bits: Vec<u8>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_bool(&mut self, value: bool) {
        self.bits.push(u8::from(value));
    }

    pub fn push_number(&mut self, value: u32, width: u8) -> Result<()> {
        encode_field(&mut self.bits, value, width)
    }

    /// Push a sequence of 8-bit character codes, e.g. an item-type tag.
    pub fn push_byte_str(&mut self, codes: &[u8]) {
        for &code in codes {
            for k in 0..8 {
                self.bits.push((code >> k) & 1);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Finish without touching alignment; callers that want a well-formed
    /// payload pass the result through [`crate::assemble`].
    pub fn into_bits(self) -> BitString {
        BitString::from_raw_bits(self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::BitReader;

    #[test]
    fn writer_is_inverse_of_reader() {
        let mut w = BitWriter::new();
        w.push_bool(true);
        w.push_number(0x1FF, 9).unwrap();
        w.push_byte_str(b"cm1 ");
        let bits = w.into_bits();

        let mut r = BitReader::new(&bits);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_number(9).unwrap(), 0x1FF);
        for expected in *b"cm1 " {
            assert_eq!(r.read_number(8).unwrap(), u32::from(expected));
        }
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn overflowing_field_is_rejected() {
        let mut w = BitWriter::new();
        assert!(w.push_number(4, 2).is_err());
        assert!(w.is_empty());
    }
}
