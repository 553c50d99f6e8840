use crate::bits::BitString;
use crate::error::{ItemModelError, Result};

/// Forward cursor over a [`BitString`]. Every read advances the cursor and
/// fails with [`crate::ItemModelError::Bounds`] when fewer bits remain than
/// requested; a short read means the record is truncated.
pub struct BitReader<'a> {
    bits: &'a BitString,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a BitString) -> Self {
        Self { bits, pos: 0 }
    }

    /// Cursor positioned at an absolute stream offset.
    pub fn at(bits: &'a BitString, offset: usize) -> Self {
        Self { bits, pos: offset }
    }

    /// Bits consumed so far (the absolute stream offset of the next read).
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bits.len().saturating_sub(self.pos)
    }

    /// Reposition to an absolute stream offset. The next read still bounds
    /// checks, so seeking past the end only defers the `Bounds` error.
    pub fn seek(&mut self, offset: usize) {
        self.pos = offset;
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_number(1)? != 0)
    }

    pub fn read_number(&mut self, width: usize) -> Result<u32> {
        let value = self.bits.number_at(self.pos, width)?;
        self.pos += width;
        Ok(value)
    }

    /// Advance past reserved bits. A skip past the end is the same
    /// truncation as a failed read.
    pub fn skip(&mut self, width: usize) -> Result<()> {
        if self.remaining() < width {
            return Err(ItemModelError::Bounds {
                offset: self.pos,
                want: width,
                available: self.remaining(),
            });
        }
        self.pos += width;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ItemModelError;

    #[test]
    fn reads_advance_in_stream_order() {
        // 0x25 = ..100101 in stream order: 1, 0, then 1001 (LSB first).
        let bits = BitString::from_payload(&[0x25]);
        let mut r = BitReader::new(&bits);
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());
        assert_eq!(r.read_number(4).unwrap(), 0b1001);
        assert_eq!(r.offset(), 6);
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn short_reads_fail_without_advancing() {
        let bits = BitString::from_payload(&[0x00]);
        let mut r = BitReader::at(&bits, 4);
        assert!(matches!(
            r.read_number(5),
            Err(ItemModelError::Bounds {
                offset: 4,
                want: 5,
                available: 4,
            })
        ));
        assert_eq!(r.offset(), 4);
        assert!(r.skip(5).is_err());
        assert!(r.skip(4).is_ok());
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn seek_repositions_the_cursor() {
        let bits = BitString::from_payload(&[0x25, 0x00]);
        let mut r = BitReader::new(&bits);
        assert_eq!(r.read_number(8).unwrap(), 0x25);
        r.seek(2);
        assert_eq!(r.offset(), 2);
        assert_eq!(r.read_number(4).unwrap(), 0b1001);

        // Seeking out of range fails at the next read, not at the seek.
        r.seek(100);
        assert!(matches!(
            r.read_number(1),
            Err(ItemModelError::Bounds { offset: 100, .. })
        ));
    }
}
