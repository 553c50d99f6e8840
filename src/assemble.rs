use crate::bits::BitString;
use crate::error::{ItemModelError, Result};
use crate::schema::{ID_BITS, SENTINEL_ID};

/// Serialize a finished stream back to a `JM`-prefixed byte buffer.
///
/// The stream must be sentinel-terminated at `last_sentinel` (the final
/// terminator when a runeword list follows the item list) and carry only
/// zero bits past it; calling this on an unterminated or dirty stream is a
/// caller error. Padding to the byte boundary happens here and nowhere
/// else.
pub fn assemble(bits: &BitString, last_sentinel: usize) -> Result<Vec<u8>> {
    let terminator = bits.number_at(last_sentinel, ID_BITS as usize)? as u16;
    if terminator != SENTINEL_ID {
        return Err(ItemModelError::MissingSentinel {
            offset: last_sentinel,
        });
    }
    if !bits.tail_is_zero(last_sentinel + ID_BITS as usize) {
        return Err(ItemModelError::DirtyPadding);
    }
    let mut out = bits.clone();
    out.pad_to_byte();
    Ok(out.to_d2i())
}
