use log::trace;

use crate::bits::{BitString, encode_field};
use crate::error::{ItemModelError, Result};
use crate::reader::BitReader;
use crate::schema::{ID_BITS, PropertyDef, PropertySchema, SENTINEL_ID};

/// One decoded property record and its exact bit span.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyRecord {
    pub id: u16,
    /// Stored (biased) value, exactly as encoded.
    pub value: u32,
    /// Zero when the property carries no parameter.
    pub param: u32,
    /// Absolute stream offset of the record's id field.
    pub bit_offset: usize,
    pub param_bits: u8,
    pub value_bits: u8,
}

impl PropertyRecord {
    /// Total bits the record occupies: id, parameter, value.
    pub fn width(&self) -> usize {
        ID_BITS as usize + self.param_bits as usize + self.value_bits as usize
    }

    /// Logical value with the schema bias removed.
    pub fn display_value(&self, def: &PropertyDef) -> i64 {
        i64::from(self.value) - i64::from(def.value_bias)
    }
}

/// Ordered property records plus the sentinel terminator offset. Record
/// spans are contiguous in parse order with the sentinel immediately after
/// the last record, so `sentinel_offset` is the single source of truth for
/// where the next record goes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyList {
    records: Vec<PropertyRecord>,
    sentinel_offset: usize,
}

impl PropertyList {
    /// Parse records starting at `start` until the 9-bit sentinel id.
    ///
    /// Unknown ids and short reads are fatal: either means corrupt data or
    /// an incomplete schema, and neither is guessed around.
    pub fn parse(bits: &BitString, start: usize, schema: &impl PropertySchema) -> Result<Self> {
        let mut r = BitReader::at(bits, start);
        let mut records = Vec::new();
        loop {
            let record_start = r.offset();
            let id = r.read_number(ID_BITS as usize)? as u16;
            if id == SENTINEL_ID {
                trace!("terminator at bit {record_start}, {} records", records.len());
                return Ok(Self {
                    records,
                    sentinel_offset: record_start,
                });
            }
            let def = schema
                .property(id)
                .ok_or(ItemModelError::UnknownProperty(id))?;
            def.check_widths()?;
            let param_bits = def.resolved_param_bits();
            let param = if param_bits > 0 {
                r.read_number(param_bits as usize)?
            } else {
                0
            };
            let value = r.read_number(def.value_bits as usize)?;
            trace!("property {id}: value={value}, param={param} @ bit {record_start}");
            records.push(PropertyRecord {
                id,
                value,
                param,
                bit_offset: record_start,
                param_bits,
                value_bits: def.value_bits,
            });
        }
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PropertyRecord> {
        self.records.get(index)
    }

    /// Stream offset of the sentinel's id field.
    pub fn sentinel_offset(&self) -> usize {
        self.sentinel_offset
    }

    /// Stream offset one past the sentinel (where a following runeword
    /// list begins).
    pub fn end_offset(&self) -> usize {
        self.sentinel_offset + ID_BITS as usize
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> Result<&mut PropertyRecord> {
        self.records
            .get_mut(index)
            .ok_or(ItemModelError::PropertyIndex(index))
    }

    /// New records always land immediately before the sentinel, which is
    /// last in parse order; appending keeps the list parse-ordered.
    pub(crate) fn push_record(&mut self, record: PropertyRecord) {
        debug_assert!(record.bit_offset <= self.sentinel_offset);
        self.records.push(record);
    }

    pub(crate) fn remove_record(&mut self, index: usize) -> Result<PropertyRecord> {
        if index >= self.records.len() {
            return Err(ItemModelError::PropertyIndex(index));
        }
        Ok(self.records.remove(index))
    }

    /// Offset bookkeeping for a splice-in of `width` bits at `point`:
    /// every record and the sentinel at `point` or beyond moves forward.
    pub(crate) fn shift_for_insert(&mut self, point: usize, width: usize) {
        for rec in &mut self.records {
            if rec.bit_offset >= point {
                rec.bit_offset += width;
            }
        }
        if self.sentinel_offset >= point {
            self.sentinel_offset += width;
        }
    }

    /// Offset bookkeeping for a splice-out of `width` bits at `point`:
    /// everything strictly past the removed span moves backward.
    pub(crate) fn shift_for_delete(&mut self, point: usize, width: usize) {
        for rec in &mut self.records {
            if rec.bit_offset > point {
                rec.bit_offset -= width;
            }
        }
        if self.sentinel_offset > point {
            self.sentinel_offset -= width;
        }
    }
}

/// Encode one record in wire order: id, parameter, value, each field
/// least-significant bit first in stream order. (Viewed through the
/// byte-reversal convention this is the `[value][param][id]` on-disk
/// order.)
pub(crate) fn encode_record(
    id: u16,
    value: u32,
    param: u32,
    param_bits: u8,
    value_bits: u8,
) -> Result<Vec<u8>> {
    let mut out =
        Vec::with_capacity(ID_BITS as usize + param_bits as usize + value_bits as usize);
    encode_field(&mut out, id.into(), ID_BITS)?;
    if param_bits > 0 {
        encode_field(&mut out, param, param_bits)?;
    }
    encode_field(&mut out, value, value_bits)?;
    Ok(out)
}
