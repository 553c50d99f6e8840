use log::debug;

use crate::assemble::assemble;
use crate::bits::BitString;
use crate::error::{ItemModelError, Result};
use crate::header::{HeaderView, decode_header};
use crate::property::{PropertyList, PropertyRecord, encode_record};
use crate::schema::{ItemCatalog, PropertyDef, PropertySchema, SENTINEL_ID};

/// Which of an item's property lists a mutation targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PropertyClass {
    Item,
    Runeword,
}

/// One parse/edit session over a single item record. Owns the normalized
/// bit stream and the decoded views exclusively; every mutation validates
/// completely before touching a bit, so a failed call leaves the item
/// exactly as it was.
#[derive(Clone, Debug)]
pub struct Item {
    bits: BitString,
    header: HeaderView,
    properties: PropertyList,
    runeword_properties: Option<PropertyList>,
}

impl Item {
    /// Parse a full `JM`-prefixed item buffer.
    pub fn parse(
        data: &[u8],
        schema: &impl PropertySchema,
        catalog: &impl ItemCatalog,
    ) -> Result<Self> {
        Self::from_bits(BitString::from_d2i(data)?, schema, catalog)
    }

    /// Parse an already-normalized stream (e.g. one built from scratch).
    pub fn from_bits(
        bits: BitString,
        schema: &impl PropertySchema,
        catalog: &impl ItemCatalog,
    ) -> Result<Self> {
        let header = decode_header(&bits, schema, catalog)?;
        let properties = PropertyList::parse(&bits, header.property_start, schema)?;
        let runeword_properties = if header.is_runeword() {
            Some(PropertyList::parse(&bits, properties.end_offset(), schema)?)
        } else {
            None
        };
        Ok(Self {
            bits,
            header,
            properties,
            runeword_properties,
        })
    }

    pub fn header(&self) -> &HeaderView {
        &self.header
    }

    pub fn bits(&self) -> &BitString {
        &self.bits
    }

    pub fn properties(&self) -> &PropertyList {
        &self.properties
    }

    pub fn runeword_properties(&self) -> Option<&PropertyList> {
        self.runeword_properties.as_ref()
    }

    fn list(&self, class: PropertyClass) -> Result<&PropertyList> {
        match class {
            PropertyClass::Item => Ok(&self.properties),
            PropertyClass::Runeword => self
                .runeword_properties
                .as_ref()
                .ok_or(ItemModelError::NoRunewordList),
        }
    }

    fn list_mut(&mut self, class: PropertyClass) -> Result<&mut PropertyList> {
        match class {
            PropertyClass::Item => Ok(&mut self.properties),
            PropertyClass::Runeword => self
                .runeword_properties
                .as_mut()
                .ok_or(ItemModelError::NoRunewordList),
        }
    }

    /// Insert a record immediately before the target list's sentinel.
    /// `display_value` is the logical value; the schema bias is applied
    /// before range checking. Returns the record's index in parse order
    /// (always last). Values and parameters that do not fit their widths
    /// are rejected without mutating anything.
    pub fn insert_property(
        &mut self,
        schema: &impl PropertySchema,
        class: PropertyClass,
        id: u16,
        display_value: i64,
        param: u32,
    ) -> Result<usize> {
        if id >= SENTINEL_ID {
            return Err(ItemModelError::ReservedPropertyId(id));
        }
        let def = schema
            .property(id)
            .ok_or(ItemModelError::UnknownProperty(id))?;
        def.check_widths()?;
        let param_bits = def.resolved_param_bits();
        let stored = checked_stored_value(def, display_value)?;
        check_param(def.id, param, param_bits)?;
        let encoded = encode_record(id, stored, param, param_bits, def.value_bits)?;
        let at = self.list(class)?.sentinel_offset();

        self.bits.splice_in(at, &encoded)?;
        let width = encoded.len();
        self.properties.shift_for_insert(at, width);
        if let Some(rw) = &mut self.runeword_properties {
            rw.shift_for_insert(at, width);
        }
        let list = self.list_mut(class)?;
        let index = list.len();
        list.push_record(PropertyRecord {
            id,
            value: stored,
            param,
            bit_offset: at,
            param_bits,
            value_bits: def.value_bits,
        });
        debug!("inserted property {id} at bit {at} ({width} bits)");
        Ok(index)
    }

    /// Overwrite the record at `index` in place. `None` keeps a field's
    /// current value. The freshly encoded record must occupy exactly the
    /// recorded width; a differing schema is rejected before any bit is
    /// overwritten.
    pub fn modify_property(
        &mut self,
        schema: &impl PropertySchema,
        class: PropertyClass,
        index: usize,
        new_value: Option<i64>,
        new_param: Option<u32>,
    ) -> Result<()> {
        let record = self
            .list(class)?
            .get(index)
            .ok_or(ItemModelError::PropertyIndex(index))?;
        let def = schema
            .property(record.id)
            .ok_or(ItemModelError::UnknownProperty(record.id))?;
        def.check_widths()?;
        let param_bits = def.resolved_param_bits();
        let new_width = def.record_bits();
        if new_width != record.width() {
            return Err(ItemModelError::WidthMismatch {
                id: record.id,
                old_bits: record.width(),
                new_bits: new_width,
            });
        }
        let display = new_value.unwrap_or_else(|| record.display_value(def));
        let stored = checked_stored_value(def, display)?;
        let param = new_param.unwrap_or(record.param);
        check_param(def.id, param, param_bits)?;
        let encoded = encode_record(record.id, stored, param, param_bits, def.value_bits)?;
        let offset = record.bit_offset;

        self.bits.overwrite(offset, &encoded)?;
        let record = self.list_mut(class)?.record_mut(index)?;
        record.value = stored;
        record.param = param;
        debug!("modified property {} at bit {offset}", record.id);
        Ok(())
    }

    /// Remove the record at `index`, splicing its span out of the stream.
    pub fn delete_property(&mut self, class: PropertyClass, index: usize) -> Result<PropertyRecord> {
        let record = self
            .list(class)?
            .get(index)
            .ok_or(ItemModelError::PropertyIndex(index))?;
        let (point, width) = (record.bit_offset, record.width());

        self.bits.splice_out(point, width)?;
        let removed = self.list_mut(class)?.remove_record(index)?;
        self.properties.shift_for_delete(point, width);
        if let Some(rw) = &mut self.runeword_properties {
            rw.shift_for_delete(point, width);
        }
        debug!("deleted property {} from bit {point} ({width} bits)", removed.id);
        Ok(removed)
    }

    /// Serialize back to a `JM`-prefixed buffer, padding after the final
    /// terminator. Untouched regions reproduce byte-exactly.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let last = self
            .runeword_properties
            .as_ref()
            .unwrap_or(&self.properties)
            .sentinel_offset();
        assemble(&self.bits, last)
    }
}

fn checked_stored_value(def: &PropertyDef, display_value: i64) -> Result<u32> {
    let stored = display_value
        .checked_add(i64::from(def.value_bias))
        .ok_or(ItemModelError::ValueRange {
            id: def.id,
            value: display_value,
            bits: def.value_bits,
        })?;
    let max = if def.value_bits >= 32 {
        u32::MAX as i64
    } else {
        (1i64 << def.value_bits) - 1
    };
    if stored < 0 || stored > max {
        return Err(ItemModelError::ValueRange {
            id: def.id,
            value: stored,
            bits: def.value_bits,
        });
    }
    Ok(stored as u32)
}

fn check_param(id: u16, param: u32, param_bits: u8) -> Result<()> {
    let fits = match param_bits {
        0 => param == 0,
        bits if bits >= 32 => true,
        bits => param < 1u32 << bits,
    };
    if !fits {
        return Err(ItemModelError::ParamRange {
            id,
            param,
            bits: param_bits,
        });
    }
    Ok(())
}
