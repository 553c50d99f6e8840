//! Test-only helpers for writing synthetic item records field by field.

use crate::header::ItemQuality;
use crate::schema::{MemoryCatalog, MemorySchema, PropertyDef, TypeTraits};
use crate::writer::BitWriter;

/// Schema shared by the unit tests. Widths and biases are arbitrary but
/// fixed; `write_header` encodes against the same numbers.
pub fn test_schema() -> MemorySchema {
    MemorySchema::from_defs([
        // Defense, max durability, current durability: the well-known ids.
        PropertyDef {
            id: crate::PROP_DEFENSE,
            value_bits: 11,
            param_bits: None,
            save_param_bits: None,
            value_bias: 10,
        },
        PropertyDef {
            id: crate::PROP_MAX_DURABILITY,
            value_bits: 8,
            param_bits: None,
            save_param_bits: None,
            value_bias: 0,
        },
        PropertyDef {
            id: crate::PROP_DURABILITY,
            value_bits: 8,
            param_bits: None,
            save_param_bits: None,
            value_bias: 0,
        },
        // A plain biased stat.
        PropertyDef {
            id: 7,
            value_bits: 12,
            param_bits: None,
            save_param_bits: None,
            value_bias: 32,
        },
        // An unbiased stat.
        PropertyDef {
            id: 16,
            value_bits: 9,
            param_bits: None,
            save_param_bits: None,
            value_bias: 0,
        },
        // A skill-like stat where the save parameter width wins.
        PropertyDef {
            id: 97,
            value_bits: 6,
            param_bits: Some(10),
            save_param_bits: Some(9),
            value_bias: 0,
        },
        // A stat with only the normal parameter width.
        PropertyDef {
            id: 204,
            value_bits: 8,
            param_bits: Some(16),
            save_param_bits: None,
            value_bias: 0,
        },
    ])
}

pub fn test_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.insert(
        "xap",
        TypeTraits {
            armor: true,
            weapon: false,
            stackable: false,
        },
    );
    catalog.insert(
        "gsd",
        TypeTraits {
            armor: false,
            weapon: true,
            stackable: false,
        },
    );
    catalog.insert(
        "key",
        TypeTraits {
            armor: false,
            weapon: false,
            stackable: true,
        },
    );
    catalog
}

/// Knobs for one synthetic header. Defaults give a minimal extended,
/// normal-quality charm with an empty property region.
pub struct HeaderSpec {
    pub extended: bool,
    pub ear: bool,
    pub socketed: bool,
    pub runeword: bool,
    pub runeword_code: u16,
    pub type_code: [u8; 4],
    pub socket_slots: u8,
    pub guid: u32,
    pub item_level: u8,
    pub quality: ItemQuality,
    pub magic_affixes: Option<(u16, u16)>,
    pub set_or_unique_id: u16,
    pub rare_names: (u8, u8),
    pub rare_affixes: [Option<u16>; 6],
    pub honorific_name: u16,
    pub nonmagic_variant: u8,
    pub inscription: Option<Vec<u8>>,
    pub defense: Option<i64>,
    pub max_durability: Option<i64>,
    pub durability: Option<i64>,
    pub quantity: Option<u16>,
    pub filled_sockets: u8,
    pub set_bonus_mask: u8,
}

impl Default for HeaderSpec {
    fn default() -> Self {
        Self {
            extended: true,
            ear: false,
            socketed: false,
            runeword: false,
            runeword_code: 53,
            type_code: *b"cm1 ",
            socket_slots: 0,
            guid: 0x0102_0304,
            item_level: 7,
            quality: ItemQuality::Normal,
            magic_affixes: None,
            set_or_unique_id: 0,
            rare_names: (0, 0),
            rare_affixes: [None; 6],
            honorific_name: 0,
            nonmagic_variant: 0,
            inscription: None,
            defense: None,
            max_durability: None,
            durability: None,
            quantity: None,
            filled_sockets: 1,
            set_bonus_mask: 0,
        }
    }
}

/// Write a full header per `spec`, mirroring the decoder's field walk.
/// Returns the stream offset where the property region begins.
pub fn write_header(w: &mut BitWriter, spec: &HeaderSpec) -> usize {
    // Flag block: 32 bits with reserved gaps.
    w.push_bool(false); // quest
    w.push_number(0, 3).unwrap();
    w.push_bool(true); // identified
    w.push_number(0, 6).unwrap();
    w.push_bool(spec.socketed);
    w.push_number(0, 4).unwrap();
    w.push_bool(spec.ear);
    w.push_bool(false); // starter
    w.push_number(0, 3).unwrap();
    w.push_bool(!spec.extended); // simple
    w.push_bool(false); // ethereal
    w.push_bool(false);
    w.push_bool(spec.inscription.is_some());
    w.push_bool(false);
    w.push_bool(spec.runeword);
    w.push_number(0, 5).unwrap();

    w.push_number(101, 8).unwrap(); // version
    w.push_number(0, 2).unwrap();
    w.push_number(0, 3).unwrap(); // location
    w.push_number(0, 4).unwrap(); // equipped slot
    w.push_number(0, 4).unwrap(); // column
    w.push_number(0, 4).unwrap(); // row
    w.push_number(0, 3).unwrap(); // storage page

    if spec.ear {
        return w.len();
    }
    w.push_byte_str(&spec.type_code);

    if !spec.extended {
        return w.len();
    }

    w.push_number(spec.socket_slots.into(), 3).unwrap();
    w.push_number(spec.guid, 32).unwrap();
    w.push_number(spec.item_level.into(), 7).unwrap();
    w.push_number(spec.quality as u32, 4).unwrap();
    w.push_bool(false); // no variable graphic
    w.push_bool(false); // no auto-prefix

    match spec.quality {
        ItemQuality::Normal => {}
        ItemQuality::LowQuality | ItemQuality::HighQuality => {
            w.push_number(spec.nonmagic_variant.into(), 3).unwrap();
        }
        ItemQuality::Magic => {
            let (prefix, suffix) = spec.magic_affixes.unwrap_or_default();
            w.push_number(prefix.into(), 11).unwrap();
            w.push_number(suffix.into(), 11).unwrap();
        }
        ItemQuality::Set | ItemQuality::Unique => {
            w.push_number(spec.set_or_unique_id.into(), 15).unwrap();
        }
        ItemQuality::Rare | ItemQuality::Crafted => {
            w.push_number(spec.rare_names.0.into(), 8).unwrap();
            w.push_number(spec.rare_names.1.into(), 8).unwrap();
            for affix in spec.rare_affixes {
                match affix {
                    Some(id) => {
                        w.push_bool(true);
                        w.push_number(id.into(), 11).unwrap();
                    }
                    None => w.push_bool(false),
                }
            }
        }
        ItemQuality::Honorific => {
            w.push_number(spec.honorific_name.into(), 16).unwrap();
        }
    }

    if spec.runeword {
        w.push_number(spec.runeword_code.into(), 16).unwrap();
    }
    if let Some(name) = &spec.inscription {
        for &code in name {
            w.push_number(code.into(), 7).unwrap();
        }
        if name.len() < 16 {
            w.push_number(0, 7).unwrap();
        }
    }
    w.push_bool(false); // tome-of-identify bit

    if let Some(defense) = spec.defense {
        w.push_number((defense + 10) as u32, 11).unwrap();
    }
    if let Some(max) = spec.max_durability {
        w.push_number(max as u32, 8).unwrap();
        if max > 0 {
            w.push_number(spec.durability.unwrap_or(max) as u32, 8).unwrap();
        }
    }
    if let Some(quantity) = spec.quantity {
        w.push_number(quantity.into(), 9).unwrap();
    }
    if spec.socketed {
        w.push_number(spec.filled_sockets.into(), 4).unwrap();
    }
    if spec.quality == ItemQuality::Set {
        w.push_number(spec.set_bonus_mask.into(), 5).unwrap();
    }

    w.len()
}

/// Append one property record in wire order: id, then parameter, then
/// value, each least-significant bit first in stream order.
pub fn write_property(w: &mut BitWriter, id: u16, stored_value: u32, param: u32, def: &PropertyDef) {
    w.push_number(id.into(), crate::ID_BITS).unwrap();
    let param_bits = def.resolved_param_bits();
    if param_bits > 0 {
        w.push_number(param, param_bits).unwrap();
    }
    w.push_number(stored_value, def.value_bits).unwrap();
}
