use bitflags::bitflags;
use log::{debug, trace};
use smallvec::SmallVec;

use crate::bits::BitString;
use crate::error::{ItemModelError, Result};
use crate::reader::BitReader;
use crate::schema::{
    ItemCatalog, PROP_DEFENSE, PROP_DURABILITY, PROP_MAX_DURABILITY, PropertySchema,
};

bitflags! {
    /// Single-bit header flags. The on-disk flag block interleaves these
    /// with reserved bits; see [`decode_header`] for the exact walk.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct ItemFlags: u16 {
        const QUEST = 1 << 0;
        const IDENTIFIED = 1 << 1;
        const SOCKETED = 1 << 2;
        const EAR = 1 << 3;
        const STARTER = 1 << 4;
        const EXTENDED = 1 << 5;
        const ETHEREAL = 1 << 6;
        const PERSONALIZED = 1 << 7;
        const RUNEWORD = 1 << 8;
    }
}

#[cfg_attr(
    feature = "serde",
    derive(serde_repr::Serialize_repr, serde_repr::Deserialize_repr)
)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ItemQuality {
    LowQuality = 1,
    Normal = 2,
    HighQuality = 3,
    Magic = 4,
    Set = 5,
    Rare = 6,
    Unique = 7,
    Crafted = 8,
    Honorific = 9,
}

impl TryFrom<u8> for ItemQuality {
    type Error = ItemModelError;

    fn try_from(tag: u8) -> Result<Self> {
        Ok(match tag {
            1 => Self::LowQuality,
            2 => Self::Normal,
            3 => Self::HighQuality,
            4 => Self::Magic,
            5 => Self::Set,
            6 => Self::Rare,
            7 => Self::Unique,
            8 => Self::Crafted,
            9 => Self::Honorific,
            other => return Err(ItemModelError::UnknownQuality(other)),
        })
    }
}

/// 32-bit item-type tag: 4 packed 8-bit character codes, zero/space padded.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TypeCode(pub [u8; 4]);

impl TypeCode {
    /// The tag with padding stripped, e.g. `"cm1"`.
    pub fn trimmed(&self) -> String {
        self.0
            .iter()
            .filter(|&&c| c != 0)
            .map(|&c| char::from(c))
            .collect::<String>()
            .trim()
            .to_string()
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.trimmed())
    }
}

/// Quality-dependent extended sub-fields.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum QualityDetail {
    /// Normal quality carries no extra fields.
    Standard,
    /// Low/high quality: 3-bit variant tag.
    NonMagic { variant: u8 },
    /// Magic: 11-bit prefix and suffix affix ids.
    Magic { prefix: u16, suffix: u16 },
    /// Set and unique share one 15-bit combined id field.
    SetOrUnique { id: u16 },
    /// Rare and crafted: two 8-bit name ids plus up to six gated 11-bit
    /// affix ids (alternating prefix/suffix slots).
    RareLike {
        first_name: u8,
        second_name: u8,
        affixes: [Option<u16>; 6],
    },
    /// Honorific: 16-bit name id.
    Honorific { name_id: u16 },
}

/// Fields present only on extended items.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtendedView {
    pub socket_slots: u8,
    pub guid: u32,
    pub item_level: u8,
    pub quality: ItemQuality,
    /// 1-based variable-graphic index, when the presence bit is set.
    pub graphic_index: Option<u8>,
    pub auto_prefix: Option<u16>,
    pub detail: QualityDetail,
    pub runeword_code: Option<u16>,
    /// Personalization name: 7-bit character codes, zero-terminated on
    /// disk, at most 16.
    pub inscription: Option<SmallVec<u8, 16>>,
    pub defense: Option<i64>,
    pub max_durability: Option<i64>,
    pub durability: Option<i64>,
    pub quantity: Option<u16>,
    pub filled_sockets: Option<u8>,
    pub set_bonus_mask: Option<u8>,
}

/// Decoded header fields plus the resolved stream offset where property
/// parsing begins. Read-only once computed; mutations never touch header
/// fields.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeaderView {
    pub flags: ItemFlags,
    pub version: u8,
    pub location: u8,
    pub equipped_slot: u8,
    pub column: u8,
    pub row: u8,
    pub storage_page: u8,
    pub type_code: TypeCode,
    pub extended: Option<ExtendedView>,
    /// Absolute stream offset of the first property record id.
    pub property_start: usize,
}

impl HeaderView {
    pub fn is_extended(&self) -> bool {
        self.flags.contains(ItemFlags::EXTENDED)
    }

    pub fn is_runeword(&self) -> bool {
        self.flags.contains(ItemFlags::RUNEWORD)
    }
}

fn read_flag(r: &mut BitReader<'_>, flags: &mut ItemFlags, flag: ItemFlags) -> Result<()> {
    flags.set(flag, r.read_bool()?);
    Ok(())
}

/// Decode the item header and locate the property-region start offset.
///
/// The schema resolves the widths of the item-type-dependent
/// defense/durability fields through the well-known property ids; the
/// catalog says which of those fields exist for this item type. Any short
/// read makes the whole record unparseable.
pub fn decode_header(
    bits: &BitString,
    schema: &impl PropertySchema,
    catalog: &impl ItemCatalog,
) -> Result<HeaderView> {
    let mut r = BitReader::new(bits);
    let mut flags = ItemFlags::empty();

    read_flag(&mut r, &mut flags, ItemFlags::QUEST)?;
    r.skip(3)?;
    read_flag(&mut r, &mut flags, ItemFlags::IDENTIFIED)?;
    r.skip(6)?;
    read_flag(&mut r, &mut flags, ItemFlags::SOCKETED)?;
    r.skip(4)?;
    read_flag(&mut r, &mut flags, ItemFlags::EAR)?;
    read_flag(&mut r, &mut flags, ItemFlags::STARTER)?;
    r.skip(3)?;
    let simple = r.read_bool()?;
    flags.set(ItemFlags::EXTENDED, !simple);
    read_flag(&mut r, &mut flags, ItemFlags::ETHEREAL)?;
    r.skip(1)?;
    read_flag(&mut r, &mut flags, ItemFlags::PERSONALIZED)?;
    r.skip(1)?;
    read_flag(&mut r, &mut flags, ItemFlags::RUNEWORD)?;
    r.skip(5)?;

    let version = r.read_number(8)? as u8;
    r.skip(2)?;
    let location = r.read_number(3)? as u8;
    let equipped_slot = r.read_number(4)? as u8;
    let column = r.read_number(4)? as u8;
    let row = r.read_number(4)? as u8;
    let storage_page = r.read_number(3)? as u8;

    if flags.contains(ItemFlags::EAR) {
        return Err(ItemModelError::EarItem);
    }

    let mut tag = [0u8; 4];
    for c in &mut tag {
        *c = r.read_number(8)? as u8;
    }
    let type_code = TypeCode(tag);
    debug!(
        "item type {:?}, version {}, extended: {}",
        type_code.trimmed(),
        version,
        flags.contains(ItemFlags::EXTENDED)
    );

    let extended = if flags.contains(ItemFlags::EXTENDED) {
        Some(decode_extended(&mut r, &flags, &type_code, schema, catalog)?)
    } else {
        None
    };

    let property_start = r.offset();
    trace!("property region starts at bit {property_start}");

    Ok(HeaderView {
        flags,
        version,
        location,
        equipped_slot,
        column,
        row,
        storage_page,
        type_code,
        extended,
        property_start,
    })
}

fn decode_extended(
    r: &mut BitReader<'_>,
    flags: &ItemFlags,
    type_code: &TypeCode,
    schema: &impl PropertySchema,
    catalog: &impl ItemCatalog,
) -> Result<ExtendedView> {
    let socket_slots = r.read_number(3)? as u8;
    let guid = r.read_number(32)?;
    let item_level = r.read_number(7)? as u8;
    let quality = ItemQuality::try_from(r.read_number(4)? as u8)?;
    trace!("extended: sockets={socket_slots}, guid={guid:#010x}, ilvl={item_level}, quality={quality:?}");

    let graphic_index = if r.read_bool()? {
        Some(r.read_number(3)? as u8 + 1)
    } else {
        None
    };
    let auto_prefix = if r.read_bool()? {
        Some(r.read_number(11)? as u16)
    } else {
        None
    };

    let detail = match quality {
        ItemQuality::Normal => QualityDetail::Standard,
        ItemQuality::LowQuality | ItemQuality::HighQuality => QualityDetail::NonMagic {
            variant: r.read_number(3)? as u8,
        },
        ItemQuality::Magic => QualityDetail::Magic {
            prefix: r.read_number(11)? as u16,
            suffix: r.read_number(11)? as u16,
        },
        ItemQuality::Set | ItemQuality::Unique => QualityDetail::SetOrUnique {
            id: r.read_number(15)? as u16,
        },
        ItemQuality::Rare | ItemQuality::Crafted => {
            let first_name = r.read_number(8)? as u8;
            let second_name = r.read_number(8)? as u8;
            let mut affixes = [None; 6];
            for slot in &mut affixes {
                if r.read_bool()? {
                    *slot = Some(r.read_number(11)? as u16);
                }
            }
            QualityDetail::RareLike {
                first_name,
                second_name,
                affixes,
            }
        }
        ItemQuality::Honorific => QualityDetail::Honorific {
            name_id: r.read_number(16)? as u16,
        },
    };

    let runeword_code = if flags.contains(ItemFlags::RUNEWORD) {
        Some(r.read_number(16)? as u16)
    } else {
        None
    };

    let inscription = if flags.contains(ItemFlags::PERSONALIZED) {
        let mut name: SmallVec<u8, 16> = SmallVec::new();
        for _ in 0..16 {
            let code = r.read_number(7)? as u8;
            if code == 0 {
                break;
            }
            name.push(code);
        }
        Some(name)
    } else {
        None
    };

    // Reserved tome-of-identify bit, always present.
    r.skip(1)?;

    let traits = catalog.type_traits(&type_code.trimmed());
    let mut defense = None;
    if traits.armor {
        let def = schema
            .property(PROP_DEFENSE)
            .ok_or(ItemModelError::UnknownProperty(PROP_DEFENSE))?;
        def.check_widths()?;
        let raw = r.read_number(def.value_bits as usize)?;
        defense = Some(i64::from(raw) - i64::from(def.value_bias));
    }

    let mut max_durability = None;
    let mut durability = None;
    if traits.armor || traits.weapon {
        let def = schema
            .property(PROP_MAX_DURABILITY)
            .ok_or(ItemModelError::UnknownProperty(PROP_MAX_DURABILITY))?;
        def.check_widths()?;
        let raw = r.read_number(def.value_bits as usize)?;
        let mut max = i64::from(raw) - i64::from(def.value_bias);
        if max > 0 {
            let def = schema
                .property(PROP_DURABILITY)
                .ok_or(ItemModelError::UnknownProperty(PROP_DURABILITY))?;
            def.check_widths()?;
            let raw = r.read_number(def.value_bits as usize)?;
            let cur = i64::from(raw) - i64::from(def.value_bias);
            if max < cur {
                max = cur;
            }
            durability = Some(cur);
        }
        max_durability = Some(max);
    }

    let quantity = if traits.stackable {
        Some(r.read_number(9)? as u16)
    } else {
        None
    };

    let filled_sockets = if flags.contains(ItemFlags::SOCKETED) {
        Some(r.read_number(4)? as u8)
    } else {
        None
    };

    let set_bonus_mask = if quality == ItemQuality::Set {
        Some(r.read_number(5)? as u8)
    } else {
        None
    };

    Ok(ExtendedView {
        socket_slots,
        guid,
        item_level,
        quality,
        graphic_index,
        auto_prefix,
        detail,
        runeword_code,
        inscription,
        defense,
        max_durability,
        durability,
        quantity,
        filled_sockets,
        set_bonus_mask,
    })
}
