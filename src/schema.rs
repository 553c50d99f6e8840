use ahash::AHashMap;

use crate::error::{ItemModelError, Result};

/// Width of every property-id field.
pub const ID_BITS: u8 = 9;

/// Reserved 9-bit all-ones id terminating a property record list. Never a
/// real property id.
pub const SENTINEL_ID: u16 = 0x1FF;

/// Property ids the header decoder resolves through the schema for
/// item-type-dependent fields.
pub const PROP_DEFENSE: u16 = 31;
pub const PROP_DURABILITY: u16 = 72;
pub const PROP_MAX_DURABILITY: u16 = 73;

/// Field widths and value bias for one property id. Externally owned
/// metadata; "no parameter" is an explicit `None`, resolved once at
/// schema-load time rather than re-parsed per access.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyDef {
    pub id: u16,
    /// Width of the value field; at most 32.
    pub value_bits: u8,
    /// Width of the normal parameter field, when the property carries one.
    pub param_bits: Option<u8>,
    /// Width of the save/runeword parameter field. Takes priority over
    /// `param_bits` when both are present.
    pub save_param_bits: Option<u8>,
    /// Added to the display value to get the stored form.
    pub value_bias: i32,
}

impl PropertyDef {
    /// Effective parameter width: save/runeword width first, then the
    /// normal width, otherwise no parameter.
    pub fn resolved_param_bits(&self) -> u8 {
        self.save_param_bits.or(self.param_bits).unwrap_or(0)
    }

    /// Total bits one record of this property occupies.
    pub fn record_bits(&self) -> usize {
        ID_BITS as usize + self.resolved_param_bits() as usize + self.value_bits as usize
    }

    /// Reject malformed metadata before any field of this width is read or
    /// encoded. Every field is carried as a `u32`, so 32 bits is the limit.
    pub fn check_widths(&self) -> Result<()> {
        if self.value_bits > 32 {
            return Err(ItemModelError::SchemaWidth {
                id: self.id,
                bits: self.value_bits,
            });
        }
        let param_bits = self.resolved_param_bits();
        if param_bits > 32 {
            return Err(ItemModelError::SchemaWidth {
                id: self.id,
                bits: param_bits,
            });
        }
        Ok(())
    }
}

/// Lookup by property id. Absence of an id is a hard error at every use
/// site, never defaulted around.
pub trait PropertySchema {
    fn property(&self, id: u16) -> Option<&PropertyDef>;
}

/// Item-type traits the header decoder needs to know which item-dependent
/// fields are present. Unknown codes resolve to no traits, matching the
/// metadata tables this mirrors.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeTraits {
    pub armor: bool,
    pub weapon: bool,
    pub stackable: bool,
}

pub trait ItemCatalog {
    /// Traits for a trimmed item-type code such as `"cm1"`.
    fn type_traits(&self, code: &str) -> TypeTraits;
}

/// In-memory [`PropertySchema`] for embedders and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySchema {
    defs: AHashMap<u16, PropertyDef>,
}

impl MemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs(defs: impl IntoIterator<Item = PropertyDef>) -> Self {
        Self {
            defs: defs.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    pub fn insert(&mut self, def: PropertyDef) {
        self.defs.insert(def.id, def);
    }
}

impl PropertySchema for MemorySchema {
    fn property(&self, id: u16) -> Option<&PropertyDef> {
        self.defs.get(&id)
    }
}

/// In-memory [`ItemCatalog`] keyed by trimmed type code.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    traits: AHashMap<Box<str>, TypeTraits>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: &str, traits: TypeTraits) {
        self.traits.insert(code.into(), traits);
    }
}

impl ItemCatalog for MemoryCatalog {
    fn type_traits(&self, code: &str) -> TypeTraits {
        self.traits.get(code).copied().unwrap_or_default()
    }
}
