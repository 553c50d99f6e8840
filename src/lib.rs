//! Strongly-typed data model for D2I item records.
//!
//! A `.d2i` file is a two-byte `JM` signature followed by a bit-packed
//! payload. Internally every payload is normalized into a [`BitString`] in
//! stream order (each byte contributes its bits least-significant first),
//! which makes the on-disk byte-reversal convention disappear: parsing is a
//! single forward cursor walk and every recorded offset is an absolute bit
//! position in that stream.
//!
//! Layered bottom-up:
//! 1. [`bits`]/[`reader`]/[`writer`]: normalization and cursor primitives.
//! 2. [`schema`]: externally supplied property definitions and type traits.
//! 3. [`header`]: the fixed-then-conditional header field walk.
//! 4. [`property`]: terminated property record lists with exact bit spans.
//! 5. [`item`]: a parse/edit session tying the above together, with
//!    validate-then-mutate insert/modify/delete and lossless reassembly.

pub mod assemble;
pub mod bits;
pub mod error;
pub mod header;
pub mod item;
pub mod property;
pub mod reader;
pub mod schema;
pub mod writer;

#[cfg(test)]
pub(crate) mod testutil;

pub use assemble::assemble;
pub use bits::{BitString, MAGIC};
pub use error::{ItemModelError, Result};
pub use header::{
    ExtendedView, HeaderView, ItemFlags, ItemQuality, QualityDetail, TypeCode, decode_header,
};
pub use item::{Item, PropertyClass};
pub use property::{PropertyList, PropertyRecord};
pub use reader::BitReader;
pub use schema::{
    ID_BITS, ItemCatalog, MemoryCatalog, MemorySchema, PROP_DEFENSE, PROP_DURABILITY,
    PROP_MAX_DURABILITY, PropertyDef, PropertySchema, SENTINEL_ID, TypeTraits,
};
pub use writer::BitWriter;
