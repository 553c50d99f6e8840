use thiserror::Error;

pub type Result<T, E = ItemModelError> = std::result::Result<T, E>;

/// Error taxonomy for the codec. Parse-side failures (`Bounds`,
/// `InvalidSignature`, `UnknownProperty`, `UnknownQuality`, `EarItem`) are
/// always fatal: truncated or unrecognized input is corrupt data and is
/// never guessed around. Mutation-side failures (`ValueRange`, `ParamRange`,
/// `WidthMismatch`) are raised before any bit is touched, so a failed
/// mutation leaves the item unchanged.
#[derive(Debug, Error)]
pub enum ItemModelError {
    #[error("bit range out of bounds: wanted {want} bits at offset {offset}, {available} available")]
    Bounds {
        offset: usize,
        want: usize,
        available: usize,
    },
    #[error("missing or invalid JM signature")]
    InvalidSignature,
    #[error("unknown property id: {0}")]
    UnknownProperty(u16),
    #[error("unknown item quality tag: {0}")]
    UnknownQuality(u8),
    #[error("ear records carry no property region")]
    EarItem,
    #[error("property id {0} is reserved for the record terminator")]
    ReservedPropertyId(u16),
    #[error("stored value {value} does not fit in {bits} bits for property {id}")]
    ValueRange { id: u16, value: i64, bits: u8 },
    #[error("parameter {param} does not fit in {bits} bits for property {id}")]
    ParamRange { id: u16, param: u32, bits: u8 },
    #[error("re-encoded width {new_bits} differs from stored width {old_bits} for property {id}")]
    WidthMismatch {
        id: u16,
        old_bits: usize,
        new_bits: usize,
    },
    #[error("schema width {bits} for property {id} exceeds the 32-bit field limit")]
    SchemaWidth { id: u16, bits: u8 },
    #[error("value {value} does not fit in a {bits}-bit field")]
    Encoding { value: u32, bits: u8 },
    #[error("bit stream is not sentinel-terminated at offset {offset}")]
    MissingSentinel { offset: usize },
    #[error("set bits found past the record terminator")]
    DirtyPadding,
    #[error("invalid property index: {0}")]
    PropertyIndex(usize),
    #[error("item carries no runeword property list")]
    NoRunewordList,
}
