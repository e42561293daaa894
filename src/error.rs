//! Error kinds for ASTERIX decoding (spec.md §7).
//!
//! Every fallible operation in the crate returns `Result<T, DecodeError>`.
//! The pipeline converts a `DecodeError` plus the byte offset at which it
//! was raised into a [`crate::pipeline::Diagnostic`] for non-strict callers.

use thiserror::Error;

/// The exhaustive set of error kinds a decode can raise.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Block framing: LEN extends beyond the remaining input.
    #[error("short block: declared length {len} exceeds {available} remaining bytes")]
    ShortBlock { len: usize, available: usize },

    /// Block framing: LEN < 3.
    #[error("bad length: {len} (must be >= 3)")]
    BadLength { len: usize },

    /// Block framing: CAT is neither 21 nor 48.
    #[error("unsupported category: {category}")]
    UnsupportedCategory { category: u8 },

    /// FSPEC: more octets chained than the category's FRN budget allows.
    #[error("unterminated FSPEC after {octets} octets (max FRN {max_frn})")]
    FspecUnterminated { octets: usize, max_frn: usize },

    /// FSPEC: first octet is all zero with FX=0 (no items present).
    #[error("empty FSPEC")]
    FspecEmpty,

    /// FSPEC: a presence bit set an FRN with no known codec.
    #[error("unknown FRN {frn} for category {category}")]
    UnknownFrn { frn: usize, category: u8 },

    /// A codec ran out of bits.
    #[error("truncated: needed {needed} more bits, {available} available")]
    Truncated { needed: usize, available: usize },

    /// A decoded value violates a semantic constraint (e.g. |lat| > 90).
    #[error("item out of range: {detail}")]
    ItemOutOfRange { detail: String },

    /// A BDS sub-field is outside its defined range.
    #[error("BDS field out of range: {detail}")]
    BdsFieldOutOfRange { detail: String },

    /// The inverse ECEF projection failed to converge.
    #[error("coordinate inverse projection did not converge within {iterations} iterations")]
    CoordConvergence { iterations: u32 },
}

impl DecodeError {
    /// Short machine-readable tag, used by [`crate::pipeline::Diagnostic`].
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::ShortBlock { .. } => "SHORT_BLOCK",
            DecodeError::BadLength { .. } => "BAD_LENGTH",
            DecodeError::UnsupportedCategory { .. } => "UNSUPPORTED_CATEGORY",
            DecodeError::FspecUnterminated { .. } => "FSPEC_UNTERMINATED",
            DecodeError::FspecEmpty => "FSPEC_EMPTY",
            DecodeError::UnknownFrn { .. } => "UNKNOWN_FRN",
            DecodeError::Truncated { .. } => "TRUNCATED",
            DecodeError::ItemOutOfRange { .. } => "ITEM_OUT_OF_RANGE",
            DecodeError::BdsFieldOutOfRange { .. } => "BDS_FIELD_OUT_OF_RANGE",
            DecodeError::CoordConvergence { .. } => "COORD_CONVERGENCE",
        }
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
