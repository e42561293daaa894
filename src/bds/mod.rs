//! Mode S Comm-B Data Selector (BDS) register sub-decoders, invoked by
//! CAT048 Item I048/250 (spec.md §4.4).
//!
//! Each register is a fixed 56-bit (7 octet) message whose sub-layout is
//! identified by a BDS code carried alongside it in the ASTERIX item (not
//! inferred by typecode heuristics, unlike raw Mode S Comm-B replies where
//! the code is never explicitly declared).

pub mod bds40;
pub mod bds50;
pub mod bds60;

use crate::bitcursor::BitCursor;
use crate::error::DecodeError;

/// One decoded Mode S register embedded in I048/250.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BdsRegister {
    /// BDS code as a two-digit string, e.g. "40" for BDS 4,0 (spec.md
    /// §4.4: "ModeS field accumulates the register code (e.g., "40 50
    /// 60")").
    pub code: String,
    pub bds40: Option<bds40::SelectedVerticalIntention>,
    pub bds50: Option<bds50::TrackAndTurnReport>,
    pub bds60: Option<bds60::HeadingAndSpeedReport>,
}

/// Decodes one 7-octet MB register given its declared BDS1/BDS2 nibbles.
/// Unrecognized codes are left with all sub-fields `None` (the 7 octets
/// have already been consumed by the caller); the caller is responsible
/// for recording the code in the `ModeS` output field regardless.
pub fn decode_register(
    mb: &[u8; 7],
    bds1: u8,
    bds2: u8,
) -> Result<(BdsRegister, Vec<DecodeError>), DecodeError> {
    let code = format!("{bds1:x}{bds2:x}");
    let mut register = BdsRegister {
        code: code.clone(),
        ..Default::default()
    };
    let mut diagnostics = Vec::new();

    if mb.iter().all(|&b| b == 0) {
        // "present but empty": the code is reported, no derived fields.
        return Ok((register, diagnostics));
    }

    match (bds1, bds2) {
        (4, 0) => {
            let mut cursor = BitCursor::new(mb);
            let (fields, diags) = bds40::decode(&mut cursor)?;
            register.bds40 = Some(fields);
            diagnostics.extend(diags);
        }
        (5, 0) => {
            let mut cursor = BitCursor::new(mb);
            let (fields, diags) = bds50::decode(&mut cursor)?;
            register.bds50 = Some(fields);
            diagnostics.extend(diags);
        }
        (6, 0) => {
            let mut cursor = BitCursor::new(mb);
            let (fields, diags) = bds60::decode(&mut cursor)?;
            register.bds60 = Some(fields);
            diagnostics.extend(diags);
        }
        _ => {
            // Other BDS codes: skip (already consumed by caller), only
            // the register code itself is retained.
        }
    }

    Ok((register, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_all_status_bits_zero_is_present_but_empty() {
        let mb: [u8; 7] = [0, 0, 0, 0, 0, 0, 0];
        let (reg, diags) = decode_register(&mb, 5, 0).unwrap();
        assert_eq!(reg.code, "50");
        assert!(reg.bds50.is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn unknown_bds_code_keeps_only_code() {
        let mb: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];
        let (reg, _) = decode_register(&mb, 1, 7).unwrap();
        assert_eq!(reg.code, "17");
        assert!(reg.bds40.is_none());
        assert!(reg.bds50.is_none());
        assert!(reg.bds60.is_none());
    }
}
