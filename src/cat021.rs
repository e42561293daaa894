//! Category 021 (ADS-B target reports) decoder (spec.md §4.3, CAT021 half).
//!
//! CAT021 positions arrive already in WGS-84 geographic coordinates (no
//! [`crate::geo::CoordinateTransformer`] involved — that's CAT048's polar
//! observations needing projection), so a decoded record is assembled
//! directly from the item codecs with no derived-field stage.

use crate::bitcursor::BitCursor;
use crate::error::DecodeError;
use crate::fspec;
use crate::items;
use crate::record::UnifiedRecord;

/// Highest FRN defined for CAT021 (spec.md §3 invariants: "14 FRNs for
/// CAT021").
pub const MAX_FRN: usize = 14;

const FRN_DATA_SOURCE_ID: usize = 1;
const FRN_TARGET_ADDRESS: usize = 2;
const FRN_TARGET_IDENTIFICATION: usize = 3;
const FRN_POSITION: usize = 4;
const FRN_TIME_OF_DAY: usize = 5;
const FRN_MODE_3A: usize = 6;
const FRN_TRACK_NUMBER: usize = 7;
const FRN_EMITTER_CATEGORY: usize = 8;
const FRN_TARGET_REPORT_DESCRIPTOR: usize = 9;

/// LSB of each WGS-84 position coordinate, degrees (spec.md §4.3: "signed
/// fractions of 180°/2^23").
const POSITION_LSB_DEG: f64 = 180.0 / 8_388_608.0; // 2^23

/// Decodes every record packed into a CAT021 block payload.
pub fn decode_records(payload: &[u8]) -> (Vec<UnifiedRecord>, Vec<DecodeError>) {
    let mut cursor = BitCursor::new(payload);
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    while cursor.remaining_bits() >= 8 {
        match decode_one_record(&mut cursor) {
            Ok((record, mut diags)) => {
                records.push(record);
                diagnostics.append(&mut diags);
            }
            Err(err) => {
                diagnostics.push(err);
                break;
            }
        }
    }

    (records, diagnostics)
}

fn decode_one_record(
    cursor: &mut BitCursor,
) -> Result<(UnifiedRecord, Vec<DecodeError>), DecodeError> {
    let fspec_result = fspec::parse(cursor, MAX_FRN)?;
    let mut record = UnifiedRecord {
        cat: Some(21),
        ..Default::default()
    };
    let mut diagnostics = Vec::new();

    for frn in fspec_result.frns {
        match frn {
            FRN_DATA_SOURCE_ID => {
                record.sac = Some(cursor.read_octet()?);
                record.sic = Some(cursor.read_octet()?);
            }
            FRN_TARGET_ADDRESS => {
                record.target_address = Some(items::decode_target_address(cursor)?);
            }
            FRN_TARGET_IDENTIFICATION => {
                record.target_identification = Some(items::decode_target_identification(cursor)?);
            }
            FRN_POSITION => {
                let lat_raw = cursor.read_i64(24)?;
                let lon_raw = cursor.read_i64(24)?;
                let lat = lat_raw as f64 * POSITION_LSB_DEG;
                let lon = lon_raw as f64 * POSITION_LSB_DEG;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(DecodeError::ItemOutOfRange {
                        detail: format!("CAT021 latitude {lat} outside [-90, 90]"),
                    });
                }
                record.latitude = Some(lat);
                record.longitude = Some(normalize_longitude(lon));
            }
            FRN_TIME_OF_DAY => {
                let seconds = items::decode_time_of_day(cursor)?;
                record.time_sec = Some(seconds);
                record.time_str = Some(items::format_time_str(seconds));
            }
            FRN_MODE_3A => {
                let m = items::decode_mode3a(cursor)?;
                record.mode3a = Some(m.code);
                record.mode3a_v = Some(m.v);
                record.mode3a_g = Some(m.g);
                record.mode3a_l = Some(m.l);
            }
            FRN_TRACK_NUMBER => {
                record.track_number = Some(cursor.read_u64(16)? as u16);
            }
            FRN_EMITTER_CATEGORY => {
                record.emitter_category = Some(cursor.read_octet()?);
            }
            FRN_TARGET_REPORT_DESCRIPTOR => {
                let octet = cursor.read_octet()?;
                record.rc = Some(octet & 0x80 != 0);
                record.dcr = Some(octet & 0x40 != 0);
                record.gbs = Some(octet & 0x20 != 0);
                let atp = (octet >> 2) & 0x7;
                let arc = octet & 0x3;
                record.atp = Some(atp_label(atp).to_string());
                record.arc = Some(arc_label(arc).to_string());
            }
            other => {
                return Err(DecodeError::UnknownFrn {
                    frn: other,
                    category: 21,
                });
            }
        }
    }

    Ok((record, diagnostics))
}

fn normalize_longitude(lon: f64) -> f64 {
    let mut lon = lon % 360.0;
    if lon >= 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }
    lon
}

fn atp_label(code: u8) -> &'static str {
    match code {
        0 => "24-bit ICAO address",
        1 => "Duplicate address",
        2 => "Surface vehicle address",
        3 => "Anonymous address",
        _ => "Reserved",
    }
}

fn arc_label(code: u8) -> &'static str {
    match code {
        0 => "25 ft",
        1 => "100 ft",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_empty_payload_yields_no_records() {
        let (records, diags) = decode_records(&[]);
        assert!(records.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn s3_target_identification_decodes_callsign() {
        // FSPEC: FRN3 only (bit7 of first octet), FX=0.
        let mut data = vec![0b0010_0000u8];
        let codes: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut packed = [0u8; 6];
        let mut bitpos = 0usize;
        for &code in &codes {
            for b in (0..6).rev() {
                if (code >> b) & 1 != 0 {
                    packed[bitpos / 8] |= 0x80 >> (bitpos % 8);
                }
                bitpos += 1;
            }
        }
        data.extend_from_slice(&packed);

        let (records, diags) = decode_records(&data);
        assert!(diags.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target_identification.as_deref(), Some("ABCDEFGH"));
        assert_eq!(records[0].cat, Some(21));
    }

    #[test]
    fn unknown_frn_aborts_record_with_diagnostic() {
        // FRN 14 set: bit corresponding to FRN14 is in the 2nd FSPEC octet,
        // bit position (14-7-1)=6 -> 0x02, with FX=0 on the first octet at
        // bit 0 set to chain.
        let data = [0b0000_0001u8, 0b0000_0010u8];
        let (records, diags) = decode_records(&data);
        assert!(records.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind(), "UNKNOWN_FRN");
    }
}
