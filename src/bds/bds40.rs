//! Selected Vertical Intention (BDS 4,0), embedded via CAT048 I048/250.
//!
//! Reports what an aircraft's mode control panel or flight management
//! system currently has selected: MCP/FCU altitude, FMS altitude, and the
//! barometric pressure setting in use. Each of the three numeric fields
//! carries its own status bit; a cleared status bit with an all-zero
//! value means "not fitted/not reported" and the field is absent. A
//! cleared status bit with a nonzero value, or a value outside its
//! defined range, is reported as a suppressed field plus a diagnostic
//! rather than failing the whole register.

use crate::bitcursor::BitCursor;
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectedVerticalIntention {
    /// MCP/FCU selected altitude, feet, rounded to the nearest 100 ft.
    pub selected_altitude_mcp: Option<u16>,
    /// FMS selected altitude, feet, rounded to the nearest 100 ft.
    pub selected_altitude_fms: Option<u16>,
    /// Barometric pressure setting, hPa.
    pub barometric_setting: Option<f64>,
    pub target_altitude_source: Option<TargetSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    AircraftAltitude,
    McpFcuSelectedAltitude,
    FmsSelectedAltitude,
}

pub fn decode(
    cursor: &mut BitCursor,
) -> Result<(SelectedVerticalIntention, Vec<DecodeError>), DecodeError> {
    let mut diagnostics = Vec::new();

    let selected_altitude_mcp = read_selected(cursor, "MCP altitude", &mut diagnostics)?;
    let selected_altitude_fms = read_selected(cursor, "FMS altitude", &mut diagnostics)?;
    let barometric_setting = read_qnh(cursor, &mut diagnostics)?;

    // 8 reserved bits, expected all zero.
    cursor.read_u64(8)?;
    // MCP/FCU mode status, VNAV, altitude hold, approach mode: unused here.
    cursor.skip_bits(4)?;
    // 2 reserved bits.
    cursor.skip_bits(2)?;

    let source_status = cursor.read_bit()?;
    let source_bits = cursor.read_u64(2)?;
    let target_altitude_source = if !source_status {
        None
    } else {
        match source_bits {
            1 => Some(TargetSource::AircraftAltitude),
            2 => Some(TargetSource::McpFcuSelectedAltitude),
            3 => Some(TargetSource::FmsSelectedAltitude),
            _ => None,
        }
    };

    Ok((
        SelectedVerticalIntention {
            selected_altitude_mcp,
            selected_altitude_fms,
            barometric_setting,
            target_altitude_source,
        },
        diagnostics,
    ))
}

fn read_selected(
    cursor: &mut BitCursor,
    label: &str,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<u16>, DecodeError> {
    let status = cursor.read_bit()?;
    let value = cursor.read_u64(12)?;

    if !status {
        if value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: format!("BDS 4,0 {label}: status clear but value nonzero"),
            });
        }
        return Ok(None);
    }

    let feet = value * 16;
    let rounded = (feet + 8) / 100 * 100;
    if rounded > 45_000 {
        diagnostics.push(DecodeError::BdsFieldOutOfRange {
            detail: format!("BDS 4,0 {label}: {rounded} ft exceeds 45000 ft"),
        });
        return Ok(None);
    }
    Ok(Some(rounded as u16))
}

fn read_qnh(
    cursor: &mut BitCursor,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<f64>, DecodeError> {
    let status = cursor.read_bit()?;
    let value = cursor.read_u64(12)?;

    if !status {
        if value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 4,0 barometric setting: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    Ok(Some(value as f64 * 0.1 + 800.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hexlit::hex;

    #[test]
    fn valid_register_decodes_all_fields() {
        // MCP alt = FMS alt = 3000 ft, QNH = 1020 hPa, source unreported.
        let mb = hex!("85dc2ef1300000");
        let mut cursor = BitCursor::new(&mb);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert!(diags.is_empty());
        assert_eq!(fields.selected_altitude_mcp, Some(3000));
        assert_eq!(fields.selected_altitude_fms, Some(3000));
        assert_relative_eq!(
            fields.barometric_setting.unwrap(),
            1020.0,
            max_relative = 1e-3
        );
    }

    #[test]
    fn status_clear_is_absent_without_diagnostic() {
        let mb = [0u8; 7];
        let mut cursor = BitCursor::new(&mb);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert_eq!(fields.selected_altitude_mcp, None);
        assert_eq!(fields.selected_altitude_fms, None);
        assert_eq!(fields.barometric_setting, None);
        assert!(diags.is_empty());
    }

    #[test]
    fn out_of_range_altitude_suppressed_with_diagnostic() {
        // status=1, value = 0xFFF (4095) -> 4095*16 = 65520 ft, way over 45000.
        let mut bytes = [0u8; 7];
        bytes[0] = 0b1111_1111;
        bytes[1] = 0b1111_0000;
        let mut cursor = BitCursor::new(&bytes);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert_eq!(fields.selected_altitude_mcp, None);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind(), "BDS_FIELD_OUT_OF_RANGE");
    }
}
