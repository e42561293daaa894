//! Heading and Speed Report (BDS 6,0), embedded via CAT048 I048/250.
//!
//! 56 bits: magnetic heading (1+1+10), indicated airspeed (1+10), Mach
//! number (1+10), barometric altitude rate (1+1+9), inertial vertical
//! velocity (1+1+9). Vertical-rate fields use an all-zero or all-one
//! magnitude as "no rate information", reported as `Some(0)` rather than
//! absent, matching the register's own GFM convention.

use crate::bitcursor::BitCursor;
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadingAndSpeedReport {
    /// Magnetic heading, degrees, normalized to [0, 360).
    pub magnetic_heading: Option<f64>,
    /// Indicated airspeed, knots.
    pub indicated_airspeed: Option<u16>,
    /// Mach number.
    pub mach_number: Option<f64>,
    /// Barometric altitude rate, ft/min. Positive is climbing.
    pub barometric_altitude_rate: Option<i16>,
    /// Inertial vertical velocity, ft/min. Positive is climbing.
    pub inertial_vertical_velocity: Option<i16>,
}

pub fn decode(
    cursor: &mut BitCursor,
) -> Result<(HeadingAndSpeedReport, Vec<DecodeError>), DecodeError> {
    let mut diagnostics = Vec::new();

    let magnetic_heading = read_heading(cursor, &mut diagnostics)?;
    let indicated_airspeed = read_ias(cursor, &mut diagnostics)?;
    let mach_number = read_mach(cursor, indicated_airspeed, &mut diagnostics)?;
    let barometric_altitude_rate = read_vertical(cursor, "barometric altitude rate", &mut diagnostics)?;
    let inertial_vertical_velocity =
        read_vertical(cursor, "inertial vertical velocity", &mut diagnostics)?;

    Ok((
        HeadingAndSpeedReport {
            magnetic_heading,
            indicated_airspeed,
            mach_number,
            barometric_altitude_rate,
            inertial_vertical_velocity,
        },
        diagnostics,
    ))
}

fn read_heading(
    cursor: &mut BitCursor,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<f64>, DecodeError> {
    let status = cursor.read_bit()?;
    let sign = cursor.read_bit()?;
    let value = cursor.read_u64(10)?;

    if !status {
        if sign || value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 6,0 magnetic heading: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    let signed = if sign {
        value as i32 - 1024
    } else {
        value as i32
    };
    let mut heading = signed as f64 * 90.0 / 512.0;
    if heading < 0.0 {
        heading += 360.0;
    }
    Ok(Some(heading))
}

fn read_ias(
    cursor: &mut BitCursor,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<u16>, DecodeError> {
    let status = cursor.read_bit()?;
    let value = cursor.read_u64(10)?;

    if !status {
        if value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 6,0 indicated airspeed: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    if value == 0 || value > 500 {
        diagnostics.push(DecodeError::BdsFieldOutOfRange {
            detail: format!("BDS 6,0 indicated airspeed {value} outside (0, 500]"),
        });
        return Ok(None);
    }
    Ok(Some(value as u16))
}

fn read_mach(
    cursor: &mut BitCursor,
    ias: Option<u16>,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<f64>, DecodeError> {
    let status = cursor.read_bit()?;
    let value = cursor.read_u64(10)?;

    if !status {
        if value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 6,0 Mach number: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    let mach = value as f64 * 2.048 / 512.0;
    if mach <= 0.0 || mach > 1.0 {
        diagnostics.push(DecodeError::BdsFieldOutOfRange {
            detail: format!("BDS 6,0 Mach number {mach} outside (0, 1]"),
        });
        return Ok(None);
    }

    if let Some(ias) = ias {
        // 250 kt corresponds to roughly Mach 0.45 at 10,000 ft; 150 kt to
        // roughly Mach 0.5 at FL400.
        if ias > 250 && mach < 0.4 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: format!("BDS 6,0 IAS {ias} and Mach {mach} disagree"),
            });
            return Ok(None);
        }
        if ias < 150 && mach > 0.5 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: format!("BDS 6,0 IAS {ias} and Mach {mach} disagree"),
            });
            return Ok(None);
        }
    }
    Ok(Some(mach))
}

fn read_vertical(
    cursor: &mut BitCursor,
    label: &str,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<i16>, DecodeError> {
    let status = cursor.read_bit()?;
    let sign = cursor.read_bit()?;
    let value = cursor.read_u64(9)?;

    if !status {
        if sign || value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: format!("BDS 6,0 {label}: status clear but value nonzero"),
            });
        }
        return Ok(None);
    }

    if value == 0 || value == 0b1_1111_1111 {
        return Ok(Some(0));
    }

    let rate = if sign {
        (value as i32 - 512) * 32
    } else {
        value as i32 * 32
    };

    if rate.abs() > 6000 {
        diagnostics.push(DecodeError::BdsFieldOutOfRange {
            detail: format!("BDS 6,0 {label}: {rate} ft/min exceeds 6000"),
        });
        return Ok(None);
    }
    Ok(Some(rate as i16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn status_clear_is_absent_without_diagnostic() {
        let mb = [0u8; 7];
        let mut cursor = BitCursor::new(&mb);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert_eq!(fields.magnetic_heading, None);
        assert_eq!(fields.indicated_airspeed, None);
        assert_eq!(fields.barometric_altitude_rate, None);
        assert!(diags.is_empty());
    }

    #[test]
    fn heading_scaling_and_wraparound() {
        // status=1, sign=1 (west), value=512 -> (512-1024)*90/512 = -90 -> 270.
        let mut bytes = [0u8; 7];
        // bit0=status=1, bit1=sign=1, bits2-11 (10 bits)=512=0b1000000000
        bytes[0] = 0b1110_0000;
        bytes[1] = 0b0000_0000;
        let mut cursor = BitCursor::new(&bytes);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert!(diags.is_empty());
        assert_relative_eq!(fields.magnetic_heading.unwrap(), 270.0, max_relative = 1e-6);
    }

    #[test]
    fn vertical_rate_all_ones_reports_zero_not_absent() {
        // barometric rate field starts after heading(12)+ias(11)+mach(11)=34 bits.
        // status=1, sign=0, value=0b111111111 (511) at bit offset 34.
        let mut bytes = [0u8; 7];
        // set bit 34 = status=1: byte4 (bits32-39), bit offset within byte = 34-32=2
        bytes[4] |= 0b0010_0000; // bit index 2 from MSB -> mask 0x20
        // sign bit at pos35 -> bit offset 3 in byte4 -> value 0 (leave clear)
        // value bits pos36..44 (9 bits): spans byte4 bits4-7 (4 bits) + byte5 bits0-4 (5 bits)
        bytes[4] |= 0b0000_1111; // low 4 bits of byte4 = 1111
        bytes[5] |= 0b1111_1000; // top 5 bits of byte5 = 11111
        let mut cursor = BitCursor::new(&bytes);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert_eq!(fields.barometric_altitude_rate, Some(0));
        assert!(diags.is_empty());
    }
}
