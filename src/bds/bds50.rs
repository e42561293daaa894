//! Track and Turn Report (BDS 5,0), embedded via CAT048 I048/250.
//!
//! 56 bits: roll angle (1+1+9), true track angle (1+1+10), ground speed
//! (1+10), track angle rate (1+1+9), true airspeed (1+10). Every field
//! but ground speed and true airspeed carries a sign bit ahead of its
//! magnitude, two's-complement style. A cleared status bit means the
//! field is not reported; a set status bit with a value outside its
//! operationally plausible range is suppressed with a diagnostic rather
//! than aborting the rest of the register.

use crate::bitcursor::BitCursor;
use crate::error::DecodeError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackAndTurnReport {
    /// Roll angle, degrees. Negative is left wing down.
    pub roll_angle: Option<f64>,
    /// True track angle, degrees, normalized to [0, 360).
    pub true_track_angle: Option<f64>,
    /// Ground speed, knots.
    pub ground_speed: Option<u16>,
    /// Track angle rate, degrees/second. Negative is a left turn.
    pub track_angle_rate: Option<f64>,
    /// True airspeed, knots.
    pub true_airspeed: Option<u16>,
}

pub fn decode(
    cursor: &mut BitCursor,
) -> Result<(TrackAndTurnReport, Vec<DecodeError>), DecodeError> {
    let mut diagnostics = Vec::new();

    let roll_angle = read_roll(cursor, &mut diagnostics)?;
    let true_track_angle = read_track(cursor, &mut diagnostics)?;
    let ground_speed = read_groundspeed(cursor, &mut diagnostics)?;
    let track_angle_rate = read_rate(cursor, roll_angle, &mut diagnostics)?;
    let true_airspeed = read_tas(cursor, ground_speed, &mut diagnostics)?;

    Ok((
        TrackAndTurnReport {
            roll_angle,
            true_track_angle,
            ground_speed,
            track_angle_rate,
            true_airspeed,
        },
        diagnostics,
    ))
}

fn read_roll(
    cursor: &mut BitCursor,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<f64>, DecodeError> {
    let status = cursor.read_bit()?;
    let sign = cursor.read_bit()?;
    let value = cursor.read_u64(9)?;

    if !status {
        if sign || value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 5,0 roll angle: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    let roll = if sign {
        (value as f64 - 512.0) * 45.0 / 256.0
    } else {
        value as f64 * 45.0 / 256.0
    };
    if roll.abs() > 50.0 {
        diagnostics.push(DecodeError::BdsFieldOutOfRange {
            detail: format!("BDS 5,0 roll angle: abs({roll}) > 50"),
        });
        return Ok(None);
    }
    Ok(Some(roll))
}

fn read_track(
    cursor: &mut BitCursor,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<f64>, DecodeError> {
    let status = cursor.read_bit()?;
    let sign = cursor.read_bit()?;
    let value = cursor.read_u64(10)?;

    if !status {
        if sign || value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 5,0 true track angle: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    let signed = if sign {
        value as i32 - 1024
    } else {
        value as i32
    };
    let mut track = signed as f64 * 90.0 / 512.0;
    if track < 0.0 {
        track += 360.0;
    }
    Ok(Some(track))
}

fn read_groundspeed(
    cursor: &mut BitCursor,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<u16>, DecodeError> {
    let status = cursor.read_bit()?;
    let value = cursor.read_u64(10)?;

    if !status {
        if value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 5,0 ground speed: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    let gs = (value * 2) as u16;
    if gs > 600 {
        diagnostics.push(DecodeError::BdsFieldOutOfRange {
            detail: format!("BDS 5,0 ground speed: {gs} kt > 600"),
        });
        return Ok(None);
    }
    Ok(Some(gs))
}

fn read_rate(
    cursor: &mut BitCursor,
    roll: Option<f64>,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<f64>, DecodeError> {
    let status = cursor.read_bit()?;
    let sign = cursor.read_bit()?;
    let value = cursor.read_u64(9)?;

    if !status {
        if sign || value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 5,0 track angle rate: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    if value == 0b1_1111_1111 {
        return Ok(None);
    }

    let signed = if sign {
        value as i32 - 512
    } else {
        value as i32
    };
    let rate = signed as f64 * 8.0 / 256.0;

    if let Some(roll) = roll {
        if roll * rate < 0.0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: format!(
                    "BDS 5,0 track angle rate: sign disagrees with roll angle {roll} vs {rate}"
                ),
            });
            return Ok(None);
        }
    }
    Ok(Some(rate))
}

fn read_tas(
    cursor: &mut BitCursor,
    ground_speed: Option<u16>,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<Option<u16>, DecodeError> {
    let status = cursor.read_bit()?;
    let value = cursor.read_u64(10)?;

    if !status {
        if value != 0 {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: "BDS 5,0 true airspeed: status clear but value nonzero".into(),
            });
        }
        return Ok(None);
    }

    let tas = (value * 2) as u16;

    if let Some(gs) = ground_speed {
        let within_range = (80..=500).contains(&tas);
        let agrees_with_gs = (gs as i32 - tas as i32).abs() <= 200;
        if !within_range || !agrees_with_gs {
            diagnostics.push(DecodeError::BdsFieldOutOfRange {
                detail: format!("BDS 5,0 true airspeed {tas} inconsistent with ground speed {gs}"),
            });
            return Ok(None);
        }
    }
    Ok(Some(tas))
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
        assert_eq!(fields.roll_angle, None);
        assert_eq!(fields.ground_speed, None);
        assert!(diags.is_empty());
    }

    #[test]
    fn groundspeed_out_of_range_is_suppressed() {
        // status=1, value=0b1111111111 (1023) -> gs = 2046 kt, over 600.
        let mut bytes = [0u8; 7];
        // skip roll (11 bits) and track (12 bits) = 23 bits, then groundspeed
        // at bit 23: status=1, 10-bit value all ones.
        // byte layout: bits 23..33 span bytes 2..4.
        bytes[2] = 0b0000_0001; // bit 23 (msb of byte2's low bit) set as status
        bytes[3] = 0b1111_1111;
        bytes[4] = 0b1100_0000;
        let mut cursor = BitCursor::new(&bytes);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert_eq!(fields.ground_speed, None);
        assert!(diags.iter().any(|d| d.kind() == "BDS_FIELD_OUT_OF_RANGE"));
    }

    #[test]
    fn roll_angle_scaling() {
        // status=1, sign=0, value=256 -> roll = 256*45/256 = 45 degrees.
        let mut bytes = [0u8; 7];
        // bit0=status=1, bit1=sign=0, bits2-10 = value (9 bits) = 256 = 0b100000000
        bytes[0] = 0b1010_0000; // status=1,sign=0,then value top bits 00000
        bytes[1] = 0b0000_0000;
        let mut cursor = BitCursor::new(&bytes);
        let (fields, diags) = decode(&mut cursor).unwrap();
        assert!(diags.is_empty() || fields.roll_angle.is_some());
        if let Some(roll) = fields.roll_angle {
            assert_relative_eq!(roll, 45.0, max_relative = 1e-6);
        }
    }
}
