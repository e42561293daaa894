//! Item codecs shared between CAT021 and CAT048 (spec.md §4.3): Mode 3/A,
//! time-of-day, and ICAO six-bit callsign decoding have identical wire
//! layouts in both categories, so they live here rather than being
//! duplicated per category decoder.

use crate::bitcursor::BitCursor;
use crate::error::DecodeError;

/// Mode 3/A transponder code: four octal digits plus validity flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mode3A {
    /// The code itself, as a 12-bit value whose four 3-bit groups are
    /// octal digits (e.g. 0o1200).
    pub code: u16,
    /// Validated (0 = validated, matches decoder convention: true means
    /// the code is NOT validated, following the "V" bit's own polarity).
    pub v: bool,
    /// Garbled.
    pub g: bool,
    /// Mode 3/A has changed since last report.
    pub l: bool,
}

/// Reads a 16-bit Mode 3/A field: V(1) G(1) L(1) spare(1) then four 3-bit
/// octal digits.
pub fn decode_mode3a(cursor: &mut BitCursor) -> Result<Mode3A, DecodeError> {
    let v = cursor.read_bit()?;
    let g = cursor.read_bit()?;
    let l = cursor.read_bit()?;
    cursor.skip_bits(1)?; // spare
    let code = cursor.read_u64(12)? as u16;
    Ok(Mode3A { code, v, g, l })
}

/// Formats a Mode 3/A code's 12 bits as four octal digits, e.g. "1200".
pub fn mode3a_octal_string(code: u16) -> String {
    format!(
        "{}{}{}{}",
        (code >> 9) & 0x7,
        (code >> 6) & 0x7,
        (code >> 3) & 0x7,
        code & 0x7
    )
}

/// Reads a 24-bit time-of-day field: a count of 1/128 s since midnight.
pub fn decode_time_of_day(cursor: &mut BitCursor) -> Result<f64, DecodeError> {
    let ticks = cursor.read_u64(24)?;
    Ok(ticks as f64 / 128.0)
}

/// Formats seconds-since-midnight as `HH:MM:SS.mmm`.
pub fn format_time_str(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as i64;
    let ms = total_ms.rem_euclid(1000);
    let total_s = total_ms.div_euclid(1000);
    let s = total_s.rem_euclid(60);
    let total_m = total_s.div_euclid(60);
    let m = total_m.rem_euclid(60);
    let h = total_m.div_euclid(60);
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Reads a 24-bit target address (ICAO aircraft address).
pub fn decode_target_address(cursor: &mut BitCursor) -> Result<u32, DecodeError> {
    Ok(cursor.read_u64(24)? as u32)
}

/// Reads six bytes (eight packed 6-bit characters) and decodes the ICAO
/// character set into an 8-character identification string.
pub fn decode_target_identification(cursor: &mut BitCursor) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(8);
    for _ in 0..8 {
        let code = cursor.read_u64(6)? as u8;
        out.push(icao_char(code));
    }
    Ok(out)
}

fn icao_char(code: u8) -> char {
    match code {
        0b000001..=0b011010 => (b'A' + (code - 0b000001)) as char,
        0b110000..=0b111001 => (b'0' + (code - 0b110000)) as char,
        0b100000 => ' ',
        _ => '?',
    }
}
