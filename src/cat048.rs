//! Category 048 (monoradar target reports) decoder (spec.md §4.3, CAT048
//! half), including the I048/250 Mode S BDS register dispatch (§4.4) and
//! the derived geographic/QNH-corrected fields RecordAssembler (§4.9)
//! contributes on top of the raw item codecs.

use crate::bds;
use crate::bitcursor::BitCursor;
use crate::error::DecodeError;
use crate::fspec;
use crate::geo::CoordinateTransformer;
use crate::items;
use crate::qnh::QnhCorrector;
use crate::record::UnifiedRecord;

/// Highest FRN defined for CAT048 (spec.md §3 invariants: "28 for
/// CAT048").
pub const MAX_FRN: usize = 28;

const FRN_DATA_SOURCE_ID: usize = 1;
const FRN_TARGET_ADDRESS: usize = 2;
const FRN_TARGET_IDENTIFICATION: usize = 3;
const FRN_MEASURED_POSITION: usize = 4;
const FRN_FLIGHT_LEVEL: usize = 5;
const FRN_MODE_3A: usize = 6;
const FRN_TRACK_NUMBER: usize = 7;
const FRN_TRACK_STATUS: usize = 8;
const FRN_ACAS_RESOLUTION_ADVISORY: usize = 9;
const FRN_MODE_S_MB_DATA: usize = 10;

/// LSB of RHO, nautical miles (spec.md §4.3: "unsigned 16-bit in units of
/// 1/256 NM").
const RHO_LSB_NM: f64 = 1.0 / 256.0;
/// LSB of THETA, degrees (spec.md §4.3: "unsigned 16-bit in units of
/// 360°/2^16").
const THETA_LSB_DEG: f64 = 360.0 / 65_536.0;
/// LSB of Flight Level, hundreds of feet (spec.md §4.3: "14-bit signed
/// integer in units of 1/4 FL").
const FLIGHT_LEVEL_LSB: f64 = 0.25;

const METERS_PER_NM: f64 = 1852.0;
const FEET_PER_FL: f64 = 100.0;

/// Decodes every record packed into a CAT048 block payload.
///
/// `geo` is `None` when no radar station position was supplied in
/// `DecodeOptions`; RHO/THETA then decode but the derived WGS-84 position
/// is left absent rather than raising an error (CAT048 is usable without
/// geographic derivation, e.g. for Mode S/BDS-only analysis).
pub fn decode_records(
    payload: &[u8],
    geo: Option<&CoordinateTransformer>,
    qnh: &QnhCorrector,
) -> (Vec<UnifiedRecord>, Vec<DecodeError>) {
    let mut cursor = BitCursor::new(payload);
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    while cursor.remaining_bits() >= 8 {
        match decode_one_record(&mut cursor, geo, qnh) {
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
    geo: Option<&CoordinateTransformer>,
    qnh: &QnhCorrector,
) -> Result<(UnifiedRecord, Vec<DecodeError>), DecodeError> {
    let fspec_result = fspec::parse(cursor, MAX_FRN)?;
    let mut record = UnifiedRecord {
        cat: Some(48),
        ..Default::default()
    };
    let mut diagnostics = Vec::new();

    let mut rho_nm: Option<f64> = None;
    let mut theta_deg: Option<f64> = None;
    let mut flight_level: Option<f64> = None;

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
            FRN_MEASURED_POSITION => {
                let rho_raw = cursor.read_u64(16)?;
                let theta_raw = cursor.read_u64(16)?;
                let rho = rho_raw as f64 * RHO_LSB_NM;
                let theta = theta_raw as f64 * THETA_LSB_DEG;
                record.rho = Some(rho);
                record.theta = Some(theta);
                rho_nm = Some(rho);
                theta_deg = Some(theta);
            }
            FRN_FLIGHT_LEVEL => {
                cursor.skip_bits(2)?; // spare
                let raw = cursor.read_i64(14)?;
                let fl = raw as f64 * FLIGHT_LEVEL_LSB;
                record.flight_level = Some(fl);
                flight_level = Some(fl);
            }
            FRN_MODE_3A => {
                let m = items::decode_mode3a(cursor)?;
                record.mode3a = Some(m.code);
                record.mode3a_v = Some(m.v);
                record.mode3a_g = Some(m.g);
                record.mode3a_l = Some(m.l);
            }
            FRN_TRACK_NUMBER => {
                cursor.skip_bits(4)?; // spare
                record.track_number = Some(cursor.read_u64(12)? as u16);
            }
            FRN_TRACK_STATUS => {
                decode_track_status(cursor, &mut record)?;
            }
            FRN_ACAS_RESOLUTION_ADVISORY => {
                let octet = cursor.read_octet()?;
                record.acas_ra_active = Some(octet & 0x80 != 0);
                cursor.read_bytes(6)?; // remainder of the 7-octet report, unused
            }
            FRN_MODE_S_MB_DATA => {
                decode_mode_s(cursor, &mut record, &mut diagnostics)?;
            }
            other => {
                return Err(DecodeError::UnknownFrn {
                    frn: other,
                    category: 48,
                });
            }
        }
    }

    if let Some(fl) = flight_level {
        let corrected = qnh.correct(fl * FEET_PER_FL);
        record.h_baro_corrected_ft = Some(corrected.feet);
        record.h_baro_corrected_m = Some(corrected.meters);
    }

    if let (Some(transformer), Some(rho), Some(theta)) = (geo, rho_nm, theta_deg) {
        let h_for_projection = record
            .h_baro_corrected_m
            .unwrap_or(0.0);
        match transformer.forward(rho * METERS_PER_NM, theta.to_radians(), h_for_projection) {
            Ok(pos) => {
                record.latitude = Some(pos.lat);
                record.longitude = Some(pos.lon);
                record.h_wgs84 = Some(pos.h);
            }
            Err(err) => diagnostics.push(err),
        }
    }

    Ok((record, diagnostics))
}

fn decode_track_status(
    cursor: &mut BitCursor,
    record: &mut UnifiedRecord,
) -> Result<(), DecodeError> {
    let octet = cursor.read_octet()?;
    record.track_status_cnf = Some(octet & 0x80 != 0);
    let rad = (octet >> 5) & 0x3;
    record.track_status_rad = Some(
        match rad {
            0 => "combined",
            1 => "psr",
            2 => "ssr",
            _ => "mode_s",
        }
        .to_string(),
    );
    record.track_status_dou = Some(octet & 0x10 != 0);
    record.track_status_mah = Some(octet & 0x08 != 0);
    let cdm = (octet >> 1) & 0x3;
    record.track_status_cdm = Some(
        match cdm {
            0 => "maintaining",
            1 => "climbing",
            2 => "descending",
            _ => "unknown",
        }
        .to_string(),
    );

    let mut fx = octet & 0x01 != 0;
    while fx {
        let next = cursor.read_octet()?;
        fx = next & 0x01 != 0;
    }
    Ok(())
}

fn decode_mode_s(
    cursor: &mut BitCursor,
    record: &mut UnifiedRecord,
    diagnostics: &mut Vec<DecodeError>,
) -> Result<(), DecodeError> {
    let rep = cursor.read_octet()?;
    let mut codes = Vec::with_capacity(rep as usize);

    for _ in 0..rep {
        let mb_vec = cursor.read_bytes(7)?;
        let mut mb = [0u8; 7];
        mb.copy_from_slice(&mb_vec);
        let code_octet = cursor.read_octet()?;
        let bds1 = code_octet >> 4;
        let bds2 = code_octet & 0xF;

        let (register, mut diags) = bds::decode_register(&mb, bds1, bds2)?;
        diagnostics.append(&mut diags);
        codes.push(register.code.clone());

        if let Some(f) = register.bds40 {
            record.bds40_mcp_alt = f.selected_altitude_mcp;
            record.bds40_fms_alt = f.selected_altitude_fms;
            record.bds40_baro_setting = f.barometric_setting;
            record.bds40_target_source = f.target_altitude_source.map(|s| {
                match s {
                    bds::bds40::TargetSource::AircraftAltitude => "aircraft_altitude",
                    bds::bds40::TargetSource::McpFcuSelectedAltitude => "mcp_fcu_selected",
                    bds::bds40::TargetSource::FmsSelectedAltitude => "fms_selected",
                }
                .to_string()
            });
        }
        if let Some(f) = register.bds50 {
            record.bds50_roll_angle = f.roll_angle;
            record.bds50_true_track_angle = f.true_track_angle;
            record.bds50_ground_speed = f.ground_speed;
            record.bds50_track_angle_rate = f.track_angle_rate;
            record.bds50_true_airspeed = f.true_airspeed;
        }
        if let Some(f) = register.bds60 {
            record.bds60_mag_heading = f.magnetic_heading;
            record.bds60_ias = f.indicated_airspeed;
            record.bds60_mach = f.mach_number;
            record.bds60_baro_alt_rate = f.barometric_altitude_rate.map(|v| v as f64);
            record.bds60_inertial_vert_velocity = f.inertial_vertical_velocity.map(|v| v as f64);
        }
    }

    if !codes.is_empty() {
        record.mode_s = Some(codes.join(" "));
    }
    Ok(())
}
