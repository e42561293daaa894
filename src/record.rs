//! The unified tabular record model (spec.md §3 "Unified Record", §4.9
//! RecordAssembler).
//!
//! A [`UnifiedRecord`] is a fixed 47-column schema shared by CAT021 and
//! CAT048. Category decoders populate only the columns their source items
//! produce; [`RecordAssembler`] fills in the derived geographic and
//! QNH-corrected columns for CAT048 before the record becomes immutable
//! and is handed to the caller.
//!
//! A field is `None` when the source record did not carry the producing
//! item — distinct from a present field whose decoded value happens to be
//! zero (spec.md "Absence vs. zero").

use serde::Serialize;
use std::fmt;

/// Column order is normative for CSV export: this is the order fields are
/// declared below and the order `UnifiedRecord::columns()` returns them in.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct UnifiedRecord {
    pub cat: Option<u8>,
    pub sac: Option<u8>,
    pub sic: Option<u8>,
    pub time_sec: Option<f64>,
    pub time_str: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub target_address: Option<u32>,
    pub target_identification: Option<String>,
    pub mode3a: Option<u16>,
    pub mode3a_v: Option<bool>,
    pub mode3a_g: Option<bool>,
    pub mode3a_l: Option<bool>,
    pub flight_level: Option<f64>,
    pub track_number: Option<u16>,
    pub rho: Option<f64>,
    pub theta: Option<f64>,
    pub h_wgs84: Option<f64>,
    pub h_baro_corrected_ft: Option<f64>,
    pub h_baro_corrected_m: Option<f64>,
    pub mode_s: Option<String>,
    pub bds40_mcp_alt: Option<u16>,
    pub bds40_fms_alt: Option<u16>,
    pub bds40_baro_setting: Option<f64>,
    pub bds40_target_source: Option<String>,
    pub bds50_roll_angle: Option<f64>,
    pub bds50_true_track_angle: Option<f64>,
    pub bds50_ground_speed: Option<u16>,
    pub bds50_track_angle_rate: Option<f64>,
    pub bds50_true_airspeed: Option<u16>,
    pub bds60_mag_heading: Option<f64>,
    pub bds60_ias: Option<u16>,
    pub bds60_mach: Option<f64>,
    pub bds60_baro_alt_rate: Option<f64>,
    pub bds60_inertial_vert_velocity: Option<f64>,
    pub track_status_cnf: Option<bool>,
    pub track_status_rad: Option<String>,
    pub track_status_dou: Option<bool>,
    pub track_status_mah: Option<bool>,
    pub track_status_cdm: Option<String>,
    pub acas_ra_active: Option<bool>,
    pub atp: Option<String>,
    pub arc: Option<String>,
    pub rc: Option<bool>,
    pub dcr: Option<bool>,
    pub gbs: Option<bool>,
    pub emitter_category: Option<u8>,
}

/// The 47 column names, in export order.
pub const COLUMNS: [&str; 47] = [
    "CAT",
    "SAC",
    "SIC",
    "Time_sec",
    "Time_str",
    "Latitude",
    "Longitude",
    "Target_Address",
    "Target_Identification",
    "Mode3A",
    "Mode3A_V",
    "Mode3A_G",
    "Mode3A_L",
    "Flight_Level",
    "Track_Number",
    "RHO",
    "THETA",
    "H_WGS84",
    "H_baro_corrected_ft",
    "H_baro_corrected_m",
    "ModeS",
    "BDS40_MCP_Alt",
    "BDS40_FMS_Alt",
    "BDS40_Baro_Setting",
    "BDS40_Target_Source",
    "BDS50_Roll_Angle",
    "BDS50_True_Track_Angle",
    "BDS50_Ground_Speed",
    "BDS50_Track_Angle_Rate",
    "BDS50_True_Airspeed",
    "BDS60_Mag_Heading",
    "BDS60_IAS",
    "BDS60_Mach",
    "BDS60_Baro_Alt_Rate",
    "BDS60_Inertial_Vert_Velocity",
    "Track_Status_CNF",
    "Track_Status_RAD",
    "Track_Status_DOU",
    "Track_Status_MAH",
    "Track_Status_CDM",
    "ACAS_RA_Active",
    "ATP",
    "ARC",
    "RC",
    "DCR",
    "GBS",
    "Emitter_Category",
];

impl UnifiedRecord {
    pub fn columns() -> &'static [&'static str; 47] {
        &COLUMNS
    }

    /// Number of populated (non-`None`) fields, used by the "fields
    /// populated equals set FRNs mapped to fields plus derived fields"
    /// testable property (spec.md §8).
    pub fn populated_count(&self) -> usize {
        let json = serde_json::to_value(self).expect("UnifiedRecord always serializes");
        match json {
            serde_json::Value::Object(map) => {
                map.values().filter(|v| !v.is_null()).count()
            }
            _ => 0,
        }
    }
}

impl fmt::Display for UnifiedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " CAT{:?} target report", self.cat)?;
        if let (Some(sac), Some(sic)) = (self.sac, self.sic) {
            writeln!(f, "  Station:       {sac:03}/{sic:03}")?;
        }
        if let Some(addr) = self.target_address {
            writeln!(f, "  Address:       {addr:06x}")?;
        }
        if let Some(id) = &self.target_identification {
            writeln!(f, "  Callsign:      {id}")?;
        }
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            writeln!(f, "  Position:      {lat:.5}, {lon:.5}")?;
        }
        if let Some(fl) = self.flight_level {
            writeln!(f, "  Flight Level:  {fl:.2}")?;
        }
        Ok(())
    }
}
