//! Top-level decode entry point (spec.md §4.6, §6).
//!
//! `decode_stream` drives [`crate::block::BlockReader`], routes each block
//! to the matching category decoder, and returns every fully assembled
//! record alongside a flat list of [`Diagnostic`]s. There is no iterator
//! abstraction over partial state here — the whole input is small enough
//! (one `.ast` file, or one caller-chosen partition of one) to decode
//! eagerly; callers wanting incremental output can partition the input
//! themselves per spec.md §5.

use crate::cat021;
use crate::cat048;
use crate::error::DecodeError;
use crate::geo::CoordinateTransformer;
use crate::qnh::QnhCorrector;
use crate::record::UnifiedRecord;

/// Options accepted by [`decode_stream`] (spec.md §6).
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Radar station position, required for CAT048 geographic derivation.
    /// Without it, CAT048 records decode with RHO/THETA populated but
    /// latitude/longitude/H_WGS84 left absent.
    pub radar_station: Option<RadarStation>,
    /// Local QNH in hPa. `None` disables barometric correction.
    pub qnh: Option<f64>,
    /// Transition altitude, feet, above which QNH correction does not
    /// apply.
    pub transition_altitude_ft: f64,
    /// If true, the first decode error aborts the whole stream instead of
    /// being converted to a `Diagnostic`.
    pub strict: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        DecodeOptions {
            transition_altitude_ft: crate::qnh::DEFAULT_TRANSITION_ALTITUDE_FT,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarStation {
    pub lat: f64,
    pub lon: f64,
    pub h: f64,
}

/// A non-fatal decode failure, surfaced instead of aborting the stream
/// (spec.md §6 "Diagnostics").
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub byte_offset: usize,
    pub category: Option<u8>,
    pub frn: Option<usize>,
    pub detail: String,
}

impl Diagnostic {
    fn from_error(error: &DecodeError, byte_offset: usize, category: Option<u8>) -> Self {
        let frn = match error {
            DecodeError::UnknownFrn { frn, .. } => Some(*frn),
            _ => None,
        };
        Diagnostic {
            kind: error.kind(),
            byte_offset,
            category,
            frn,
            detail: error.to_string(),
        }
    }
}

/// Cooperative cancellation flag polled between blocks (spec.md §5).
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

impl CancellationToken for () {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Result of a full decode: records in input order, plus diagnostics for
/// whatever failed along the way.
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub records: Vec<UnifiedRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decodes a complete byte slice into records and diagnostics.
///
/// In strict mode (`options.strict`), the first error of any kind returns
/// `Err` immediately with the records assembled so far discarded (per
/// spec.md §7: "in strict mode the first failure aborts and is
/// surfaced"); in non-strict mode every error becomes a `Diagnostic` and
/// decoding resumes at the next block.
pub fn decode_stream(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<DecodeReport, Diagnostic> {
    decode_stream_cancellable(bytes, options, &())
}

/// As [`decode_stream`], but polling `token` between blocks so a caller
/// running this on a background thread can stop early.
pub fn decode_stream_cancellable(
    bytes: &[u8],
    options: &DecodeOptions,
    token: &dyn CancellationToken,
) -> Result<DecodeReport, Diagnostic> {
    let geo = options
        .radar_station
        .map(|s| CoordinateTransformer::new(s.lat, s.lon, s.h));
    let qnh = QnhCorrector::new(
        options.qnh,
        if options.transition_altitude_ft > 0.0 {
            options.transition_altitude_ft
        } else {
            crate::qnh::DEFAULT_TRANSITION_ALTITUDE_FT
        },
    );

    let mut reader = crate::block::BlockReader::new(bytes);
    let mut report = DecodeReport::default();

    loop {
        if token.is_cancelled() {
            tracing::debug!("decode_stream cancelled, returning partial report");
            break;
        }

        let offset = reader.position();
        let block = match reader.next_block() {
            Ok(Some(block)) => block,
            Ok(None) => break,
            Err(err) => {
                let diag = Diagnostic::from_error(&err, offset, None);
                if options.strict {
                    return Err(diag);
                }
                report.diagnostics.push(diag);
                break;
            }
        };

        let (records, errors) = match block.category {
            21 => cat021::decode_records(block.payload),
            48 => cat048::decode_records(block.payload, geo.as_ref(), &qnh),
            other => {
                let err = DecodeError::UnsupportedCategory { category: other };
                let diag = Diagnostic::from_error(&err, block.offset, Some(other));
                if options.strict {
                    return Err(diag);
                }
                report.diagnostics.push(diag);
                continue;
            }
        };

        for err in &errors {
            tracing::debug!(category = block.category, "record-level error: {err}");
        }

        if options.strict {
            if let Some(err) = errors.first() {
                return Err(Diagnostic::from_error(err, block.offset, Some(block.category)));
            }
        }

        report.records.extend(records);
        report.diagnostics.extend(
            errors
                .iter()
                .map(|err| Diagnostic::from_error(err, block.offset, Some(block.category))),
        );
    }

    Ok(report)
}

/// Re-exported so callers decoding raw Mode S MB registers outside an
/// ASTERIX I048/250 context (e.g. a standalone BDS fixture) can reuse the
/// same sub-decoders.
pub use crate::bds::decode_register as decode_bds_register;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_empty_input_has_no_records_or_diagnostics() {
        let report = decode_stream(&[], &DecodeOptions::new()).unwrap();
        assert!(report.records.is_empty());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn unsupported_category_skips_block_non_strict() {
        // CAT=99, LEN=4, one payload byte.
        let data = [99, 0x00, 0x04, 0xAA];
        let options = DecodeOptions::new();
        let report = decode_stream(&data, &options).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, "UNSUPPORTED_CATEGORY");
    }

    #[test]
    fn unsupported_category_aborts_in_strict_mode() {
        let data = [99, 0x00, 0x04, 0xAA];
        let mut options = DecodeOptions::new();
        options.strict = true;
        let err = decode_stream(&data, &options).unwrap_err();
        assert_eq!(err.kind, "UNSUPPORTED_CATEGORY");
    }

    #[test]
    fn short_block_reported_as_diagnostic_non_strict() {
        let data = [0x30, 0x00, 0x10, 0x01];
        let options = DecodeOptions::new();
        let report = decode_stream(&data, &options).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, "SHORT_BLOCK");
    }

    struct AlwaysCancelled;
    impl CancellationToken for AlwaysCancelled {
        fn is_cancelled(&self) -> bool {
            true
        }
    }

    #[test]
    fn cancellation_returns_partial_report() {
        let data = [0x30, 0x00, 0x03, 0x30, 0x00, 0x03];
        let options = DecodeOptions::new();
        let report =
            decode_stream_cancellable(&data, &options, &AlwaysCancelled).unwrap();
        assert!(report.records.is_empty());
        assert!(report.diagnostics.is_empty());
    }
}
