//! Barometric altitude correction for non-standard QNH (spec.md §4.8).
//!
//! Pure and deterministic: applying it twice to the same value has no
//! defined meaning — callers must apply it exactly once per reported
//! pressure altitude.

/// Default transition altitude in feet (spec.md §9 Open Questions: not
/// stated by the source repository; assumed and noted in DESIGN.md).
pub const DEFAULT_TRANSITION_ALTITUDE_FT: f64 = 6000.0;

const M_PER_FT: f64 = 0.3048;

#[derive(Debug, Clone, Copy)]
pub struct QnhCorrector {
    pub qnh_hpa: Option<f64>,
    pub transition_altitude_ft: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedAltitude {
    pub feet: f64,
    pub meters: f64,
}

impl Default for QnhCorrector {
    fn default() -> Self {
        QnhCorrector {
            qnh_hpa: None,
            transition_altitude_ft: DEFAULT_TRANSITION_ALTITUDE_FT,
        }
    }
}

impl QnhCorrector {
    pub fn new(qnh_hpa: Option<f64>, transition_altitude_ft: f64) -> Self {
        QnhCorrector {
            qnh_hpa,
            transition_altitude_ft,
        }
    }

    /// Corrects a reported pressure altitude (feet). Below the transition
    /// altitude, with a known QNH, applies `(QNH - 1013.25) * 27.3 ft/hPa`.
    /// At or above the transition, or without a known QNH, the altitude
    /// passes through unchanged.
    pub fn correct(&self, pressure_altitude_ft: f64) -> CorrectedAltitude {
        let feet = match self.qnh_hpa {
            Some(qnh) if pressure_altitude_ft < self.transition_altitude_ft => {
                pressure_altitude_ft + (qnh - 1013.25) * 27.3
            }
            _ => pressure_altitude_ft,
        };
        CorrectedAltitude {
            feet,
            meters: feet * M_PER_FT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn s6_below_transition_corrects() {
        let corrector = QnhCorrector::new(Some(1003.25), DEFAULT_TRANSITION_ALTITUDE_FT);
        let result = corrector.correct(3000.0);
        assert_relative_eq!(result.feet, 2727.0, epsilon = 1e-6);
    }

    #[test]
    fn s6_above_transition_unchanged() {
        let corrector = QnhCorrector::new(Some(1003.25), DEFAULT_TRANSITION_ALTITUDE_FT);
        let result = corrector.correct(8000.0);
        assert_relative_eq!(result.feet, 8000.0, epsilon = 1e-9);
    }

    #[test]
    fn no_qnh_passes_through() {
        let corrector = QnhCorrector::new(None, DEFAULT_TRANSITION_ALTITUDE_FT);
        let result = corrector.correct(3000.0);
        assert_relative_eq!(result.feet, 3000.0, epsilon = 1e-9);
    }

    #[test]
    fn monotonic_for_fixed_qnh_below_transition() {
        let corrector = QnhCorrector::new(Some(990.0), DEFAULT_TRANSITION_ALTITUDE_FT);
        let a = corrector.correct(1000.0).feet;
        let b = corrector.correct(2000.0).feet;
        assert!(a < b);
    }

    #[test]
    fn meters_conversion() {
        let corrector = QnhCorrector::new(None, DEFAULT_TRANSITION_ALTITUDE_FT);
        let result = corrector.correct(1000.0);
        assert_relative_eq!(result.meters, 1000.0 * 0.3048, epsilon = 1e-9);
    }
}
