//! Transition selection: curve type and duration for each emitted phase.

use crate::{
    source::{Interpolation, StageType},
    target::TransitionType,
};

/// How source interpolation hints map onto target transition curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionMode {
    /// Intelligent mapping: eased curves become ease-in-out, instant stays instant.
    #[default]
    Smart,
    /// 1:1 schema mapping: bezier and spline pass through; `instant` still
    /// becomes linear here, a deliberate schema-level identity rather than a
    /// semantic one.
    Preserve,
    /// Force every transition to linear.
    Linear,
    /// Force every transition to instant.
    Instant,
}

impl TransitionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Preserve => "preserve",
            Self::Linear => "linear",
            Self::Instant => "instant",
        }
    }
}

// Pressure-delta thresholds (bar) and the durations (s) they select.
const FAST_RAMP_DELTA: f64 = 3.0;
const SLOW_RAMP_DELTA: f64 = 1.0;
const FAST_RAMP_SECONDS: f64 = 1.5;
const SLOW_RAMP_SECONDS: f64 = 7.0;
const NORMAL_RAMP_SECONDS: f64 = 4.0;
const MIN_PHASE_SECONDS: f64 = 1.0;

/// Pick the transition curve for a phase. Flow stages never ease, regardless
/// of mode or declared interpolation. Unrecognized interpolation hints fall
/// back to linear.
pub fn select_type(
    mode: TransitionMode,
    stage_type: &StageType,
    interpolation: &Interpolation,
) -> TransitionType {
    if *stage_type == StageType::Flow {
        return TransitionType::Instant;
    }

    match mode {
        TransitionMode::Smart => match interpolation {
            Interpolation::Linear | Interpolation::Step => TransitionType::Linear,
            Interpolation::Instant => TransitionType::Instant,
            Interpolation::Bezier | Interpolation::Spline => TransitionType::EaseInOut,
            Interpolation::Other(_) => TransitionType::Linear,
        },
        TransitionMode::Preserve => match interpolation {
            Interpolation::Linear | Interpolation::Step | Interpolation::Instant => {
                TransitionType::Linear
            }
            Interpolation::Bezier => TransitionType::Bezier,
            Interpolation::Spline => TransitionType::Spline,
            Interpolation::Other(_) => TransitionType::Linear,
        },
        TransitionMode::Linear => TransitionType::Linear,
        TransitionMode::Instant => TransitionType::Instant,
    }
}

/// Duration from the magnitude of a pressure change: big jumps ramp fast,
/// small adjustments ramp gently.
pub fn ramp_seconds(delta: f64) -> f64 {
    if delta > FAST_RAMP_DELTA {
        FAST_RAMP_SECONDS
    } else if delta < SLOW_RAMP_DELTA {
        SLOW_RAMP_SECONDS
    } else {
        NORMAL_RAMP_SECONDS
    }
}

/// Computed duration for a single-point phase without a `time` exit trigger.
/// Delta is measured from zero for pressure stages and is zero otherwise.
pub fn single_point_seconds(stage_type: &StageType, value: f64) -> f64 {
    let delta = if *stage_type == StageType::Pressure {
        value.abs()
    } else {
        0.0
    };
    ramp_seconds(delta).max(MIN_PHASE_SECONDS)
}

/// Transition duration for a split segment: the ramp table applied to the
/// value change between consecutive points (pressure stages only), with no
/// extra floor. Instant transitions are always zero-length.
pub fn segment_transition_seconds(
    kind: TransitionType,
    stage_type: &StageType,
    prev_value: f64,
    curr_value: f64,
) -> f64 {
    if kind == TransitionType::Instant {
        return 0.0;
    }
    let delta = if *stage_type == StageType::Pressure {
        (curr_value - prev_value).abs()
    } else {
        0.0
    };
    ramp_seconds(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_mode_mapping() {
        let t = StageType::Pressure;
        let m = TransitionMode::Smart;
        assert_eq!(select_type(m, &t, &Interpolation::Linear), TransitionType::Linear);
        assert_eq!(select_type(m, &t, &Interpolation::Step), TransitionType::Linear);
        assert_eq!(select_type(m, &t, &Interpolation::Instant), TransitionType::Instant);
        assert_eq!(select_type(m, &t, &Interpolation::Bezier), TransitionType::EaseInOut);
        assert_eq!(select_type(m, &t, &Interpolation::Spline), TransitionType::EaseInOut);
    }

    #[test]
    fn preserve_mode_mapping() {
        let t = StageType::Pressure;
        let m = TransitionMode::Preserve;
        assert_eq!(select_type(m, &t, &Interpolation::Linear), TransitionType::Linear);
        assert_eq!(select_type(m, &t, &Interpolation::Step), TransitionType::Linear);
        // A deliberate 1:1 schema mapping: instant becomes linear here.
        assert_eq!(select_type(m, &t, &Interpolation::Instant), TransitionType::Linear);
        assert_eq!(select_type(m, &t, &Interpolation::Bezier), TransitionType::Bezier);
        assert_eq!(select_type(m, &t, &Interpolation::Spline), TransitionType::Spline);
    }

    #[test]
    fn forcing_modes_override_interpolation() {
        let t = StageType::Pressure;
        for interp in [
            Interpolation::Linear,
            Interpolation::Instant,
            Interpolation::Bezier,
            Interpolation::Spline,
        ] {
            assert_eq!(
                select_type(TransitionMode::Linear, &t, &interp),
                TransitionType::Linear
            );
            assert_eq!(
                select_type(TransitionMode::Instant, &t, &interp),
                TransitionType::Instant
            );
        }
    }

    #[test]
    fn flow_stages_never_ease() {
        for mode in [
            TransitionMode::Smart,
            TransitionMode::Preserve,
            TransitionMode::Linear,
        ] {
            assert_eq!(
                select_type(mode, &StageType::Flow, &Interpolation::Bezier),
                TransitionType::Instant
            );
        }
    }

    #[test]
    fn unknown_interpolation_defaults_to_linear() {
        let interp = Interpolation::Other("wobble".to_string());
        assert_eq!(
            select_type(TransitionMode::Smart, &StageType::Pressure, &interp),
            TransitionType::Linear
        );
        assert_eq!(
            select_type(TransitionMode::Preserve, &StageType::Power, &interp),
            TransitionType::Linear
        );
    }

    #[test]
    fn ramp_table_thresholds() {
        assert_eq!(ramp_seconds(8.0), 1.5);
        assert_eq!(ramp_seconds(3.0), 4.0);
        assert_eq!(ramp_seconds(2.0), 4.0);
        assert_eq!(ramp_seconds(1.0), 4.0);
        assert_eq!(ramp_seconds(0.5), 7.0);
    }

    #[test]
    fn single_point_uses_zero_delta_for_non_pressure_stages() {
        // Non-pressure stages have delta 0: slowest ramp.
        assert_eq!(single_point_seconds(&StageType::Power, 100.0), 7.0);
        assert_eq!(single_point_seconds(&StageType::Pressure, 5.0), 4.0);
        assert_eq!(single_point_seconds(&StageType::Pressure, 8.0), 1.5);
    }

    #[test]
    fn instant_transition_has_zero_duration() {
        assert_eq!(
            segment_transition_seconds(TransitionType::Instant, &StageType::Pressure, 2.0, 9.0),
            0.0
        );
    }

    #[test]
    fn segment_transition_tracks_value_delta() {
        assert_eq!(
            segment_transition_seconds(TransitionType::Linear, &StageType::Pressure, 2.0, 6.0),
            1.5
        );
        assert_eq!(
            segment_transition_seconds(TransitionType::Linear, &StageType::Pressure, 6.0, 6.5),
            7.0
        );
        assert_eq!(
            segment_transition_seconds(TransitionType::Linear, &StageType::Power, 10.0, 90.0),
            7.0
        );
    }
}
