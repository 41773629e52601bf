//! The translation engine: source stages in, target phases out.
//!
//! Order of operations per document: resolve variables, fail on any `$ref`
//! left dangling, then walk the stages in order. Each stage's curve is
//! segmented into one phase per point pair (or a single phase for degenerate
//! curves), pump settings are derived per segment, a transition is selected,
//! and exit targets are attached to the stage's terminal segment only.

use crate::{
    diag::{MAX_PRESSURE, MIN_PRESSURE, Warning},
    error::{BrewvertError, BrewvertResult},
    exit::convert_exit_triggers,
    resolve::{DEFAULT_MAX_DEPTH, find_unresolved, resolve_variables},
    source::{SourceProfile, SourceStage, StageType, TriggerKind},
    target::{
        PumpSettings, PumpTarget, TargetPhase, TargetProfile, TransitionSettings, TransitionType,
    },
    transition::{
        TransitionMode, segment_transition_seconds, select_type, single_point_seconds,
    },
};

/// Floor for a bloom hold: even a near-zero flow request becomes a gentle
/// pressure hold at this level.
pub const MIN_BLOOM_PRESSURE: f64 = 2.0;

const POWER_TO_PRESSURE_SCALE: f64 = 10.0;
const POWER_CARRIER_FLOW: f64 = 10.0;
const FLOW_CARRIER_PRESSURE: f64 = 12.0;
const PRESSURE_CARRIER_FLOW: f64 = 10.0;

/// Guard against malformed or duplicate curve timestamps.
const MIN_SEGMENT_SECONDS: f64 = 0.1;

#[derive(Clone, Debug)]
pub struct TranslateOptions {
    pub transition_mode: TransitionMode,
    /// Recursion ceiling for variable resolution.
    pub max_depth: u32,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            transition_mode: TransitionMode::Smart,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A successful translation: the document plus every diagnostic raised along
/// the way. Diagnostics never abort; callers wanting warnings-as-errors
/// enforce that themselves.
#[derive(Clone, Debug)]
pub struct Translation {
    pub profile: TargetProfile,
    pub warnings: Vec<Warning>,
}

/// Split-name suffix contract: `"<base> (<i>/<N>)"`. The companion
/// comparison tool re-derives phase-to-stage correspondence from this
/// format, so it must stay stable.
pub fn phase_name(base: &str, index: usize, total: usize) -> String {
    format!("{base} ({index}/{total})")
}

/// Inverse of [`phase_name`]. Returns `None` for unsuffixed names.
pub fn parse_phase_name(name: &str) -> Option<(&str, usize, usize)> {
    let rest = name.strip_suffix(')')?;
    let (base, frac) = rest.rsplit_once(" (")?;
    let (i, n) = frac.split_once('/')?;
    Some((base, i.parse().ok()?, n.parse().ok()?))
}

/// Translate a resolved-or-unresolved source document into a target profile.
#[tracing::instrument(skip(profile, options), fields(profile = %profile.name))]
pub fn translate(
    profile: &SourceProfile,
    options: &TranslateOptions,
) -> BrewvertResult<Translation> {
    let mut working = profile.clone();
    let mut warnings = resolve_variables(&mut working, options.max_depth)?;

    let unresolved = find_unresolved(&working);
    if !unresolved.is_empty() {
        return Err(BrewvertError::UndefinedVariables { refs: unresolved });
    }

    let mut phases = Vec::new();
    let mut elapsed = 0.0_f64;
    for stage in &working.stages {
        let stage_start = elapsed;
        let emitted = translate_stage(
            stage,
            working.temperature,
            stage_start,
            options.transition_mode,
            &mut warnings,
        )?;
        tracing::debug!(
            stage = %stage.name,
            phases = emitted.len(),
            stage_start,
            "stage translated"
        );
        for phase in emitted {
            elapsed += phase.duration;
            phases.push(phase);
        }
    }

    let target = TargetProfile {
        label: working.name.clone(),
        kind: "pro".to_string(),
        description: format!(
            "Source ID: {}\nAuthor: {}\nOriginal Name: {}",
            working.id, working.author, working.name
        ),
        temperature: working.temperature,
        utility: false,
        phases,
    };

    Ok(Translation {
        profile: target,
        warnings,
    })
}

/// Target phase type for a source stage key, matched case-insensitively.
fn phase_kind(key: &str) -> String {
    match key.to_ascii_lowercase().as_str() {
        "fill" | "bloom" | "blooming" => "preinfusion".to_string(),
        "extraction" => "brew".to_string(),
        _ => key.to_string(),
    }
}

fn is_bloom(key: &str) -> bool {
    key.eq_ignore_ascii_case("bloom") || key.eq_ignore_ascii_case("blooming")
}

/// Pump configuration for one emitted segment, from its terminal value `v`.
/// The bloom override wins over the stage type: a bloom is a zero-flow
/// pressure hold, never a flow-controlled soak.
fn pump_settings(
    stage: &SourceStage,
    value: f64,
    warnings: &mut Vec<Warning>,
) -> BrewvertResult<PumpSettings> {
    if is_bloom(&stage.key) {
        return Ok(PumpSettings {
            target: PumpTarget::Pressure,
            pressure: value.max(MIN_BLOOM_PRESSURE),
            flow: 0.0,
        });
    }

    match &stage.stage_type {
        StageType::Power => Ok(PumpSettings {
            target: PumpTarget::Pressure,
            pressure: value / POWER_TO_PRESSURE_SCALE,
            flow: POWER_CARRIER_FLOW,
        }),
        StageType::Flow => Ok(PumpSettings {
            target: PumpTarget::Flow,
            pressure: FLOW_CARRIER_PRESSURE,
            flow: value,
        }),
        StageType::Pressure => {
            if !(MIN_PRESSURE..=MAX_PRESSURE).contains(&value) {
                warnings.push(Warning::PressureOutOfRange {
                    stage: stage.name.clone(),
                    pressure: value,
                });
            }
            Ok(PumpSettings {
                target: PumpTarget::Pressure,
                pressure: value,
                flow: PRESSURE_CARRIER_FLOW,
            })
        }
        StageType::Other(other) => Err(BrewvertError::UnknownStageType(other.clone())),
    }
}

fn translate_stage(
    stage: &SourceStage,
    temperature: f64,
    stage_start: f64,
    mode: TransitionMode,
    warnings: &mut Vec<Warning>,
) -> BrewvertResult<Vec<TargetPhase>> {
    let points: Vec<(f64, f64)> = stage
        .dynamics
        .points
        .iter()
        .map(|(t, v)| (t.to_f64_lossy(), v.to_f64_lossy()))
        .collect();

    if points.len() <= 1 {
        let phase = translate_single_point(stage, &points, temperature, stage_start, mode, warnings)?;
        return Ok(vec![phase]);
    }

    let segments = points.len() - 1;
    let mut phases = Vec::with_capacity(segments);
    for i in 1..points.len() {
        let (t_prev, v_prev) = points[i - 1];
        let (t_curr, v_curr) = points[i];

        let mut duration = t_curr - t_prev;
        if duration <= 0.0 {
            duration = MIN_SEGMENT_SECONDS;
        }

        let pump = pump_settings(stage, v_curr, warnings)?;
        let kind = select_type(mode, &stage.stage_type, &stage.dynamics.interpolation);
        let transition = TransitionSettings {
            kind,
            duration: segment_transition_seconds(kind, &stage.stage_type, v_prev, v_curr),
            adaptive: false,
        };

        // Intermediate segments are waypoints, not decision points; exit
        // targets belong to the terminal segment only.
        let targets = if i == segments {
            let (targets, exit_warnings) = convert_exit_triggers(&stage.exit_triggers, stage_start);
            warnings.extend(exit_warnings);
            targets
        } else {
            Vec::new()
        };

        phases.push(TargetPhase {
            name: phase_name(&stage.name, i, segments),
            phase: phase_kind(&stage.key),
            valve: 1,
            duration,
            temperature,
            transition,
            pump,
            targets,
        });
    }

    Ok(phases)
}

fn translate_single_point(
    stage: &SourceStage,
    points: &[(f64, f64)],
    temperature: f64,
    stage_start: f64,
    mode: TransitionMode,
    warnings: &mut Vec<Warning>,
) -> BrewvertResult<TargetPhase> {
    // An empty curve degrades to a zero target rather than failing.
    let value = points.first().map(|&(_, v)| v).unwrap_or(0.0);
    let pump = pump_settings(stage, value, warnings)?;

    let time_trigger = stage
        .exit_triggers
        .iter()
        .find(|t| t.kind == TriggerKind::Time)
        .map(|t| t.value.to_f64_lossy());

    let mut duration = match time_trigger {
        Some(seconds) => seconds,
        None => single_point_seconds(&stage.stage_type, value),
    };
    if duration <= 0.0 {
        duration = MIN_SEGMENT_SECONDS;
    }

    let kind = select_type(mode, &stage.stage_type, &stage.dynamics.interpolation);
    let transition = TransitionSettings {
        kind,
        duration: if kind == TransitionType::Instant {
            0.0
        } else {
            duration
        },
        adaptive: false,
    };

    let (targets, exit_warnings) = convert_exit_triggers(&stage.exit_triggers, stage_start);
    warnings.extend(exit_warnings);

    Ok(TargetPhase {
        name: stage.name.clone(),
        phase: phase_kind(&stage.key),
        valve: 1,
        duration,
        temperature,
        transition,
        pump,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_contract_roundtrips() {
        let name = phase_name("Pressure Ramp", 2, 5);
        assert_eq!(name, "Pressure Ramp (2/5)");
        assert_eq!(parse_phase_name(&name), Some(("Pressure Ramp", 2, 5)));
    }

    #[test]
    fn unsuffixed_names_do_not_parse() {
        assert_eq!(parse_phase_name("Preinfusion"), None);
        assert_eq!(parse_phase_name("Odd (name)"), None);
        assert_eq!(parse_phase_name("Trailing (2/)"), None);
    }

    #[test]
    fn base_names_containing_parens_survive() {
        let name = phase_name("Hold (soft)", 1, 2);
        assert_eq!(parse_phase_name(&name), Some(("Hold (soft)", 1, 2)));
    }

    #[test]
    fn stage_keys_map_case_insensitively() {
        assert_eq!(phase_kind("Fill"), "preinfusion");
        assert_eq!(phase_kind("fill"), "preinfusion");
        assert_eq!(phase_kind("Bloom"), "preinfusion");
        assert_eq!(phase_kind("blooming"), "preinfusion");
        assert_eq!(phase_kind("Extraction"), "brew");
        assert_eq!(phase_kind("custom_key"), "custom_key");
    }

    #[test]
    fn bloom_detection_is_exact_word() {
        assert!(is_bloom("bloom"));
        assert!(is_bloom("Blooming"));
        assert!(!is_bloom("bloomer"));
        assert!(!is_bloom("pre-bloom"));
    }
}
