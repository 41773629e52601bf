//! Exit-trigger conversion: source stop conditions to target exit targets.
//!
//! Applied once per stage, against the stage's trigger list, and attached to
//! the final emitted phase only. Handles the type and operator mappings,
//! drops unsupported kinds, deduplicates repeated kinds (first wins), and
//! documents logically-impossible trigger pairs before deduplication.

use std::collections::HashMap;

use crate::{
    diag::{Condition, Warning},
    source::{Comparison, ExitTrigger, TriggerKind},
    target::{ExitTarget, Operator, TargetKind},
};

fn target_kind(kind: TriggerKind) -> Option<TargetKind> {
    match kind {
        TriggerKind::Weight => Some(TargetKind::Volumetric),
        TriggerKind::Time => Some(TargetKind::Time),
        TriggerKind::Pressure => Some(TargetKind::Pressure),
        TriggerKind::Flow => Some(TargetKind::Flow),
        TriggerKind::PistonPosition | TriggerKind::Power | TriggerKind::UserInteraction => None,
    }
}

fn operator(comparison: &Comparison) -> Operator {
    match comparison {
        Comparison::Ge => Operator::Gte,
        Comparison::Le => Operator::Lte,
        Comparison::Gt => Operator::Gt,
        Comparison::Lt => Operator::Lt,
        // Malformed operators are permissive, never fatal.
        Comparison::Other(_) => Operator::Gte,
    }
}

fn condition(trigger: &ExitTrigger) -> Condition {
    Condition {
        comparison: trigger.comparison.clone(),
        value: trigger.value.clone(),
    }
}

/// Whether two same-kind trigger conditions can never both hold.
fn pair_conflicts(a: &ExitTrigger, b: &ExitTrigger) -> bool {
    use Comparison::{Ge, Gt, Le, Lt};
    let (av, bv) = (a.value.to_f64_lossy(), b.value.to_f64_lossy());
    match (&a.comparison, &b.comparison) {
        (Ge, Le) => av > bv,
        (Le, Ge) => bv > av,
        (Gt, Lt) => av >= bv,
        (Lt, Gt) => bv >= av,
        (Ge, Lt) => av >= bv,
        (Lt, Ge) => bv >= av,
        (Le, Gt) => av < bv,
        (Gt, Le) => bv < av,
        _ => false,
    }
}

/// Pairwise scan over same-kind triggers for impossible condition pairs.
/// Detection only documents the hazard; deduplication still decides which
/// trigger survives.
pub fn detect_conflicting_triggers(triggers: &[ExitTrigger]) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (i, a) in triggers.iter().enumerate() {
        for b in &triggers[i + 1..] {
            if a.kind == b.kind && pair_conflicts(a, b) {
                warnings.push(Warning::ConflictingTriggers {
                    kind: a.kind,
                    first: condition(a),
                    second: condition(b),
                });
            }
        }
    }
    warnings
}

/// Convert a stage's exit triggers to exit targets.
///
/// `stage_start_time` is the accumulated elapsed time at the start of the
/// stage; relative `time` triggers are rebased onto it so exported targets
/// are absolute document-level times.
///
/// Always returns both lists, even when both are empty.
pub fn convert_exit_triggers(
    triggers: &[ExitTrigger],
    stage_start_time: f64,
) -> (Vec<ExitTarget>, Vec<Warning>) {
    let mut warnings = detect_conflicting_triggers(triggers);
    let mut duplicates = Vec::new();
    let mut targets = Vec::new();
    let mut seen: HashMap<TriggerKind, Condition> = HashMap::new();

    for trigger in triggers {
        let Some(kind) = target_kind(trigger.kind) else {
            warnings.push(Warning::UnsupportedTrigger { kind: trigger.kind });
            continue;
        };

        if let Some(kept) = seen.get(&trigger.kind) {
            duplicates.push(Warning::DuplicateTrigger {
                kind: trigger.kind,
                dropped: condition(trigger),
                kept: kept.clone(),
            });
            continue;
        }
        seen.insert(trigger.kind, condition(trigger));

        let mut value = trigger.value.to_f64_lossy();
        if trigger.kind == TriggerKind::Time && trigger.relative {
            value += stage_start_time;
        }

        targets.push(ExitTarget {
            kind,
            operator: operator(&trigger.comparison),
            value,
        });
    }

    warnings.extend(duplicates);
    (targets, warnings)
}
