use std::fmt;

use crate::source::{Comparison, SourceValue, TriggerKind};

/// Typical brewing pressure range (bar). Values outside it are suspicious
/// but never fatal.
pub const MIN_PRESSURE: f64 = 1.0;
pub const MAX_PRESSURE: f64 = 10.0;

/// Semantic diagnostics the engine raises alongside a successful translation.
///
/// None of these abort a translation; a caller enforcing warnings-as-errors
/// does so itself. The `Display` output is the user-facing message, with a
/// `[Validation]` or `[Unsupported]` tag on the trigger-level findings.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// Variables defined in the table but never referenced anywhere.
    UnusedVariables(Vec<String>),
    /// Pressure-stage value outside the typical brewing range.
    PressureOutOfRange { stage: String, pressure: f64 },
    /// Trigger kind the target machine cannot express; dropped.
    UnsupportedTrigger { kind: TriggerKind },
    /// Second (or later) trigger of an already-seen kind; dropped.
    DuplicateTrigger {
        kind: TriggerKind,
        dropped: Condition,
        kept: Condition,
    },
    /// A same-kind trigger pair no value can satisfy simultaneously.
    ConflictingTriggers {
        kind: TriggerKind,
        first: Condition,
        second: Condition,
    },
}

/// One side of a trigger condition, kept in source form for messages.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub comparison: Comparison,
    pub value: SourceValue,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnusedVariables(keys) => {
                write!(f, "Unused variables: {}", keys.join(", "))
            }
            Self::PressureOutOfRange { stage, pressure } => write!(
                f,
                "Stage '{stage}': pressure {pressure:.1} bar is outside typical range \
                 ({MIN_PRESSURE}-{MAX_PRESSURE} bar). Check if this is intentional."
            ),
            Self::UnsupportedTrigger { kind } => write!(
                f,
                "[Unsupported] {kind} exit trigger is not supported by the target machine. \
                 This trigger will be ignored."
            ),
            Self::DuplicateTrigger {
                kind,
                dropped,
                kept,
            } => write!(
                f,
                "[Validation] Duplicate {kind} trigger: {kind} {} {} (already have {kind} {} {}). \
                 Only the first trigger will be used.",
                dropped.comparison, dropped.value, kept.comparison, kept.value
            ),
            Self::ConflictingTriggers {
                kind,
                first,
                second,
            } => write!(
                f,
                "[Validation] Conflicting {kind} triggers: {kind} {} {} AND {kind} {} {} - \
                 conditions can never both be true. Only the first trigger will be used.",
                first.comparison, first.value, second.comparison, second.value
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_is_tagged() {
        let w = Warning::UnsupportedTrigger {
            kind: TriggerKind::PistonPosition,
        };
        let s = w.to_string();
        assert!(s.starts_with("[Unsupported]"));
        assert!(s.contains("piston_position"));
    }

    #[test]
    fn duplicate_message_names_both_conditions() {
        let w = Warning::DuplicateTrigger {
            kind: TriggerKind::Weight,
            dropped: Condition {
                comparison: Comparison::Ge,
                value: SourceValue::Float(30.0),
            },
            kept: Condition {
                comparison: Comparison::Ge,
                value: SourceValue::Float(36.0),
            },
        };
        let s = w.to_string();
        assert!(s.starts_with("[Validation]"));
        assert!(s.contains("weight >= 30"));
        assert!(s.contains("weight >= 36"));
        assert!(s.contains("Only the first trigger will be used"));
    }

    #[test]
    fn conflict_message_states_impossibility() {
        let w = Warning::ConflictingTriggers {
            kind: TriggerKind::Pressure,
            first: Condition {
                comparison: Comparison::Ge,
                value: SourceValue::Float(4.0),
            },
            second: Condition {
                comparison: Comparison::Le,
                value: SourceValue::Float(2.0),
            },
        };
        let s = w.to_string();
        assert!(s.contains("pressure >= 4 AND pressure <= 2"));
        assert!(s.contains("can never both be true"));
    }

    #[test]
    fn unused_variables_joined_into_one_message() {
        let w = Warning::UnusedVariables(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(w.to_string(), "Unused variables: a, b");
    }
}
