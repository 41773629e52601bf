use std::fmt;

use crate::error::{BrewvertError, BrewvertResult};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TargetProfile {
    pub label: String,
    /// Always "pro" for translated profiles.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub temperature: f64,
    pub utility: bool,
    pub phases: Vec<TargetPhase>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TargetPhase {
    /// Stage name, suffixed `"(i/N)"` when the stage was split.
    pub name: String,
    /// "preinfusion", "brew", or a passthrough of the source stage key.
    pub phase: String,
    pub valve: u8,
    pub duration: f64,
    pub temperature: f64,
    pub transition: TransitionSettings,
    pub pump: PumpSettings,
    pub targets: Vec<ExitTarget>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransitionSettings {
    #[serde(rename = "type")]
    pub kind: TransitionType,
    pub duration: f64,
    pub adaptive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransitionType {
    #[serde(rename = "instant")]
    Instant,
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "ease-in-out")]
    EaseInOut,
    #[serde(rename = "bezier")]
    Bezier,
    #[serde(rename = "spline")]
    Spline,
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instant => "instant",
            Self::Linear => "linear",
            Self::EaseInOut => "ease-in-out",
            Self::Bezier => "bezier",
            Self::Spline => "spline",
        })
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PumpSettings {
    pub target: PumpTarget,
    /// Bar, 0..=15 on the target machine.
    pub pressure: f64,
    /// ml/s, >= 0.
    pub flow: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpTarget {
    Pressure,
    Flow,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExitTarget {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub operator: Operator,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Volumetric,
    Time,
    Pressure,
    Flow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Gte,
    Lte,
    Gt,
    Lt,
}

impl TargetProfile {
    /// Schema bounds, mirrored from the target machine's document format.
    pub fn validate(&self) -> BrewvertResult<()> {
        if !(0.0..=150.0).contains(&self.temperature) {
            return Err(BrewvertError::validation(
                "profile temperature must be within 0-150 °C",
            ));
        }

        for phase in &self.phases {
            if phase.duration <= 0.0 {
                return Err(BrewvertError::validation(format!(
                    "phase '{}' has non-positive duration",
                    phase.name
                )));
            }
            if !(0.0..=150.0).contains(&phase.temperature) {
                return Err(BrewvertError::validation(format!(
                    "phase '{}' temperature must be within 0-150 °C",
                    phase.name
                )));
            }
            if phase.transition.duration < 0.0 {
                return Err(BrewvertError::validation(format!(
                    "phase '{}' has negative transition duration",
                    phase.name
                )));
            }
            if !(0.0..=15.0).contains(&phase.pump.pressure) {
                return Err(BrewvertError::validation(format!(
                    "phase '{}' pump pressure {} bar is outside 0-15",
                    phase.name, phase.pump.pressure
                )));
            }
            if phase.pump.flow < 0.0 {
                return Err(BrewvertError::validation(format!(
                    "phase '{}' has negative pump flow",
                    phase.name
                )));
            }
        }

        Ok(())
    }
}
