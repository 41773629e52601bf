use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A raw scalar from the source document.
///
/// Curve points, trigger values and limit values may hold a number or a
/// symbolic `$name` reference prior to resolution. Keeping integers and
/// floats apart means resolution never changes the numeric identity of a
/// value that was already concrete.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SourceValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl SourceValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// The full reference text (`$name...`) if this value is symbolic.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Text(s) if s.starts_with('$') => Some(s),
            _ => None,
        }
    }

    /// Numeric value, treating anything non-numeric as 0.0. Used only after
    /// the assembler has verified no references remain.
    pub fn to_f64_lossy(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }
}

impl Default for SourceValue {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl fmt::Display for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Which physical quantity a stage's curve controls.
///
/// Unrecognized strings are captured rather than rejected at parse time; the
/// pump mapper raises the hard error so callers get a translation-level
/// failure instead of a serde one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageType {
    Power,
    Flow,
    Pressure,
    Other(String),
}

impl StageType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Power => "power",
            Self::Flow => "flow",
            Self::Pressure => "pressure",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "power" => Self::Power,
            "flow" => Self::Flow,
            "pressure" => Self::Pressure,
            _ => Self::Other(s),
        })
    }
}

/// Source interpolation hint for a dynamics curve.
///
/// Unrecognized strings fall back to linear in the transition selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    Instant,
    Bezier,
    Spline,
    Other(String),
}

impl Interpolation {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linear => "linear",
            Self::Step => "step",
            Self::Instant => "instant",
            Self::Bezier => "bezier",
            Self::Spline => "spline",
            Self::Other(s) => s,
        }
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Linear
    }
}

impl Serialize for Interpolation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Interpolation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "linear" => Self::Linear,
            "step" => Self::Step,
            "instant" => Self::Instant,
            "bezier" => Self::Bezier,
            "spline" => Self::Spline,
            _ => Self::Other(s),
        })
    }
}

/// Exit-trigger kinds the source schema defines. The last three are not
/// expressible on the target machine and are dropped with a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Time,
    Weight,
    Pressure,
    Flow,
    PistonPosition,
    Power,
    UserInteraction,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Weight => "weight",
            Self::Pressure => "pressure",
            Self::Flow => "flow",
            Self::PistonPosition => "piston_position",
            Self::Power => "power",
            Self::UserInteraction => "user_interaction",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source comparison operator. Malformed operators are captured and treated
/// as `>=` downstream rather than failing the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    Ge,
    Le,
    Gt,
    Lt,
    Other(String),
}

impl Comparison {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Comparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Comparison {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.trim() {
            ">=" => Self::Ge,
            "<=" => Self::Le,
            ">" => Self::Gt,
            "<" => Self::Lt,
            _ => Self::Other(s),
        })
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SourceProfile {
    pub name: String,
    pub id: String,
    pub author: String,
    pub author_id: String,
    pub temperature: f64,
    pub final_weight: f64,
    #[serde(default)]
    pub variables: Vec<Variable>,
    pub stages: Vec<SourceStage>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Variable {
    pub key: String,
    /// May itself be a `$ref` to another key, forming a resolution chain.
    pub value: SourceValue,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SourceStage {
    pub name: String,
    /// Free-form semantic tag ("Fill", "bloom", ...), matched case-insensitively.
    pub key: String,
    #[serde(rename = "type")]
    pub stage_type: StageType,
    pub dynamics: Dynamics,
    #[serde(default)]
    pub exit_triggers: Vec<ExitTrigger>,
    #[serde(default)]
    pub limits: Vec<StageLimit>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Dynamics {
    /// Time-ordered `[time, value]` samples. May be empty.
    #[serde(default)]
    pub points: Vec<(SourceValue, SourceValue)>,
    #[serde(default)]
    pub interpolation: Interpolation,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExitTrigger {
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    #[serde(default)]
    pub value: SourceValue,
    /// For `time` triggers only: value is an offset from the stage start.
    #[serde(default)]
    pub relative: bool,
    pub comparison: Comparison,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StageLimit {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: SourceValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_roundtrip_preserves_numeric_identity() {
        let vals: Vec<SourceValue> = serde_json::from_str(r#"[15, 9.5, "$fill"]"#).unwrap();
        assert_eq!(vals[0], SourceValue::Int(15));
        assert_eq!(vals[1], SourceValue::Float(9.5));
        assert_eq!(vals[2], SourceValue::Text("$fill".to_string()));

        let s = serde_json::to_string(&vals).unwrap();
        assert_eq!(s, r#"[15,9.5,"$fill"]"#);
    }

    #[test]
    fn unknown_stage_type_is_captured_not_rejected() {
        let t: StageType = serde_json::from_str(r#""steam""#).unwrap();
        assert_eq!(t, StageType::Other("steam".to_string()));
        let t: StageType = serde_json::from_str(r#""pressure""#).unwrap();
        assert_eq!(t, StageType::Pressure);
    }

    #[test]
    fn unknown_comparison_is_captured() {
        let c: Comparison = serde_json::from_str(r#""=~""#).unwrap();
        assert_eq!(c, Comparison::Other("=~".to_string()));
        // Stray whitespace around a valid operator still parses.
        let c: Comparison = serde_json::from_str(r#"">= ""#).unwrap();
        assert_eq!(c, Comparison::Ge);
    }

    #[test]
    fn stage_json_roundtrip() {
        let json = r#"{
            "name": "Ramp",
            "key": "Extraction",
            "type": "pressure",
            "dynamics": {
                "points": [[0, 2], [5, "$peak"]],
                "interpolation": "bezier"
            },
            "exit_triggers": [
                {"type": "weight", "value": 36.0, "relative": false, "comparison": ">="}
            ]
        }"#;
        let stage: SourceStage = serde_json::from_str(json).unwrap();
        assert_eq!(stage.stage_type, StageType::Pressure);
        assert_eq!(stage.dynamics.interpolation, Interpolation::Bezier);
        assert_eq!(
            stage.dynamics.points[1].1,
            SourceValue::Text("$peak".to_string())
        );
        assert_eq!(stage.exit_triggers[0].kind, TriggerKind::Weight);
        assert_eq!(stage.exit_triggers[0].comparison, Comparison::Ge);

        let back = serde_json::to_string(&stage).unwrap();
        let again: SourceStage = serde_json::from_str(&back).unwrap();
        assert_eq!(again.dynamics.points.len(), 2);
    }
}
