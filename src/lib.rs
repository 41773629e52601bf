#![forbid(unsafe_code)]

pub mod diag;
pub mod error;
pub mod exit;
pub mod resolve;
pub mod source;
pub mod target;
pub mod transition;
pub mod translate;

pub use diag::Warning;
pub use error::{BrewvertError, BrewvertResult, UnresolvedRef};
pub use source::{
    Comparison, Dynamics, ExitTrigger, Interpolation, SourceProfile, SourceStage, SourceValue,
    StageType, TriggerKind, Variable,
};
pub use target::{
    ExitTarget, Operator, PumpSettings, PumpTarget, TargetKind, TargetPhase, TargetProfile,
    TransitionSettings, TransitionType,
};
pub use transition::TransitionMode;
pub use translate::{
    MIN_BLOOM_PRESSURE, TranslateOptions, Translation, parse_phase_name, phase_name, translate,
};
