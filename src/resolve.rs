//! Symbolic variable resolution over a source document.
//!
//! Values in curve points, exit triggers and limits may be `$name` references
//! into the document's variable table; variable values may themselves be
//! references, forming chains. Resolution is a depth-bounded recursive
//! descent — the ceiling doubles as cycle detection.

use std::collections::{HashMap, HashSet};

use crate::{
    diag::Warning,
    error::{BrewvertError, BrewvertResult, UnresolvedRef},
    source::{SourceProfile, SourceValue},
};

pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// Extract the identifier of a reference: a leading `$` followed by a maximal
/// run of word characters. Returns `None` when the run is empty.
fn reference_ident(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('$')?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if end == 0 { None } else { Some(&rest[..end]) }
}

struct Resolver<'a> {
    lookup: HashMap<&'a str, &'a SourceValue>,
    max_depth: u32,
    /// Keys consulted at least once, including chain intermediates.
    used: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn resolve(&mut self, value: &SourceValue, depth: u32) -> BrewvertResult<SourceValue> {
        if depth > self.max_depth {
            return Err(BrewvertError::ResolutionDepth {
                max_depth: self.max_depth,
            });
        }

        let Some(text) = value.reference() else {
            return Ok(value.clone());
        };
        let Some(ident) = reference_ident(text) else {
            return Ok(value.clone());
        };
        let Some(raw) = self.lookup.get(ident).copied() else {
            // Unknown ident is not an error here; the assembler's post-scan
            // decides whether it is fatal.
            return Ok(value.clone());
        };

        self.used.insert(ident.to_string());
        self.resolve(raw, depth + 1)
    }
}

/// Replace every `$name` reference in points, triggers and limits with its
/// resolved value, in place. Integer-valued variables stay integers and
/// float-valued ones stay floats (`SourceValue` carries the distinction).
///
/// Returns the unused-variable diagnostic, if any. Fails when a resolution
/// chain exceeds `max_depth`.
pub fn resolve_variables(
    profile: &mut SourceProfile,
    max_depth: u32,
) -> BrewvertResult<Vec<Warning>> {
    if profile.variables.is_empty() {
        return Ok(Vec::new());
    }

    let mut lookup = HashMap::new();
    for var in &profile.variables {
        // Later definitions of the same key shadow earlier ones.
        lookup.insert(var.key.as_str(), &var.value);
    }

    let mut resolver = Resolver {
        lookup,
        max_depth,
        used: HashSet::new(),
    };

    let mut stages = std::mem::take(&mut profile.stages);
    let result = (|| -> BrewvertResult<()> {
        for stage in &mut stages {
            for point in &mut stage.dynamics.points {
                point.0 = resolver.resolve(&point.0, 0)?;
                point.1 = resolver.resolve(&point.1, 0)?;
            }
            for trigger in &mut stage.exit_triggers {
                trigger.value = resolver.resolve(&trigger.value, 0)?;
            }
            for limit in &mut stage.limits {
                limit.value = resolver.resolve(&limit.value, 0)?;
            }
        }
        Ok(())
    })();
    profile.stages = stages;
    result?;

    let unused: Vec<String> = profile
        .variables
        .iter()
        .filter(|v| !resolver.used.contains(&v.key))
        .map(|v| v.key.clone())
        .collect();

    if unused.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![Warning::UnusedVariables(unused)])
    }
}

/// Locate every value still holding a `$ref` with no matching variable key.
/// The assembler turns a non-empty result into one aggregated fatal error.
pub fn find_unresolved(profile: &SourceProfile) -> Vec<UnresolvedRef> {
    let keys: HashSet<&str> = profile.variables.iter().map(|v| v.key.as_str()).collect();
    let mut found = Vec::new();

    let mut check = |value: &SourceValue, location: String| {
        if let Some(text) = value.reference()
            && !keys.contains(&text[1..])
        {
            found.push(UnresolvedRef {
                reference: text.to_string(),
                location,
            });
        }
    };

    for (i, stage) in profile.stages.iter().enumerate() {
        for (j, point) in stage.dynamics.points.iter().enumerate() {
            check(&point.0, format!("stages[{i}].dynamics.points[{j}][0]"));
            check(&point.1, format!("stages[{i}].dynamics.points[{j}][1]"));
        }
        for (k, trigger) in stage.exit_triggers.iter().enumerate() {
            check(&trigger.value, format!("stages[{i}].exit_triggers[{k}].value"));
        }
        for (k, limit) in stage.limits.iter().enumerate() {
            check(&limit.value, format!("stages[{i}].limits[{k}].value"));
        }
    }

    found
}
