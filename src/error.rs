pub type BrewvertResult<T> = Result<T, BrewvertError>;

#[derive(thiserror::Error, Debug)]
pub enum BrewvertError {
    /// One or more `$refs` survived resolution with no matching variable key.
    /// Aggregated: `refs` lists every occurrence with its structural path.
    #[error("undefined variable reference(s): {}", format_refs(.refs))]
    UndefinedVariables { refs: Vec<UnresolvedRef> },

    #[error("variable resolution exceeded max depth {max_depth}")]
    ResolutionDepth { max_depth: u32 },

    #[error("unknown stage type '{0}': expected 'power', 'flow', or 'pressure'")]
    UnknownStageType(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A `$ref` that matched no variable key, with the path of the field holding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedRef {
    pub reference: String,
    pub location: String,
}

fn format_refs(refs: &[UnresolvedRef]) -> String {
    let parts: Vec<String> = refs
        .iter()
        .map(|r| format!("{} at {}", r.reference, r.location))
        .collect();
    parts.join("; ")
}

impl BrewvertError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            BrewvertError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            BrewvertError::ResolutionDepth { max_depth: 10 }
                .to_string()
                .contains("max depth 10")
        );
        assert!(
            BrewvertError::UnknownStageType("steam".to_string())
                .to_string()
                .contains("'steam'")
        );
    }

    #[test]
    fn undefined_variables_lists_every_occurrence() {
        let err = BrewvertError::UndefinedVariables {
            refs: vec![
                UnresolvedRef {
                    reference: "$a".to_string(),
                    location: "stages[0].dynamics.points[0][1]".to_string(),
                },
                UnresolvedRef {
                    reference: "$b".to_string(),
                    location: "stages[2].exit_triggers[0].value".to_string(),
                },
            ],
        };
        let s = err.to_string();
        assert!(s.contains("$a at stages[0].dynamics.points[0][1]"));
        assert!(s.contains("$b at stages[2].exit_triggers[0].value"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = BrewvertError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
