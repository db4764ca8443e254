use thiserror::Error;

/// A malformed or unsupported declaration, raised when a tensor type is
/// built. Never produced per call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("{item} not a valid type argument")]
    InvalidItem { item: String },

    #[error("invalid spec literal `{literal}`: {message}")]
    Literal { literal: String, message: String },

    #[error("cannot overwrite field `{field}` of {class}")]
    Overwrite { class: String, field: String },

    /// Well-formed, but the resolver cannot handle it yet.
    #[error("{message}")]
    Unsupported { message: String },
}

impl SpecError {
    pub fn invalid(item: impl std::fmt::Display) -> Self {
        Self::InvalidItem {
            item: item.to_string(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// A contract violation found while checking one call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("{argname} has {rank} dimensions but type requires at least {required}")]
    Rank {
        argname: String,
        rank: usize,
        required: usize,
    },

    #[error("Dimension '{name}' of inconsistent size. Got both {found} and {bound}.")]
    InconsistentSize {
        name: String,
        bound: usize,
        found: usize,
    },

    #[error("Dimension group '{name}' of inconsistent shape. Got both {found:?} and {bound:?}.")]
    InconsistentGroupShape {
        name: String,
        bound: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Symbol '{name}' is used both as a single dimension and as a dimension group")]
    InconsistentSymbolKind { name: String },

    #[error(
        "Could not resolve the size of all dimension groups in {argnames:?}. Either the \
         specification is ambiguous (e.g. `a: ..., b: ...`), or a repeated named group \
         is never pinned down by another argument. Removing the group names resolves \
         this, at the cost of that checking."
    )]
    Ambiguous { argnames: Vec<String> },

    #[error("{argname} must be of type {expected}, got type {actual} instead.")]
    TypeMismatch {
        argname: String,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Specification(#[from] SpecError),

    #[error("internal resolver error: {0}")]
    Internal(String),
}

/// Failure to load a signature or call file.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Failed to read signature file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to replay a recorded call against its signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("no signature for function `{function}`")]
    UnknownFunction { function: String },

    #[error("call to `{function}` is missing argument `{argument}`")]
    MissingArgument { function: String, argument: String },

    #[error(transparent)]
    Check(#[from] CheckError),
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        write!(f, "[{prefix}] {}: {}", self.rule, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_error() {
        let v = Violation {
            severity: Severity::Error,
            rule: "SPEC-001".to_string(),
            message: "bad literal".to_string(),
            location: Some("functions.f.args.x".to_string()),
        };
        let s = v.to_string();
        assert!(s.contains("[ERROR]"));
        assert!(s.contains("SPEC-001"));
        assert!(s.contains("bad literal"));
    }

    #[test]
    fn violation_display_warning() {
        let v = Violation {
            severity: Severity::Warning,
            rule: "SPEC-005".to_string(),
            message: "no tensor specs".to_string(),
            location: None,
        };
        assert!(v.to_string().contains("[WARN]"));
    }

    #[test]
    fn inconsistent_size_names_both_sizes() {
        let err = CheckError::InconsistentSize {
            name: "batch".to_string(),
            bound: 2,
            found: 3,
        };
        let s = err.to_string();
        assert!(s.contains("'batch'"));
        assert!(s.contains('2'));
        assert!(s.contains('3'));
    }

    #[test]
    fn group_shape_renders_tuples() {
        let err = CheckError::InconsistentGroupShape {
            name: "g".to_string(),
            bound: vec![1, 4],
            found: vec![],
        };
        let s = err.to_string();
        assert!(s.contains("[1, 4]"));
        assert!(s.contains("[]"));
    }

    #[test]
    fn spec_error_is_transparent_inside_check_error() {
        let err: CheckError = SpecError::invalid("1.5").into();
        assert_eq!(err.to_string(), "1.5 not a valid type argument");
    }

    #[test]
    fn unsupported_is_flagged() {
        let err = SpecError::Unsupported {
            message: "x".to_string(),
        };
        assert!(err.is_unsupported());
        assert!(!SpecError::invalid("y").is_unsupported());
    }

    #[test]
    fn signature_error_io() {
        let err = SignatureError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        ));
        assert!(err.to_string().contains("Failed to read"));
    }
}
