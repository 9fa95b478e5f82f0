use std::fmt;
use std::time::Duration;

/// A layout's own schema is internally inconsistent.
///
/// Raised while a schema is being defined, never while data is validated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaDefinitionError {
    #[error("schema `{schema}` declares field `{field}` more than once")]
    DuplicateField { schema: String, field: String },
    #[error("field `{field}` has inverted bounds: {detail}")]
    InvertedBounds { field: String, detail: String },
    #[error("enum field `{field}` has no allowed values")]
    EmptyEnum { field: String },
    #[error("default of field `{field}` violates its own constraints: {reason}")]
    InvalidDefault { field: String, reason: String },
}

/// Why a candidate value was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationReason {
    #[error("required field is missing")]
    Missing,
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("constraint violated: {detail}")]
    ConstraintViolated { detail: String },
}

/// Candidate data failed to satisfy a layout schema.
///
/// `field` is a path such as `items[1].heading`; `$` names the candidate root.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid `{field}`: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::Missing,
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::TypeMismatch { expected, found },
        }
    }

    pub fn constraint(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: ValidationReason::ConstraintViolated {
                detail: detail.into(),
            },
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.reason, ValidationReason::ConstraintViolated { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown layout `{0}`")]
    UnknownLayout(String),
    #[error("layout `{0}` is already registered")]
    DuplicateLayout(String),
    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),
}

/// Failure reported by a diagram-compiling collaborator for one attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiagramCompileError {
    #[error("failed to start diagram compiler `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("diagram compiler exited with {status}: {stderr}")]
    Exit { status: ExitCode, stderr: String },
    #[error("diagram compiler produced no SVG output")]
    EmptyOutput,
    #[error("diagram compiler timed out after {0:?}")]
    Timeout(Duration),
    #[error("diagram compile task aborted: {0}")]
    Aborted(String),
    #[error("{0}")]
    Rejected(String),
}

/// Exit status of an out-of-process compiler; `None` when killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub Option<i32>);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "status {code}"),
            None => write!(f, "a signal"),
        }
    }
}

/// Errors surfaced to callers of the slide pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field_and_reason() {
        let err = ValidationError::constraint("items", "expected at most 3 items, found 4");
        assert_eq!(
            err.to_string(),
            "invalid `items`: constraint violated: expected at most 3 items, found 4"
        );
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn exit_code_display_covers_signals() {
        assert_eq!(ExitCode(Some(2)).to_string(), "status 2");
        assert_eq!(ExitCode(None).to_string(), "a signal");
    }
}
