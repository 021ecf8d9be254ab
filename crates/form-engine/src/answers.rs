use serde::Serialize;
use serde_json::Value;

/// A single user-facing validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted state path of the offending answer (`section.field.part`).
    pub path: String,
    /// Component name the error belongs to.
    pub name: String,
    /// Path of the page that asks the question.
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub message: String,
    pub code: String,
}

/// Outcome of validating a state against a composed schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validated {
    /// Validated state: normalised answers inside the schema only (unless
    /// stripping is disabled).
    pub value: Value,
    pub errors: Vec<ValidationError>,
    /// Paths of answers outside the schema; dropped from `value` when
    /// stripping is enabled. Never reported as errors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pruned: Vec<String>,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_for(&self, path: &str) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |error| error.path == path)
    }
}
