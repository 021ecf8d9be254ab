use thiserror::Error;

/// Fatal problems found while loading a form definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("definition is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("definition does not match the form schema:\n  {}", .violations.join("\n  "))]
    Structure { violations: Vec<String> },
    #[error("form schema could not be built: {0}")]
    SchemaUnavailable(String),
    #[error("definition has no pages")]
    NoPages,
    #[error("page path '{path}' must start with '/'")]
    InvalidPath { path: String },
    #[error("duplicate page path '{path}'")]
    DuplicatePage { path: String },
    #[error("duplicate section '{name}'")]
    DuplicateSection { name: String },
    #[error("duplicate list '{name}'")]
    DuplicateList { name: String },
    #[error("duplicate condition '{name}'")]
    DuplicateCondition { name: String },
    #[error("duplicate component '{name}' in scope '{scope}'")]
    DuplicateComponent { scope: String, name: String },
    #[error("component '{name}' on page '{page}' has the same name as a section")]
    FieldShadowsSection { page: String, name: String },
    #[error("page '{page}' references unknown section '{section}'")]
    UnknownSection { page: String, section: String },
    #[error("component '{component}' on page '{page}' references unknown list '{list}'")]
    UnknownList {
        page: String,
        component: String,
        list: String,
    },
    #[error("component '{component}' on page '{page}' must reference a list")]
    MissingList { page: String, component: String },
    #[error("{owner} references unknown condition '{condition}'")]
    UnknownCondition { owner: String, condition: String },
    #[error("page '{page}' links to unknown page '{target}'")]
    UnknownLink { page: String, target: String },
    #[error("start page '{path}' does not exist")]
    UnknownStartPage { path: String },
    #[error("condition '{condition}' references unknown field '{field}'")]
    UnknownField { condition: String, field: String },
    #[error("condition '{condition}' is malformed: {reason}")]
    MalformedCondition { condition: String, reason: String },
    #[error("condition cycle detected: {}", .chain.join(" -> "))]
    ConditionCycle { chain: Vec<String> },
    #[error("list '{list}' item {value} is not of type {expected}")]
    ListItemType {
        list: String,
        value: String,
        expected: &'static str,
    },
    #[error("component '{component}' has an invalid regex")]
    InvalidPattern {
        component: String,
        #[source]
        source: regex::Error,
    },
}

/// Failure while evaluating a condition. Never escapes the evaluator: it
/// is folded into "not satisfied".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("field '{field}' has no answer")]
    MissingField { field: String },
    #[error("field '{field}' cannot be compared: {detail}")]
    TypeMismatch { field: String, detail: String },
    #[error("unknown condition '{name}'")]
    UnknownCondition { name: String },
    #[error("relative date is out of range")]
    DateOutOfRange,
}

/// Problems with engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("'{value}' is not a valid ISO date (expected YYYY-MM-DD)")]
    InvalidDate { value: String },
}
