#![allow(missing_docs)]

pub mod answers;
pub mod components;
pub mod conditions;
pub mod config;
pub mod context;
pub mod dates;
pub mod error;
pub mod expr;
pub mod graph;
pub mod lists;
pub mod load;
pub mod model;
pub mod reconcile;
pub mod schema;
pub mod spec;
pub mod submission;
pub mod validate;

pub use answers::{Validated, ValidationError};
pub use components::{Component, ComponentKind};
pub use conditions::{CompiledCondition, ConditionTable, compile_condition, compile_conditions};
pub use config::{Clock, EngineConfig};
pub use context::EvaluationContext;
pub use error::{ConfigError, DefinitionError, EvalError};
pub use expr::{CompareOp, Expr, Operand};
pub use graph::Walk;
pub use lists::{List, ListItem, eligible_items};
pub use load::definition_schema;
pub use model::{FormModel, Link, Page, SUBMITTED_PAGE_PATH, Section};
pub use reconcile::{
    PageErrors, Reconciliation, ReconciliationReport, SectionErrors, SummaryRow,
};
pub use schema::{ComposedSchema, FieldRule, FieldSchema, SectionSchema, TextFormat};
pub use spec::FormDefinition;
pub use submission::PageSubmission;
