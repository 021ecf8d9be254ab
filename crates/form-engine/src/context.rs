use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::Value;
use time::Date;
use tracing::debug;

use crate::conditions::ConditionTable;
use crate::error::EvalError;

/// Per-pass view over an answer state.
///
/// Raw answers are addressed by dotted path (`section.field`); every
/// compiled condition is addressable by name and computed on first use,
/// then memoised for the rest of the pass. A context is never shared
/// between passes.
pub struct EvaluationContext<'a> {
    state: &'a Value,
    conditions: &'a ConditionTable,
    today: Date,
    resolved: RefCell<BTreeMap<String, Result<bool, EvalError>>>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(state: &'a Value, conditions: &'a ConditionTable, today: Date) -> Self {
        Self {
            state,
            conditions,
            today,
            resolved: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn state(&self) -> &'a Value {
        self.state
    }

    pub fn today(&self) -> Date {
        self.today
    }

    /// Looks up a raw answer. Paths are dot separated; numeric segments
    /// index into arrays.
    pub fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut current = self.state;
        for segment in path.split('.') {
            if segment.is_empty() {
                continue;
            }
            current = match current {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => current.get(segment)?,
            };
        }
        Some(current)
    }

    /// Value of a named condition, or the error that prevented it.
    pub fn condition(&self, name: &str) -> Result<bool, EvalError> {
        if let Some(result) = self.resolved.borrow().get(name) {
            return result.clone();
        }
        let compiled = self
            .conditions
            .get(name)
            .ok_or_else(|| EvalError::UnknownCondition {
                name: name.to_string(),
            })?;
        let result = compiled.expr.evaluate(self);
        self.resolved
            .borrow_mut()
            .insert(name.to_string(), result.clone());
        result
    }

    /// Whether a named condition holds. Evaluation errors count as "no".
    pub fn is_satisfied(&self, name: &str) -> bool {
        match self.condition(name) {
            Ok(value) => value,
            Err(err) => {
                debug!(condition = name, error = %err, "condition not satisfied");
                false
            }
        }
    }
}
