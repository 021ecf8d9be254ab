//! Compiles declarative condition definitions into [`Expr`] trees.
//!
//! Conditions may reference each other by name. References are kept as
//! [`Expr::Condition`] nodes and resolved through the evaluation context,
//! but the reference graph is checked at load time: unknown names and
//! cycles are definition errors.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::DefinitionError;
use crate::expr::{CompareOp, Expr, Operand};
use crate::spec::condition::{
    ComparisonDef, ComparisonValue, ConditionDef, ConditionEntry, Coordinator, Operator,
};

/// A condition ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    pub name: String,
    pub display_name: String,
    pub expr: Expr,
    /// Canonical textual form of `expr`.
    pub text: String,
}

/// All compiled conditions of a form, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ConditionTable {
    conditions: BTreeMap<String, CompiledCondition>,
    order: Vec<String>,
}

impl ConditionTable {
    pub fn get(&self, name: &str) -> Option<&CompiledCondition> {
        self.conditions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Conditions in dependency order: every condition appears after the
    /// conditions it references.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledCondition> {
        self.order
            .iter()
            .filter_map(|name| self.conditions.get(name))
    }
}

/// Compiles every condition and validates the reference graph.
///
/// `known_fields` holds the state paths of all answer-holding components;
/// comparisons against any other path are rejected.
pub fn compile_conditions(
    defs: &[ConditionDef],
    known_fields: &BTreeSet<String>,
) -> Result<ConditionTable, DefinitionError> {
    let mut conditions = BTreeMap::new();
    for def in defs {
        let compiled = compile_condition(def)?;
        for field in compiled.expr.fields() {
            if !known_fields.contains(field) {
                return Err(DefinitionError::UnknownField {
                    condition: def.name.clone(),
                    field: field.to_string(),
                });
            }
        }
        if conditions.insert(def.name.clone(), compiled).is_some() {
            return Err(DefinitionError::DuplicateCondition {
                name: def.name.clone(),
            });
        }
    }

    for compiled in conditions.values() {
        for reference in compiled.expr.references() {
            if !conditions.contains_key(reference) {
                return Err(DefinitionError::UnknownCondition {
                    owner: format!("condition '{}'", compiled.name),
                    condition: reference.to_string(),
                });
            }
        }
    }

    let order = dependency_order(&conditions)?;
    Ok(ConditionTable { conditions, order })
}

/// Compiles a single condition in isolation (references are not checked).
pub fn compile_condition(def: &ConditionDef) -> Result<CompiledCondition, DefinitionError> {
    let expr = compile_entries(&def.name, &def.value.conditions)?;
    let text = expr.to_string();
    Ok(CompiledCondition {
        name: def.name.clone(),
        display_name: def.display_name.clone().unwrap_or_else(|| def.name.clone()),
        expr,
        text,
    })
}

/// Folds entries left to right; `and` binds tighter than `or`. The
/// coordinator of the first entry is ignored.
fn compile_entries(condition: &str, entries: &[ConditionEntry]) -> Result<Expr, DefinitionError> {
    if entries.is_empty() {
        return Err(malformed(condition, "a condition needs at least one entry"));
    }

    let mut alternatives = Vec::new();
    let mut conjunction = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let term = compile_entry(condition, entry)?;
        if index == 0 {
            conjunction.push(term);
            continue;
        }
        match entry.coordinator() {
            Some(Coordinator::And) => conjunction.push(term),
            Some(Coordinator::Or) => {
                alternatives.push(collapse(std::mem::take(&mut conjunction), Expr::And));
                conjunction.push(term);
            }
            None => {
                return Err(malformed(
                    condition,
                    &format!("entry {} is missing its 'and'/'or' coordinator", index + 1),
                ));
            }
        }
    }
    alternatives.push(collapse(conjunction, Expr::And));
    Ok(collapse(alternatives, Expr::Or))
}

fn collapse(mut terms: Vec<Expr>, join: fn(Vec<Expr>) -> Expr) -> Expr {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        join(terms)
    }
}

fn compile_entry(condition: &str, entry: &ConditionEntry) -> Result<Expr, DefinitionError> {
    match entry {
        ConditionEntry::Comparison(def) => compile_comparison(condition, def),
        ConditionEntry::Reference(def) => {
            if def.condition_name.trim().is_empty() {
                return Err(malformed(condition, "condition reference has no name"));
            }
            Ok(Expr::Condition {
                name: def.condition_name.clone(),
            })
        }
        ConditionEntry::Group(def) => compile_entries(condition, &def.conditions),
    }
}

fn compile_comparison(condition: &str, def: &ComparisonDef) -> Result<Expr, DefinitionError> {
    if def.field.trim().is_empty() {
        return Err(malformed(condition, "comparison has no field"));
    }
    let op = match def.operator {
        Operator::Is => CompareOp::Eq,
        Operator::IsNot => CompareOp::Ne,
        Operator::IsMoreThan | Operator::IsAfter => CompareOp::Gt,
        Operator::IsLessThan | Operator::IsBefore => CompareOp::Lt,
        Operator::IsAtLeast | Operator::IsAtOrAfter => CompareOp::Gte,
        Operator::IsAtMost | Operator::IsAtOrBefore => CompareOp::Lte,
        Operator::Contains => CompareOp::Contains,
        Operator::DoesNotContain => CompareOp::NotContains,
        Operator::IsLongerThan => CompareOp::LongerThan,
        Operator::IsShorterThan => CompareOp::ShorterThan,
        Operator::HasLength => CompareOp::LengthEq,
    };
    let value = match &def.value {
        ComparisonValue::Value { value, .. } => {
            if !(value.is_string() || value.is_number() || value.is_boolean()) {
                return Err(malformed(
                    condition,
                    &format!("comparison value for '{}' must be text, number or boolean", def.field),
                ));
            }
            Operand::Literal(value.clone())
        }
        ComparisonValue::RelativeTime {
            time_period,
            time_unit,
            direction,
        } => Operand::RelativeDate {
            period: *time_period,
            unit: *time_unit,
            direction: *direction,
        },
    };
    Ok(Expr::Compare {
        field: def.field.clone(),
        op,
        value,
    })
}

fn malformed(condition: &str, reason: &str) -> DefinitionError {
    DefinitionError::MalformedCondition {
        condition: condition.to_string(),
        reason: reason.to_string(),
    }
}

/// Depth-first topological order over condition references.
fn dependency_order(
    conditions: &BTreeMap<String, CompiledCondition>,
) -> Result<Vec<String>, DefinitionError> {
    let mut order = Vec::with_capacity(conditions.len());
    let mut done = BTreeSet::new();
    let mut chain = Vec::new();
    for name in conditions.keys() {
        visit(name, conditions, &mut chain, &mut done, &mut order)?;
    }
    Ok(order)
}

fn visit(
    name: &str,
    conditions: &BTreeMap<String, CompiledCondition>,
    chain: &mut Vec<String>,
    done: &mut BTreeSet<String>,
    order: &mut Vec<String>,
) -> Result<(), DefinitionError> {
    if done.contains(name) {
        return Ok(());
    }
    if let Some(start) = chain.iter().position(|entry| entry == name) {
        let mut cycle = chain[start..].to_vec();
        cycle.push(name.to_string());
        return Err(DefinitionError::ConditionCycle { chain: cycle });
    }
    chain.push(name.to_string());
    if let Some(compiled) = conditions.get(name) {
        for reference in compiled.expr.references() {
            visit(reference, conditions, chain, done, order)?;
        }
    }
    chain.pop();
    done.insert(name.to_string());
    order.push(name.to_string());
    Ok(())
}
