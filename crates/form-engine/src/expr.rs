use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::context::EvaluationContext;
use crate::dates::{format_iso_date, parse_iso_date, relative_date};
use crate::error::EvalError;
use crate::spec::condition::{Direction, TimeUnit};

/// Comparison performed by an atomic condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    NotContains,
    LongerThan,
    ShorterThan,
    LengthEq,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq | CompareOp::LengthEq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt | CompareOp::LongerThan => ">",
            CompareOp::Lt | CompareOp::ShorterThan => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Contains => "contains",
            CompareOp::NotContains => "not contains",
        }
    }

    fn is_length(self) -> bool {
        matches!(
            self,
            CompareOp::LongerThan | CompareOp::ShorterThan | CompareOp::LengthEq
        )
    }
}

/// Right-hand side of a comparison, resolved at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    RelativeDate {
        period: u32,
        unit: TimeUnit,
        direction: Direction,
    },
}

impl Operand {
    fn resolve(&self, ctx: &EvaluationContext<'_>) -> Result<Value, EvalError> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::RelativeDate {
                period,
                unit,
                direction,
            } => relative_date(ctx.today(), *period, *unit, *direction)
                .map(|date| Value::String(format_iso_date(date)))
                .ok_or(EvalError::DateOutOfRange),
        }
    }
}

/// Compiled condition expression. Evaluated by walking the tree; the
/// `Display` rendering is the textual form used in diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        field: String,
        op: CompareOp,
        value: Operand,
    },
    Condition {
        name: String,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    /// Evaluates the expression. `And`/`Or` short-circuit on a decisive
    /// branch; otherwise the first evaluation error wins.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> Result<bool, EvalError> {
        match self {
            Expr::Compare { field, op, value } => {
                let expected = value.resolve(ctx)?;
                compare(ctx, field, *op, &expected)
            }
            Expr::Condition { name } => ctx.condition(name),
            Expr::And(expressions) => Self::evaluate_and(expressions, ctx),
            Expr::Or(expressions) => Self::evaluate_or(expressions, ctx),
        }
    }

    fn evaluate_and(expressions: &[Expr], ctx: &EvaluationContext<'_>) -> Result<bool, EvalError> {
        let mut first_error = None;
        for expression in expressions {
            match expression.evaluate(ctx) {
                Ok(false) => return Ok(false),
                Ok(true) => continue,
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }

    fn evaluate_or(expressions: &[Expr], ctx: &EvaluationContext<'_>) -> Result<bool, EvalError> {
        let mut first_error = None;
        for expression in expressions {
            match expression.evaluate(ctx) {
                Ok(true) => return Ok(true),
                Ok(false) => continue,
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(false),
        }
    }

    /// Names of conditions referenced anywhere in this expression.
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Condition { name } => out.push(name),
            Expr::And(expressions) | Expr::Or(expressions) => {
                for expression in expressions {
                    expression.collect_references(out);
                }
            }
            Expr::Compare { .. } => {}
        }
    }

    /// Field paths compared anywhere in this expression.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Expr::Compare { field, .. } => vec![field.as_str()],
            Expr::Condition { .. } => Vec::new(),
            Expr::And(expressions) | Expr::Or(expressions) => {
                expressions.iter().flat_map(Expr::fields).collect()
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { field, op, value } => {
                if op.is_length() {
                    write!(f, "length({field}) {} {value}", op.symbol())
                } else {
                    write!(f, "{field} {} {value}", op.symbol())
                }
            }
            Expr::Condition { name } => write!(f, "{name}"),
            Expr::And(expressions) => {
                for (index, expression) in expressions.iter().enumerate() {
                    if index > 0 {
                        write!(f, " and ")?;
                    }
                    match expression {
                        Expr::Or(_) => write!(f, "({expression})")?,
                        _ => write!(f, "{expression}")?,
                    }
                }
                Ok(())
            }
            Expr::Or(expressions) => {
                for (index, expression) in expressions.iter().enumerate() {
                    if index > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{expression}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(Value::String(text)) => {
                write!(f, "'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
            }
            Operand::Literal(value) => write!(f, "{value}"),
            Operand::RelativeDate {
                period,
                unit,
                direction,
            } => {
                let sign = match direction {
                    Direction::Past => "-",
                    Direction::Future => "",
                };
                write!(f, "dateForComparison({sign}{period}, '{}')", unit.as_str())
            }
        }
    }
}

fn compare(
    ctx: &EvaluationContext<'_>,
    field: &str,
    op: CompareOp,
    expected: &Value,
) -> Result<bool, EvalError> {
    let actual = match ctx.lookup(field) {
        None | Some(Value::Null) => {
            return Err(EvalError::MissingField {
                field: field.to_string(),
            });
        }
        Some(value) => value,
    };

    match op {
        CompareOp::Eq => loose_eq(field, actual, expected),
        CompareOp::Ne => loose_eq(field, actual, expected).map(|equal| !equal),
        CompareOp::Gt => order(field, actual, expected).map(|o| o == Ordering::Greater),
        CompareOp::Lt => order(field, actual, expected).map(|o| o == Ordering::Less),
        CompareOp::Gte => order(field, actual, expected).map(|o| o != Ordering::Less),
        CompareOp::Lte => order(field, actual, expected).map(|o| o != Ordering::Greater),
        CompareOp::Contains => contains(field, actual, expected),
        CompareOp::NotContains => contains(field, actual, expected).map(|found| !found),
        CompareOp::LongerThan => length_cmp(field, actual, expected).map(|o| o == Ordering::Greater),
        CompareOp::ShorterThan => length_cmp(field, actual, expected).map(|o| o == Ordering::Less),
        CompareOp::LengthEq => length_cmp(field, actual, expected).map(|o| o == Ordering::Equal),
    }
}

fn mismatch(field: &str, detail: impl Into<String>) -> EvalError {
    EvalError::TypeMismatch {
        field: field.to_string(),
        detail: detail.into(),
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Booleans compare by identity, numbers numerically, strings exactly.
/// Arrays (checkbox answers) are equal when any member matches.
fn loose_eq(field: &str, actual: &Value, expected: &Value) -> Result<bool, EvalError> {
    match actual {
        Value::Bool(flag) => as_bool(expected)
            .map(|other| *flag == other)
            .ok_or_else(|| mismatch(field, format!("{expected} is not a boolean"))),
        Value::Number(_) => {
            let left = as_number(actual).ok_or_else(|| mismatch(field, "not a finite number"))?;
            as_number(expected)
                .map(|right| left == right)
                .ok_or_else(|| mismatch(field, format!("{expected} is not a number")))
        }
        Value::String(text) => match expected {
            Value::String(other) => Ok(text == other),
            Value::Number(_) | Value::Bool(_) => Ok(*text == expected.to_string()),
            _ => Err(mismatch(field, format!("cannot compare text with {expected}"))),
        },
        Value::Array(items) => {
            for item in items {
                if loose_eq(field, item, expected).unwrap_or(false) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Object(_) => Ok(actual == expected),
        Value::Null => Err(EvalError::MissingField {
            field: field.to_string(),
        }),
    }
}

/// Numbers order numerically, ISO dates by calendar.
fn order(field: &str, actual: &Value, expected: &Value) -> Result<Ordering, EvalError> {
    if actual.is_number() || (actual.is_string() && expected.is_number()) {
        let left = as_number(actual).ok_or_else(|| mismatch(field, "not a number"))?;
        let right = as_number(expected)
            .ok_or_else(|| mismatch(field, format!("{expected} is not a number")))?;
        return left
            .partial_cmp(&right)
            .ok_or_else(|| mismatch(field, "numbers are not comparable"));
    }

    if let (Some(left), Some(right)) = (
        actual.as_str().and_then(parse_iso_date),
        expected.as_str().and_then(parse_iso_date),
    ) {
        return Ok(left.cmp(&right));
    }

    if let (Some(left), Some(right)) = (as_number(actual), as_number(expected)) {
        return left
            .partial_cmp(&right)
            .ok_or_else(|| mismatch(field, "numbers are not comparable"));
    }

    Err(mismatch(
        field,
        format!("{actual} and {expected} have no natural order"),
    ))
}

fn contains(field: &str, actual: &Value, expected: &Value) -> Result<bool, EvalError> {
    match (actual, expected) {
        (Value::Array(_), _) => loose_eq(field, actual, expected),
        (Value::String(text), Value::String(needle)) => Ok(text.contains(needle.as_str())),
        _ => Err(mismatch(field, "contains needs text or a list of answers")),
    }
}

fn length_cmp(field: &str, actual: &Value, expected: &Value) -> Result<Ordering, EvalError> {
    let length = match actual {
        Value::String(text) => text.chars().count(),
        Value::Array(items) => items.len(),
        _ => return Err(mismatch(field, "length needs text or a list of answers")),
    };
    let bound = as_number(expected)
        .filter(|bound| bound.fract() == 0.0 && *bound >= 0.0)
        .ok_or_else(|| mismatch(field, format!("{expected} is not a length")))?;
    (length as f64)
        .partial_cmp(&bound)
        .ok_or_else(|| mismatch(field, "lengths are not comparable"))
}
