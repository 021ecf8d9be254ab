use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::answers::ValidationError;
use crate::dates::{format_long_date, parse_iso_date};
use crate::schema::{FieldRule, FieldSchema, TextFormat};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static TELEPHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("telephone pattern compiles")
});

static POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z]{1,2}[0-9][a-z0-9]?\s*[0-9][a-z]{2}$").expect("postcode pattern compiles")
});

/// Blank answers count as missing.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_blank),
        _ => false,
    }
}

pub(crate) fn required_error(field: &FieldSchema) -> ValidationError {
    let default = match field.rule {
        FieldRule::Choice { .. } | FieldRule::MultiChoice { .. } | FieldRule::Boolean => {
            format!("Select {}", field.title)
        }
        _ => format!("Enter {}", field.title),
    };
    error(field, None, "required", message(field, default))
}

/// Checks a non-blank answer against its rule, returning the normalised
/// value or every problem found.
pub(crate) fn check_field(field: &FieldSchema, value: &Value) -> Result<Value, Vec<ValidationError>> {
    match &field.rule {
        FieldRule::Text {
            format,
            min_length,
            max_length,
            exact_length,
            max_words,
            pattern,
        } => {
            let Some(text) = value.as_str() else {
                return fail(field, "type", format!("{} must be text", field.title));
            };
            let text = text.trim();
            let length = text.chars().count();
            if let Some(exact) = exact_length
                && length != *exact
            {
                return fail(
                    field,
                    "length",
                    format!("{} must be {exact} characters long", field.title),
                );
            }
            if let Some(min) = min_length
                && length < *min
            {
                return fail(
                    field,
                    "min_length",
                    format!("{} must be {min} characters or more", field.title),
                );
            }
            if let Some(max) = max_length
                && length > *max
            {
                return fail(
                    field,
                    "max_length",
                    format!("{} must be {max} characters or fewer", field.title),
                );
            }
            if let Some(max) = max_words
                && text.split_whitespace().count() > *max
            {
                return fail(
                    field,
                    "max_words",
                    format!("{} must be {max} words or fewer", field.title),
                );
            }
            match format {
                TextFormat::Email if !EMAIL.is_match(text) => {
                    return fail(
                        field,
                        "email",
                        "Enter an email address in the correct format, like name@example.com"
                            .to_string(),
                    );
                }
                TextFormat::Telephone if !TELEPHONE.is_match(text) => {
                    return fail(
                        field,
                        "telephone",
                        "Enter a telephone number, like 01632 960 001".to_string(),
                    );
                }
                _ => {}
            }
            if let Some(pattern) = pattern
                && !pattern.is_match(text)
            {
                return fail(field, "pattern", format!("Enter a valid {}", field.title));
            }
            Ok(Value::String(text.to_string()))
        }
        FieldRule::Number {
            min,
            max,
            integer,
            precision,
        } => {
            let number = match value {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().parse::<f64>().ok(),
                _ => None,
            };
            let Some(number) = number.filter(|number| number.is_finite()) else {
                return fail(field, "number", format!("{} must be a number", field.title));
            };
            if *integer && number.fract() != 0.0 {
                return fail(field, "integer", format!("{} must be a whole number", field.title));
            }
            if let Some(places) = precision
                && decimal_places(number) > *places
            {
                return fail(
                    field,
                    "precision",
                    format!("{} must have {places} decimal places or fewer", field.title),
                );
            }
            if let Some(min) = min
                && number < *min
            {
                return fail(field, "min", format!("{} must be {min} or higher", field.title));
            }
            if let Some(max) = max
                && number > *max
            {
                return fail(field, "max", format!("{} must be {max} or lower", field.title));
            }
            Ok(number_value(number))
        }
        FieldRule::Boolean => match value {
            Value::Bool(flag) => Ok(Value::Bool(*flag)),
            Value::String(text) if text == "true" || text == "yes" => Ok(Value::Bool(true)),
            Value::String(text) if text == "false" || text == "no" => Ok(Value::Bool(false)),
            _ => fail(field, "boolean", format!("Select yes or no for {}", field.title)),
        },
        FieldRule::Date { earliest, latest } => {
            let Some(date) = value.as_str().and_then(parse_iso_date) else {
                return fail(field, "date", format!("{} must be a real date", field.title));
            };
            if let Some(earliest) = earliest
                && date < *earliest
            {
                return fail(
                    field,
                    "date_min",
                    format!(
                        "{} must be the same as or after {}",
                        field.title,
                        format_long_date(*earliest)
                    ),
                );
            }
            if let Some(latest) = latest
                && date > *latest
            {
                return fail(
                    field,
                    "date_max",
                    format!(
                        "{} must be the same as or before {}",
                        field.title,
                        format_long_date(*latest)
                    ),
                );
            }
            Ok(value.clone())
        }
        FieldRule::Address => check_address(field, value),
        FieldRule::Choice { allowed } => match find_allowed(allowed, value) {
            Some(matched) => Ok(matched.clone()),
            None => fail(field, "choice", format!("Select a valid option for {}", field.title)),
        },
        FieldRule::MultiChoice { allowed } => {
            let answers = match value {
                Value::Array(items) => items.clone(),
                single => vec![single.clone()],
            };
            let mut normalized = Vec::with_capacity(answers.len());
            for answer in &answers {
                match find_allowed(allowed, answer) {
                    Some(matched) => normalized.push(matched.clone()),
                    None => {
                        return fail(
                            field,
                            "choice",
                            format!("Select valid options for {}", field.title),
                        );
                    }
                }
            }
            Ok(Value::Array(normalized))
        }
    }
}

fn check_address(field: &FieldSchema, value: &Value) -> Result<Value, Vec<ValidationError>> {
    let Some(parts) = value.as_object() else {
        return fail(field, "type", format!("{} must be an address", field.title));
    };
    let text = |key: &str| {
        parts
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    };

    let mut errors = Vec::new();
    if text("addressLine1").is_none() {
        errors.push(error(
            field,
            Some("addressLine1"),
            "required",
            "Enter address line 1".to_string(),
        ));
    }
    if text("town").is_none() {
        errors.push(error(field, Some("town"), "required", "Enter town or city".to_string()));
    }
    match text("postcode") {
        None => errors.push(error(field, Some("postcode"), "required", "Enter postcode".to_string())),
        Some(postcode) if !POSTCODE.is_match(postcode) => errors.push(error(
            field,
            Some("postcode"),
            "postcode",
            "Enter a valid postcode".to_string(),
        )),
        Some(_) => {}
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut normalized = Map::new();
    for key in ["addressLine1", "addressLine2", "town", "postcode"] {
        if let Some(part) = text(key) {
            normalized.insert(key.into(), Value::String(part.to_string()));
        }
    }
    Ok(Value::Object(normalized))
}

/// Matches a submitted value against allowed list values, accepting the
/// textual form of numbers and booleans.
fn find_allowed<'a>(allowed: &'a [Value], value: &Value) -> Option<&'a Value> {
    allowed.iter().find(|candidate| {
        if *candidate == value {
            return true;
        }
        match (candidate, value) {
            (Value::Number(left), Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .zip(left.as_f64())
                .is_some_and(|(right, left)| left == right),
            (Value::Number(left), Value::Number(right)) => left.as_f64() == right.as_f64(),
            (Value::Bool(flag), Value::String(text)) => text == if *flag { "true" } else { "false" },
            _ => false,
        }
    })
}

/// Counts from the parsed value; `f64` display never uses exponent form.
fn decimal_places(number: f64) -> u32 {
    number
        .to_string()
        .split_once('.')
        .map(|(_, fraction)| fraction.trim_end_matches('0').len() as u32)
        .unwrap_or(0)
}

fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn message(field: &FieldSchema, default: String) -> String {
    field.custom_message.clone().unwrap_or(default)
}

fn error(field: &FieldSchema, part: Option<&str>, code: &str, message: String) -> ValidationError {
    let path = match part {
        Some(part) => format!("{}.{part}", field.path()),
        None => field.path(),
    };
    ValidationError {
        path,
        name: field.name.clone(),
        page: field.page.clone(),
        section: field.section.clone(),
        message,
        code: code.to_string(),
    }
}

fn fail(field: &FieldSchema, code: &str, default: String) -> Result<Value, Vec<ValidationError>> {
    Err(vec![error(field, None, code, message(field, default))])
}
