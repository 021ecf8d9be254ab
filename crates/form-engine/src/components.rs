//! Answer-holding and content components.
//!
//! Each definition `type` is compiled once into a [`ComponentKind`]; the
//! kind decides how the answer is validated, how raw page payloads map to
//! state and back, and how the answer is shown in summaries.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};
use time::Duration;

use crate::context::EvaluationContext;
use crate::dates::{format_long_date, parse_iso_date};
use crate::error::DefinitionError;
use crate::lists::{List, eligible_items};
use crate::model::{FormModel, Page};
use crate::schema::{FieldRule, FieldSchema, TextFormat};
use crate::spec::component::{ComponentDef, ComponentType};

const ADDRESS_PARTS: [&str; 4] = ["addressLine1", "addressLine2", "town", "postcode"];

#[derive(Debug, Clone)]
pub struct TextRules {
    pub format: TextFormat,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub exact_length: Option<usize>,
    pub max_words: Option<usize>,
    pub pattern: Option<Regex>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRules {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer: bool,
    pub precision: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRules {
    pub max_days_in_past: Option<u32>,
    pub max_days_in_future: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum ComponentKind {
    Text(TextRules),
    Number(NumberRules),
    YesNo,
    DateParts(DateRules),
    UkAddress,
    /// Radios or select: one value from `list`.
    Choice { list: String },
    /// Checkboxes: any values from `list`.
    MultiChoice { list: String },
    Content { body: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub title: String,
    pub hint: Option<String>,
    pub required: bool,
    pub optional_text: bool,
    pub custom_message: Option<String>,
    pub kind: ComponentKind,
}

impl Component {
    pub(crate) fn compile(
        page: &str,
        def: &ComponentDef,
        lists: &BTreeMap<String, List>,
    ) -> Result<Self, DefinitionError> {
        let bounds = &def.schema;
        let length = |value: Option<f64>| value.filter(|v| *v >= 0.0).map(|v| v as usize);
        let text = |format: TextFormat| -> Result<ComponentKind, DefinitionError> {
            let pattern = bounds
                .regex
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|source| DefinitionError::InvalidPattern {
                    component: def.name.clone(),
                    source,
                })?;
            Ok(ComponentKind::Text(TextRules {
                format,
                min_length: length(bounds.min),
                max_length: length(bounds.max),
                exact_length: bounds.length,
                max_words: def.options.max_words,
                pattern,
            }))
        };
        let list = || -> Result<String, DefinitionError> {
            let name = def.list.clone().ok_or_else(|| DefinitionError::MissingList {
                page: page.to_string(),
                component: def.name.clone(),
            })?;
            if !lists.contains_key(&name) {
                return Err(DefinitionError::UnknownList {
                    page: page.to_string(),
                    component: def.name.clone(),
                    list: name,
                });
            }
            Ok(name)
        };

        let kind = match def.kind {
            ComponentType::TextField => text(TextFormat::Plain)?,
            ComponentType::MultilineTextField => text(TextFormat::Multiline)?,
            ComponentType::EmailAddressField => text(TextFormat::Email)?,
            ComponentType::TelephoneNumberField => text(TextFormat::Telephone)?,
            ComponentType::NumberField => ComponentKind::Number(NumberRules {
                min: bounds.min,
                max: bounds.max,
                integer: bounds.integer.unwrap_or(false),
                precision: bounds.precision,
            }),
            ComponentType::YesNoField => ComponentKind::YesNo,
            ComponentType::DatePartsField => ComponentKind::DateParts(DateRules {
                max_days_in_past: def.options.max_days_in_past,
                max_days_in_future: def.options.max_days_in_future,
            }),
            ComponentType::UkAddressField => ComponentKind::UkAddress,
            ComponentType::RadiosField | ComponentType::SelectField => {
                ComponentKind::Choice { list: list()? }
            }
            ComponentType::CheckboxesField => ComponentKind::MultiChoice { list: list()? },
            ComponentType::Html | ComponentType::Para | ComponentType::Details => {
                ComponentKind::Content {
                    body: def.content.clone(),
                }
            }
        };

        Ok(Self {
            name: def.name.clone(),
            title: if def.title.is_empty() {
                def.name.clone()
            } else {
                def.title.clone()
            },
            hint: def.hint.clone(),
            required: def.options.required.unwrap_or(true),
            optional_text: def.options.optional_text.unwrap_or(false),
            custom_message: def.options.custom_validation_message.clone(),
            kind,
        })
    }

    /// Whether the component stores an answer in state.
    pub fn is_input(&self) -> bool {
        !matches!(self.kind, ComponentKind::Content { .. })
    }

    pub fn list_name(&self) -> Option<&str> {
        match &self.kind {
            ComponentKind::Choice { list } | ComponentKind::MultiChoice { list } => Some(list),
            _ => None,
        }
    }

    /// Schema of this component's answer for the state `ctx` wraps.
    pub fn field_schema(
        &self,
        page: &Page,
        model: &FormModel,
        ctx: &EvaluationContext<'_>,
    ) -> Option<FieldSchema> {
        let rule = match &self.kind {
            ComponentKind::Content { .. } => return None,
            ComponentKind::Text(rules) => FieldRule::Text {
                format: rules.format,
                min_length: rules.min_length,
                max_length: rules.max_length,
                exact_length: rules.exact_length,
                max_words: rules.max_words,
                pattern: rules.pattern.clone(),
            },
            ComponentKind::Number(rules) => FieldRule::Number {
                min: rules.min,
                max: rules.max,
                integer: rules.integer,
                precision: rules.precision,
            },
            ComponentKind::YesNo => FieldRule::Boolean,
            ComponentKind::DateParts(rules) => {
                let today = ctx.today();
                FieldRule::Date {
                    earliest: rules
                        .max_days_in_past
                        .and_then(|days| today.checked_sub(Duration::days(i64::from(days)))),
                    latest: rules
                        .max_days_in_future
                        .and_then(|days| today.checked_add(Duration::days(i64::from(days)))),
                }
            }
            ComponentKind::UkAddress => FieldRule::Address,
            ComponentKind::Choice { list } => FieldRule::Choice {
                allowed: allowed_values(model, list, ctx),
            },
            ComponentKind::MultiChoice { list } => FieldRule::MultiChoice {
                allowed: allowed_values(model, list, ctx),
            },
        };

        Some(FieldSchema {
            name: self.name.clone(),
            title: self.title.clone(),
            page: page.path.clone(),
            section: page.section.clone(),
            required: self.required,
            custom_message: self.custom_message.clone(),
            rule,
        })
    }

    /// Converts a raw page payload (string values, as posted by a browser)
    /// into this component's state value. `Null` means "no answer".
    pub fn to_state(&self, payload: &Map<String, Value>, model: &FormModel) -> Value {
        let raw = |key: &str| raw_text(payload.get(key)).filter(|text| !text.trim().is_empty());
        match &self.kind {
            ComponentKind::Content { .. } => Value::Null,
            ComponentKind::Text(_) => raw(&self.name)
                .map(|text| Value::String(text.trim().to_string()))
                .unwrap_or(Value::Null),
            ComponentKind::Number(_) => raw(&self.name)
                .map(|text| parse_number(&text).unwrap_or(Value::String(text)))
                .unwrap_or(Value::Null),
            ComponentKind::YesNo => match raw(&self.name).as_deref().map(str::trim) {
                Some("true" | "yes") => Value::Bool(true),
                Some("false" | "no") => Value::Bool(false),
                Some(other) => Value::String(other.to_string()),
                None => Value::Null,
            },
            ComponentKind::DateParts(_) => {
                let day = raw(&format!("{}__day", self.name));
                let month = raw(&format!("{}__month", self.name));
                let year = raw(&format!("{}__year", self.name));
                if day.is_none() && month.is_none() && year.is_none() {
                    return Value::Null;
                }
                let part = |value: Option<String>| value.unwrap_or_default().trim().to_string();
                Value::String(format!(
                    "{}-{:0>2}-{:0>2}",
                    part(year),
                    part(month),
                    part(day)
                ))
            }
            ComponentKind::UkAddress => {
                let mut address = Map::new();
                for key in ADDRESS_PARTS {
                    if let Some(text) = raw(&format!("{}__{key}", self.name)) {
                        address.insert(key.into(), Value::String(text.trim().to_string()));
                    }
                }
                if address.is_empty() {
                    Value::Null
                } else {
                    Value::Object(address)
                }
            }
            ComponentKind::Choice { list } => match (payload.get(&self.name), model.list(list)) {
                (Some(Value::String(text)), Some(list)) if !text.trim().is_empty() => {
                    list.coerce(text)
                }
                (Some(value @ (Value::Number(_) | Value::Bool(_))), _) => value.clone(),
                _ => Value::Null,
            },
            ComponentKind::MultiChoice { list } => {
                let selected: Vec<Value> = match payload.get(&self.name) {
                    Some(Value::Array(items)) => items.clone(),
                    Some(Value::Null) | None => Vec::new(),
                    Some(single) => vec![single.clone()],
                };
                let list = model.list(list);
                let values: Vec<Value> = selected
                    .into_iter()
                    .filter(|value| !value.as_str().is_some_and(|text| text.trim().is_empty()))
                    .map(|value| match (value, list) {
                        (Value::String(text), Some(list)) => list.coerce(&text),
                        (value, _) => value,
                    })
                    .collect();
                if values.is_empty() {
                    Value::Null
                } else {
                    Value::Array(values)
                }
            }
        }
    }

    /// Raw page payload pre-filled from a state value.
    pub fn from_state(&self, value: Option<&Value>) -> Map<String, Value> {
        let mut payload = Map::new();
        let Some(value) = value.filter(|value| !value.is_null()) else {
            return payload;
        };
        match &self.kind {
            ComponentKind::Content { .. } => {}
            ComponentKind::DateParts(_) => {
                if let Some(date) = value.as_str().and_then(parse_iso_date) {
                    let parts = [
                        ("day", date.day().to_string()),
                        ("month", u8::from(date.month()).to_string()),
                        ("year", date.year().to_string()),
                    ];
                    for (part, text) in parts {
                        payload.insert(format!("{}__{part}", self.name), Value::String(text));
                    }
                }
            }
            ComponentKind::UkAddress => {
                for key in ADDRESS_PARTS {
                    if let Some(text) = value.get(key).and_then(Value::as_str) {
                        payload.insert(
                            format!("{}__{key}", self.name),
                            Value::String(text.to_string()),
                        );
                    }
                }
            }
            ComponentKind::MultiChoice { .. } => {
                let items = match value {
                    Value::Array(items) => items.iter().map(text_of).collect(),
                    single => vec![text_of(single)],
                };
                payload.insert(self.name.clone(), Value::Array(items));
            }
            ComponentKind::Text(_)
            | ComponentKind::Number(_)
            | ComponentKind::YesNo
            | ComponentKind::Choice { .. } => {
                payload.insert(self.name.clone(), text_of(value));
            }
        }
        payload
    }

    /// Human readable answer for summaries.
    pub fn display_string(&self, value: &Value, model: &FormModel) -> String {
        match &self.kind {
            ComponentKind::Content { .. } => String::new(),
            ComponentKind::YesNo => match value {
                Value::Bool(true) => "Yes".into(),
                Value::Bool(false) => "No".into(),
                other => plain(other),
            },
            ComponentKind::DateParts(_) => value
                .as_str()
                .and_then(parse_iso_date)
                .map(format_long_date)
                .unwrap_or_else(|| plain(value)),
            ComponentKind::UkAddress => ADDRESS_PARTS
                .iter()
                .filter_map(|key| value.get(*key).and_then(Value::as_str))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            ComponentKind::Choice { list } => item_text(model.list(list), value),
            ComponentKind::MultiChoice { list } => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| item_text(model.list(list), item))
                    .collect::<Vec<_>>()
                    .join(", "),
                single => item_text(model.list(list), single),
            },
            ComponentKind::Text(_) | ComponentKind::Number(_) => plain(value),
        }
    }
}

fn allowed_values(model: &FormModel, list: &str, ctx: &EvaluationContext<'_>) -> Vec<Value> {
    model
        .list(list)
        .map(|list| {
            eligible_items(list, ctx)
                .into_iter()
                .map(|item| item.value.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn raw_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(Value::from(integer));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

fn text_of(value: &Value) -> Value {
    match value {
        Value::String(_) => value.clone(),
        other => Value::String(other.to_string()),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn item_text(list: Option<&List>, value: &Value) -> String {
    list.and_then(|list| list.item_for(value))
        .map(|item| item.text.clone())
        .unwrap_or_else(|| plain(value))
}
