//! Composition of per-field schemas into a whole-state schema.

use regex::Regex;
use serde_json::{Map, Value};
use time::Date;
use tracing::debug;

use crate::answers::{Validated, ValidationError};
use crate::context::EvaluationContext;
use crate::dates::format_iso_date;
use crate::model::{FormModel, Page};
use crate::validate::{check_field, is_blank, required_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Multiline,
    Email,
    Telephone,
}

/// Type and bounds of one answer.
#[derive(Debug, Clone)]
pub enum FieldRule {
    Text {
        format: TextFormat,
        min_length: Option<usize>,
        max_length: Option<usize>,
        exact_length: Option<usize>,
        max_words: Option<usize>,
        pattern: Option<Regex>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
        precision: Option<u32>,
    },
    Boolean,
    Date {
        earliest: Option<Date>,
        latest: Option<Date>,
    },
    Address,
    /// One of the values eligible when the schema was composed.
    Choice { allowed: Vec<Value> },
    /// Any subset of the values eligible when the schema was composed.
    MultiChoice { allowed: Vec<Value> },
}

/// Schema of a single answer, remembering where it is asked.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: String,
    pub title: String,
    pub page: String,
    pub section: Option<String>,
    pub required: bool,
    pub custom_message: Option<String>,
    pub rule: FieldRule,
}

impl FieldSchema {
    /// State path of the answer.
    pub fn path(&self) -> String {
        match &self.section {
            Some(section) => format!("{section}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionSchema {
    pub name: String,
    pub title: String,
    pub fields: Vec<FieldSchema>,
}

/// Whole-state schema built from a set of pages.
#[derive(Debug, Clone, Default)]
pub struct ComposedSchema {
    pub fields: Vec<FieldSchema>,
    pub sections: Vec<SectionSchema>,
}

impl ComposedSchema {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.sections.iter().all(|section| section.fields.is_empty())
    }

    /// Every field, unsectioned first, then sections in declaration order.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields
            .iter()
            .chain(self.sections.iter().flat_map(|section| section.fields.iter()))
    }

    pub fn field(&self, path: &str) -> Option<&FieldSchema> {
        self.all_fields().find(|field| field.path() == path)
    }

    pub fn required_paths(&self) -> Vec<String> {
        self.all_fields()
            .filter(|field| field.required)
            .map(FieldSchema::path)
            .collect()
    }

    /// Validates `state`. Answers outside the schema are assumed to be
    /// stale and are never errors; with `strip_unknown` they are dropped.
    pub fn validate(&self, state: &Value, strip_unknown: bool) -> Validated {
        let source = state.as_object().cloned().unwrap_or_default();
        let mut value = Map::new();
        let mut errors = Vec::new();
        let mut pruned = Vec::new();

        validate_group(&self.fields, &source, &mut value, &mut errors);

        for section in &self.sections {
            let scope = source
                .get(&section.name)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let mut nested = Map::new();
            validate_group(&section.fields, &scope, &mut nested, &mut errors);
            for (key, answer) in scope {
                if nested.contains_key(&key) || section.fields.iter().any(|f| f.name == key) {
                    continue;
                }
                pruned.push(format!("{}.{key}", section.name));
                if !strip_unknown {
                    nested.insert(key, answer);
                }
            }
            if !nested.is_empty() {
                value.insert(section.name.clone(), Value::Object(nested));
            }
        }

        for (key, answer) in source {
            let known = self.fields.iter().any(|field| field.name == key)
                || self.sections.iter().any(|section| section.name == key);
            if known {
                continue;
            }
            pruned.push(key.clone());
            if !strip_unknown {
                value.insert(key, answer);
            }
        }

        if !pruned.is_empty() {
            debug!(count = pruned.len(), strip_unknown, "answers outside composed schema");
        }

        Validated {
            value: Value::Object(value),
            errors,
            pruned,
        }
    }

    /// JSON Schema rendering of the composed schema for rendering layers.
    pub fn to_json_schema(&self) -> Value {
        let mut root = object_schema(&self.fields);
        if let Some(Value::Object(properties)) = root.get_mut("properties") {
            for section in &self.sections {
                if section.fields.is_empty() {
                    continue;
                }
                let mut nested = object_schema(&section.fields);
                nested.insert("title".into(), Value::String(section.title.clone()));
                properties.insert(section.name.clone(), Value::Object(nested));
            }
        }
        Value::Object(root)
    }
}

fn validate_group(
    fields: &[FieldSchema],
    source: &Map<String, Value>,
    out: &mut Map<String, Value>,
    errors: &mut Vec<ValidationError>,
) {
    for field in fields {
        match source.get(&field.name) {
            Some(answer) if !is_blank(answer) => match check_field(field, answer) {
                Ok(normalized) => {
                    out.insert(field.name.clone(), normalized);
                }
                Err(mut field_errors) => {
                    out.insert(field.name.clone(), answer.clone());
                    errors.append(&mut field_errors);
                }
            },
            _ => {
                if field.required {
                    errors.push(required_error(field));
                }
            }
        }
    }
}

fn object_schema(fields: &[FieldSchema]) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.name.clone(), Value::Object(field_json_schema(field)));
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }

    let mut root = Map::new();
    root.insert("type".into(), Value::String("object".into()));
    root.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        root.insert("required".into(), Value::Array(required));
    }
    root
}

fn field_json_schema(field: &FieldSchema) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("title".into(), Value::String(field.title.clone()));
    match &field.rule {
        FieldRule::Text {
            format,
            min_length,
            max_length,
            exact_length,
            pattern,
            ..
        } => {
            schema.insert("type".into(), Value::String("string".into()));
            match format {
                TextFormat::Email => {
                    schema.insert("format".into(), Value::String("email".into()));
                }
                TextFormat::Telephone => {
                    schema.insert("format".into(), Value::String("telephone".into()));
                }
                TextFormat::Plain | TextFormat::Multiline => {}
            }
            if let Some(length) = exact_length.or(*min_length) {
                schema.insert("minLength".into(), Value::Number(length.into()));
            }
            if let Some(length) = exact_length.or(*max_length) {
                schema.insert("maxLength".into(), Value::Number(length.into()));
            }
            if let Some(pattern) = pattern {
                schema.insert("pattern".into(), Value::String(pattern.as_str().into()));
            }
        }
        FieldRule::Number { min, max, integer, .. } => {
            let kind = if *integer { "integer" } else { "number" };
            schema.insert("type".into(), Value::String(kind.into()));
            if let Some(min) = min.and_then(serde_json::Number::from_f64) {
                schema.insert("minimum".into(), Value::Number(min));
            }
            if let Some(max) = max.and_then(serde_json::Number::from_f64) {
                schema.insert("maximum".into(), Value::Number(max));
            }
        }
        FieldRule::Boolean => {
            schema.insert("type".into(), Value::String("boolean".into()));
        }
        FieldRule::Date { earliest, latest } => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("format".into(), Value::String("date".into()));
            if let Some(earliest) = earliest {
                schema.insert(
                    "formatMinimum".into(),
                    Value::String(format_iso_date(*earliest)),
                );
            }
            if let Some(latest) = latest {
                schema.insert("formatMaximum".into(), Value::String(format_iso_date(*latest)));
            }
        }
        FieldRule::Address => {
            schema.insert("type".into(), Value::String("object".into()));
            let mut parts = Map::new();
            for part in ["addressLine1", "addressLine2", "town", "postcode"] {
                parts.insert(part.into(), serde_json::json!({ "type": "string" }));
            }
            schema.insert("properties".into(), Value::Object(parts));
            schema.insert(
                "required".into(),
                serde_json::json!(["addressLine1", "town", "postcode"]),
            );
        }
        FieldRule::Choice { allowed } => {
            schema.insert("enum".into(), Value::Array(allowed.clone()));
        }
        FieldRule::MultiChoice { allowed } => {
            schema.insert("type".into(), Value::String("array".into()));
            schema.insert(
                "items".into(),
                serde_json::json!({ "enum": allowed }),
            );
        }
    }
    schema
}

impl FormModel {
    /// Composes one schema from the fields of `pages`: the unsectioned
    /// group first, then each declared section in order. List-backed
    /// fields only allow the items eligible in `ctx`.
    pub fn compose_schema(&self, pages: &[&Page], ctx: &EvaluationContext<'_>) -> ComposedSchema {
        let mut schema = ComposedSchema::default();

        for page in pages.iter().filter(|page| page.section.is_none()) {
            schema.fields.extend(
                page.components
                    .iter()
                    .filter_map(|component| component.field_schema(page, self, ctx)),
            );
        }

        for section in self.sections() {
            let fields: Vec<FieldSchema> = pages
                .iter()
                .filter(|page| page.section.as_deref() == Some(section.name.as_str()))
                .flat_map(|page| {
                    page.components
                        .iter()
                        .filter_map(|component| component.field_schema(page, self, ctx))
                })
                .collect();
            if !fields.is_empty() {
                schema.sections.push(SectionSchema {
                    name: section.name.clone(),
                    title: section.title.clone(),
                    fields,
                });
            }
        }

        schema
    }

    /// Schema for a single page, as used when that page is submitted.
    pub fn page_schema(&self, page: &Page, ctx: &EvaluationContext<'_>) -> ComposedSchema {
        self.compose_schema(&[page], ctx)
    }
}
