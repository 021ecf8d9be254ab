use serde_json::Value;

use crate::context::EvaluationContext;
use crate::spec::list::{ListDef, ListType};

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub text: String,
    pub value: Value,
    pub hint: Option<String>,
    pub condition: Option<String>,
}

/// A compiled list of choices.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub name: String,
    pub title: Option<String>,
    pub kind: ListType,
    pub items: Vec<ListItem>,
}

impl List {
    pub(crate) fn from_def(def: &ListDef) -> Self {
        Self {
            name: def.name.clone(),
            title: def.title.clone(),
            kind: def.kind,
            items: def
                .items
                .iter()
                .map(|item| ListItem {
                    text: item.text.clone(),
                    value: item.value.clone(),
                    hint: item.hint.clone(),
                    condition: item.condition.clone(),
                })
                .collect(),
        }
    }

    /// Item whose value matches `value`, ignoring eligibility.
    pub fn item_for(&self, value: &Value) -> Option<&ListItem> {
        self.items.iter().find(|item| item.value == *value)
    }

    /// Converts a raw submitted string into this list's value type.
    pub fn coerce(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match self.kind {
            ListType::String => Value::String(raw.to_string()),
            ListType::Number => trimmed
                .parse::<i64>()
                .map(Value::from)
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                })
                .unwrap_or_else(|| Value::String(raw.to_string())),
            ListType::Boolean => match trimmed {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
        }
    }
}

/// Items of `list` whose condition is absent or holds in `ctx`.
pub fn eligible_items<'l>(list: &'l List, ctx: &EvaluationContext<'_>) -> Vec<&'l ListItem> {
    list.items
        .iter()
        .filter(|item| match &item.condition {
            Some(condition) => ctx.is_satisfied(condition),
            None => true,
        })
        .collect()
}
