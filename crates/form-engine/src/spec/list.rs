use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value type shared by every item of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    String,
    Number,
    Boolean,
}

impl ListType {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ListType::String => value.is_string(),
            ListType::Number => value.is_number(),
            ListType::Boolean => value.is_boolean(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListType::String => "string",
            ListType::Number => "number",
            ListType::Boolean => "boolean",
        }
    }
}

/// One selectable option; only offered when its condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListItemDef {
    pub text: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Enumerable choices backing radios, selects and checkboxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ListDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: ListType,
    pub items: Vec<ListItemDef>,
}
