use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ComponentType {
    TextField,
    MultilineTextField,
    EmailAddressField,
    TelephoneNumberField,
    NumberField,
    YesNoField,
    DatePartsField,
    UkAddressField,
    RadiosField,
    SelectField,
    CheckboxesField,
    Html,
    Para,
    Details,
}

/// Presentation and validation options shared by all component types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional_text: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_words: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days_in_past: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days_in_future: Option<u32>,
}

/// Bounds on the answer value. `min`/`max` are lengths for text and values for numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct FieldBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer: Option<bool>,
}

/// Definition of a single component on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentDef {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default)]
    pub options: ComponentOptions,
    #[serde(default)]
    pub schema: FieldBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
