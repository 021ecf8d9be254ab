use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::component::ComponentDef;
use crate::spec::condition::ConditionDef;
use crate::spec::list::ListDef;

/// Outgoing link of a page, optionally guarded by a named condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LinkDef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Named grouping of pages; sectioned answers nest under the section name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionDef {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub hide_title: bool,
}

/// A single page of the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageDef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next: Vec<LinkDef>,
}

/// Top-level declarative form definition, as authored by a form designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page: Option<String>,
    pub pages: Vec<PageDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ListDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionDef>,
}

fn default_version() -> String {
    "1".into()
}
