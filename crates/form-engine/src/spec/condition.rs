use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connector joining an entry to the entries before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Coordinator {
    And,
    Or,
}

/// Comparison operators available to form designers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Operator {
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "is not")]
    IsNot,
    #[serde(rename = "is more than")]
    IsMoreThan,
    #[serde(rename = "is less than")]
    IsLessThan,
    #[serde(rename = "is at least")]
    IsAtLeast,
    #[serde(rename = "is at most")]
    IsAtMost,
    #[serde(rename = "is before")]
    IsBefore,
    #[serde(rename = "is after")]
    IsAfter,
    #[serde(rename = "is at or before")]
    IsAtOrBefore,
    #[serde(rename = "is at or after")]
    IsAtOrAfter,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "does not contain")]
    DoesNotContain,
    #[serde(rename = "is longer than")]
    IsLongerThan,
    #[serde(rename = "is shorter than")]
    IsShorterThan,
    #[serde(rename = "has length")]
    HasLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Months => "months",
            TimeUnit::Years => "years",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Direction {
    #[serde(rename = "in the past")]
    Past,
    #[serde(rename = "in the future")]
    Future,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ComparisonValue {
    /// A literal answer value.
    Value {
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display: Option<String>,
    },
    /// A date relative to the evaluation day, e.g. "2 years in the past".
    RelativeTime {
        #[serde(rename = "timePeriod")]
        time_period: u32,
        #[serde(rename = "timeUnit")]
        time_unit: TimeUnit,
        direction: Direction,
    },
}

/// Atomic `field operator value` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<Coordinator>,
    pub field: String,
    pub operator: Operator,
    pub value: ComparisonValue,
}

/// Reference to another named condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<Coordinator>,
    pub condition_name: String,
}

/// Parenthesised group of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GroupDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<Coordinator>,
    pub conditions: Vec<ConditionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ConditionEntry {
    Comparison(ComparisonDef),
    Reference(ReferenceDef),
    Group(GroupDef),
}

impl ConditionEntry {
    pub fn coordinator(&self) -> Option<Coordinator> {
        match self {
            ConditionEntry::Comparison(def) => def.coordinator,
            ConditionEntry::Reference(def) => def.coordinator,
            ConditionEntry::Group(def) => def.coordinator,
        }
    }
}

/// The value expression of a condition: entries in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConditionGroupDef {
    pub conditions: Vec<ConditionEntry>,
}

/// Named, reusable boolean predicate over the answer state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(alias = "valueExpression")]
    pub value: ConditionGroupDef,
}
