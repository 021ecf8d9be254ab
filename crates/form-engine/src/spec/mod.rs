pub mod component;
pub mod condition;
pub mod form;
pub mod list;

pub use component::{ComponentDef, ComponentOptions, ComponentType, FieldBounds};
pub use condition::{
    ComparisonDef, ComparisonValue, ConditionDef, ConditionEntry, ConditionGroupDef, Coordinator,
    Direction, GroupDef, Operator, ReferenceDef, TimeUnit,
};
pub use form::{FormDefinition, LinkDef, PageDef, SectionDef};
pub use list::{ListDef, ListItemDef, ListType};
