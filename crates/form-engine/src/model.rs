//! The compiled, immutable form model.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::info;

use crate::components::Component;
use crate::conditions::{ConditionTable, compile_conditions};
use crate::config::{Clock, EngineConfig};
use crate::context::EvaluationContext;
use crate::error::{ConfigError, DefinitionError};
use crate::lists::{List, ListItem, eligible_items};
use crate::load::parse_definition;
use crate::spec::FormDefinition;

/// Path of the terminal page appended to every form.
pub const SUBMITTED_PAGE_PATH: &str = "/status";

const ROOT_SCOPE: &str = "<root>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub path: String,
    pub condition: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub path: String,
    pub title: Option<String>,
    pub section: Option<String>,
    pub components: Vec<Component>,
    pub links: Vec<Link>,
}

impl Page {
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|component| component.name == name)
    }

    /// Components that store answers.
    pub fn inputs(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|component| component.is_input())
    }

    /// State path of a component on this page.
    pub fn state_path(&self, component: &Component) -> String {
        match &self.section {
            Some(section) => format!("{section}.{}", component.name),
            None => component.name.clone(),
        }
    }

    pub fn is_submitted_page(&self) -> bool {
        self.path == SUBMITTED_PAGE_PATH
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub title: String,
    pub hide_title: bool,
}

/// A loaded form: pages, sections, lists and compiled conditions.
///
/// Built once and shared read-only; every evaluation builds its own
/// [`EvaluationContext`].
#[derive(Debug, Clone)]
pub struct FormModel {
    name: Option<String>,
    version: String,
    pages: Vec<Page>,
    index: BTreeMap<String, usize>,
    sections: Vec<Section>,
    lists: BTreeMap<String, List>,
    conditions: ConditionTable,
    start: usize,
    clock: Clock,
    strip_unknown: bool,
}

impl FormModel {
    pub fn from_json(raw: &str) -> Result<Self, DefinitionError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(raw: Value) -> Result<Self, DefinitionError> {
        Self::from_definition(parse_definition(raw)?)
    }

    /// Compiles an already deserialised definition. Structural checks are
    /// skipped; every semantic check still runs.
    pub fn from_definition(def: FormDefinition) -> Result<Self, DefinitionError> {
        if def.pages.is_empty() {
            return Err(DefinitionError::NoPages);
        }

        let mut sections = Vec::with_capacity(def.sections.len());
        for section in &def.sections {
            if sections.iter().any(|known: &Section| known.name == section.name) {
                return Err(DefinitionError::DuplicateSection {
                    name: section.name.clone(),
                });
            }
            sections.push(Section {
                name: section.name.clone(),
                title: section.title.clone(),
                hide_title: section.hide_title,
            });
        }

        let mut lists = BTreeMap::new();
        for list in &def.lists {
            if let Some(item) = list.items.iter().find(|item| !list.kind.matches(&item.value)) {
                return Err(DefinitionError::ListItemType {
                    list: list.name.clone(),
                    value: item.value.to_string(),
                    expected: list.kind.as_str(),
                });
            }
            if lists.insert(list.name.clone(), List::from_def(list)).is_some() {
                return Err(DefinitionError::DuplicateList {
                    name: list.name.clone(),
                });
            }
        }

        let mut pages = Vec::with_capacity(def.pages.len() + 1);
        let mut index = BTreeMap::new();
        let mut scopes: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut known_fields = BTreeSet::new();
        for page in &def.pages {
            if !page.path.starts_with('/') {
                return Err(DefinitionError::InvalidPath {
                    path: page.path.clone(),
                });
            }
            if page.path == SUBMITTED_PAGE_PATH || index.contains_key(&page.path) {
                return Err(DefinitionError::DuplicatePage {
                    path: page.path.clone(),
                });
            }
            if let Some(section) = &page.section
                && !sections.iter().any(|known| &known.name == section)
            {
                return Err(DefinitionError::UnknownSection {
                    page: page.path.clone(),
                    section: section.clone(),
                });
            }

            let scope = page.section.as_deref().unwrap_or(ROOT_SCOPE);
            let mut components = Vec::with_capacity(page.components.len());
            for def in &page.components {
                let component = Component::compile(&page.path, def, &lists)?;
                if component.is_input() {
                    if page.section.is_none()
                        && sections.iter().any(|known| known.name == def.name)
                    {
                        return Err(DefinitionError::FieldShadowsSection {
                            page: page.path.clone(),
                            name: def.name.clone(),
                        });
                    }
                    if !scopes.entry(scope).or_default().insert(def.name.as_str()) {
                        return Err(DefinitionError::DuplicateComponent {
                            scope: scope.to_string(),
                            name: def.name.clone(),
                        });
                    }
                    known_fields.insert(match &page.section {
                        Some(section) => format!("{section}.{}", def.name),
                        None => def.name.clone(),
                    });
                }
                components.push(component);
            }

            index.insert(page.path.clone(), pages.len());
            pages.push(Page {
                path: page.path.clone(),
                title: page.title.clone(),
                section: page.section.clone(),
                components,
                links: page
                    .next
                    .iter()
                    .map(|link| Link {
                        path: link.path.clone(),
                        condition: link.condition.clone(),
                    })
                    .collect(),
            });
        }

        index.insert(SUBMITTED_PAGE_PATH.to_string(), pages.len());
        pages.push(Page {
            path: SUBMITTED_PAGE_PATH.to_string(),
            title: None,
            section: None,
            components: Vec::new(),
            links: Vec::new(),
        });

        let conditions = compile_conditions(&def.conditions, &known_fields)?;

        for page in &pages {
            for link in &page.links {
                if !index.contains_key(&link.path) {
                    return Err(DefinitionError::UnknownLink {
                        page: page.path.clone(),
                        target: link.path.clone(),
                    });
                }
                if let Some(condition) = &link.condition
                    && !conditions.contains(condition)
                {
                    return Err(DefinitionError::UnknownCondition {
                        owner: format!("link '{}' -> '{}'", page.path, link.path),
                        condition: condition.clone(),
                    });
                }
            }
        }
        for list in lists.values() {
            for item in &list.items {
                if let Some(condition) = &item.condition
                    && !conditions.contains(condition)
                {
                    return Err(DefinitionError::UnknownCondition {
                        owner: format!("list '{}' item '{}'", list.name, item.text),
                        condition: condition.clone(),
                    });
                }
            }
        }

        let start = match &def.start_page {
            Some(path) => *index
                .get(path)
                .ok_or_else(|| DefinitionError::UnknownStartPage { path: path.clone() })?,
            None => 0,
        };

        info!(
            form = def.name.as_deref().unwrap_or("unnamed"),
            pages = pages.len(),
            sections = sections.len(),
            lists = lists.len(),
            conditions = conditions.len(),
            "form definition loaded"
        );

        Ok(Self {
            name: def.name,
            version: def.version,
            pages,
            index,
            sections,
            lists,
            conditions,
            start,
            clock: Clock::default(),
            strip_unknown: true,
        })
    }

    /// Applies engine settings (clock, unknown-key handling).
    pub fn configure(mut self, config: &EngineConfig) -> Result<Self, ConfigError> {
        self.clock = config.clock()?;
        self.strip_unknown = config.strip_unknown;
        Ok(self)
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn strip_unknown(&self) -> bool {
        self.strip_unknown
    }

    /// Fresh evaluation context over `state` for a single pass.
    pub fn context<'a>(&'a self, state: &'a Value) -> EvaluationContext<'a> {
        EvaluationContext::new(state, &self.conditions, self.clock.today())
    }

    /// Evaluates a named condition. Unknown names and evaluation failures
    /// count as "not satisfied".
    pub fn evaluate(&self, condition: &str, state: &Value) -> bool {
        self.context(state).is_satisfied(condition)
    }

    pub fn page(&self, path: &str) -> Option<&Page> {
        self.index.get(path).map(|position| &self.pages[*position])
    }

    /// Every page in declaration order, the terminal page last.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn start_page(&self) -> &Page {
        &self.pages[self.start]
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn list(&self, name: &str) -> Option<&List> {
        self.lists.get(name)
    }

    pub fn lists(&self) -> impl Iterator<Item = &List> {
        self.lists.values()
    }

    pub fn conditions(&self) -> &ConditionTable {
        &self.conditions
    }

    /// Items of the named list eligible for `state`.
    pub fn eligible_items(&self, list: &str, state: &Value) -> Vec<&ListItem> {
        match self.list(list) {
            Some(list) => eligible_items(list, &self.context(state)),
            None => Vec::new(),
        }
    }
}
