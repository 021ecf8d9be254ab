//! Whole-journey reconciliation of an answer state.
//!
//! Pages are walked from the start page for the given state, a schema is
//! composed from exactly those pages, and the state is validated against
//! it. Answers left behind on abandoned branches are pruned rather than
//! reported, and they never decide routing or list eligibility.

use serde::Serialize;
use serde_json::Value;

use crate::answers::{Validated, ValidationError};
use crate::model::{FormModel, Page};
use crate::schema::ComposedSchema;

pub struct Reconciliation<'m> {
    model: &'m FormModel,
    pub relevant_pages: Vec<&'m Page>,
    pub schema: ComposedSchema,
    pub validation: Validated,
}

/// Errors of one page, for an error summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageErrors {
    pub page: String,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionErrors {
    pub section: Option<String>,
    pub title: Option<String>,
    pub errors: Vec<ValidationError>,
}

/// One answered question, ready for a check-your-answers page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub path: String,
    pub name: String,
    pub title: String,
    pub display: String,
}

/// Serialisable outcome of [`FormModel::reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub relevant_pages: Vec<String>,
    pub complete: bool,
    pub pruned_state: Value,
    pub pruned_paths: Vec<String>,
    pub errors: Vec<ValidationError>,
    pub errors_by_page: Vec<PageErrors>,
    pub errors_by_section: Vec<SectionErrors>,
    pub summary: Vec<SummaryRow>,
}

impl FormModel {
    pub fn reconcile(&self, state: &Value) -> Reconciliation<'_> {
        let walk = self.walk(state);
        // List eligibility sees the same answers routing did.
        let schema = {
            let ctx = self.context(&walk.answers);
            self.compose_schema(&walk.pages, &ctx)
        };
        let validation = schema.validate(state, self.strip_unknown());
        Reconciliation {
            model: self,
            relevant_pages: walk.pages,
            schema,
            validation,
        }
    }
}

impl<'m> Reconciliation<'m> {
    /// The validated state with abandoned answers removed.
    pub fn pruned_state(&self) -> &Value {
        &self.validation.value
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.validation.errors
    }

    pub fn is_complete(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn relevant_paths(&self) -> Vec<&'m str> {
        self.relevant_pages
            .iter()
            .map(|page| page.path.as_str())
            .collect()
    }

    /// Errors grouped by page, in journey order. Pages without errors are
    /// omitted.
    pub fn errors_by_page(&self) -> Vec<PageErrors> {
        self.relevant_pages
            .iter()
            .filter_map(|page| {
                let errors: Vec<ValidationError> = self
                    .validation
                    .errors
                    .iter()
                    .filter(|error| error.page == page.path)
                    .cloned()
                    .collect();
                (!errors.is_empty()).then(|| PageErrors {
                    page: page.path.clone(),
                    errors,
                })
            })
            .collect()
    }

    /// Errors grouped by section: unsectioned first, then sections in
    /// declaration order.
    pub fn errors_by_section(&self) -> Vec<SectionErrors> {
        let groups = std::iter::once(None).chain(
            self.model
                .sections()
                .iter()
                .map(|section| Some((section.name.as_str(), section.title.as_str()))),
        );
        groups
            .filter_map(|group| {
                let name = group.map(|(name, _)| name);
                let errors: Vec<ValidationError> = self
                    .validation
                    .errors
                    .iter()
                    .filter(|error| error.section.as_deref() == name)
                    .cloned()
                    .collect();
                (!errors.is_empty()).then(|| SectionErrors {
                    section: name.map(str::to_string),
                    title: group.map(|(_, title)| title.to_string()),
                    errors,
                })
            })
            .collect()
    }

    /// Display rows for every answered question on the journey.
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        let ctx = self.model.context(&self.validation.value);
        let mut rows = Vec::new();
        for page in &self.relevant_pages {
            for component in page.inputs() {
                let path = page.state_path(component);
                let Some(value) = ctx.lookup(&path).filter(|value| !value.is_null()) else {
                    continue;
                };
                rows.push(SummaryRow {
                    page: page.path.clone(),
                    section: page.section.clone(),
                    name: component.name.clone(),
                    title: component.title.clone(),
                    display: component.display_string(value, self.model),
                    path,
                });
            }
        }
        rows
    }

    pub fn report(&self) -> ReconciliationReport {
        ReconciliationReport {
            relevant_pages: self
                .relevant_pages
                .iter()
                .map(|page| page.path.clone())
                .collect(),
            complete: self.is_complete(),
            pruned_state: self.validation.value.clone(),
            pruned_paths: self.validation.pruned.clone(),
            errors: self.validation.errors.clone(),
            errors_by_page: self.errors_by_page(),
            errors_by_section: self.errors_by_section(),
            summary: self.summary_rows(),
        }
    }
}
