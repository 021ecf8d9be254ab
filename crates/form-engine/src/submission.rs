use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::answers::ValidationError;
use crate::model::{FormModel, Page};

/// Outcome of posting one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSubmission {
    /// State with the page's answers merged in (normalised when valid).
    pub state: Value,
    pub errors: Vec<ValidationError>,
    /// Where to go next; `None` while the page has errors or when the page
    /// is terminal for the new state.
    pub next_path: Option<String>,
}

impl PageSubmission {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl FormModel {
    /// Merges a raw page payload into `state`, validates that page alone and
    /// decides the next page. Returns `None` for an unknown page.
    pub fn submit_page(
        &self,
        path: &str,
        payload: &Map<String, Value>,
        state: &Value,
    ) -> Option<PageSubmission> {
        let page = self.page(path)?;
        let merged = merge_page(self, page, payload, state);

        let validated = {
            let ctx = self.context(&merged);
            self.page_schema(page, &ctx).validate(&merged, false)
        };
        if !validated.is_valid() {
            debug!(page = path, errors = validated.errors.len(), "page rejected");
            return Some(PageSubmission {
                state: merged,
                errors: validated.errors,
                next_path: None,
            });
        }

        let state = validated.value;
        let next_path = self
            .next_page(page, &state)
            .map(|next| next.path.clone());
        Some(PageSubmission {
            state,
            errors: Vec::new(),
            next_path,
        })
    }

    /// Raw payload that pre-fills `path` from `state`.
    pub fn page_payload(&self, path: &str, state: &Value) -> Option<Map<String, Value>> {
        let page = self.page(path)?;
        let ctx = self.context(state);
        let mut payload = Map::new();
        for component in page.inputs() {
            payload.extend(component.from_state(ctx.lookup(&page.state_path(component))));
        }
        Some(payload)
    }
}

fn merge_page(model: &FormModel, page: &Page, payload: &Map<String, Value>, state: &Value) -> Value {
    let mut root = state.as_object().cloned().unwrap_or_default();
    let mut scope = match &page.section {
        Some(section) => match root.remove(section) {
            Some(Value::Object(answers)) => answers,
            _ => Map::new(),
        },
        None => std::mem::take(&mut root),
    };

    for component in page.inputs() {
        match component.to_state(payload, model) {
            Value::Null => {
                scope.remove(&component.name);
            }
            value => {
                scope.insert(component.name.clone(), value);
            }
        }
    }

    match &page.section {
        Some(section) => {
            root.insert(section.clone(), Value::Object(scope));
        }
        None => root = scope,
    }
    Value::Object(root)
}
