//! Page-to-page traversal.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::context::EvaluationContext;
use crate::model::{FormModel, Page};

impl FormModel {
    /// Next page after `page` for `state`: the first link whose condition
    /// is absent or holds. `None` means `page` is terminal for this state.
    pub fn next_page(&self, page: &Page, state: &Value) -> Option<&Page> {
        self.next_page_in(page, &self.context(state))
    }

    pub fn next_page_in(&self, page: &Page, ctx: &EvaluationContext<'_>) -> Option<&Page> {
        let link = page.links.iter().find(|link| match &link.condition {
            Some(condition) => ctx.is_satisfied(condition),
            None => true,
        })?;
        debug!(from = %page.path, to = %link.path, condition = ?link.condition, "link taken");
        self.page(&link.path)
    }

    /// Path of the page after `current`, or `None` when `current` is
    /// terminal or unknown.
    pub fn next_path(&self, current: &str, state: &Value) -> Option<&str> {
        let page = self.page(current)?;
        self.next_page(page, state).map(|next| next.path.as_str())
    }

    /// Pages a user with `state` would visit starting at `start`, in order.
    /// The terminal status page is never included.
    pub fn relevant_pages(&self, start: &str, state: &Value) -> Vec<&Page> {
        self.walk_from(start, state).pages
    }

    /// The journey from the form's start page.
    pub fn journey(&self, state: &Value) -> Vec<&Page> {
        self.walk(state).pages
    }

    /// Walks from the start page. Links are only decided by answers asked
    /// on pages already walked, so answers left on abandoned branches never
    /// steer the journey.
    pub fn walk(&self, state: &Value) -> Walk<'_> {
        self.walk_with(&self.start_page().path, state, Map::new())
    }

    /// Walks from `start`. Answers given on the journey before `start` still
    /// count; when `start` is off the journey, every journey answer does.
    pub fn walk_from(&self, start: &str, state: &Value) -> Walk<'_> {
        let journey = self.walk(state);
        if start == self.start_page().path {
            return journey;
        }
        let mut seed = Map::new();
        for page in journey.pages.iter().take_while(|page| page.path != start) {
            collect_answers(page, state, &mut seed);
        }
        self.walk_with(start, state, seed)
    }

    fn walk_with(&self, start: &str, state: &Value, seed: Map<String, Value>) -> Walk<'_> {
        let mut pages = Vec::new();
        let mut visited = BTreeSet::new();
        let mut answers = Value::Object(seed);
        let mut current = self.page(start);
        while let Some(page) = current {
            if page.is_submitted_page() {
                break;
            }
            // A revisit would repeat forever: traversal is a pure function
            // of the page and the state.
            if !visited.insert(page.path.as_str()) {
                warn!(page = %page.path, "page reached twice; stopping traversal");
                break;
            }
            pages.push(page);
            if let Value::Object(collected) = &mut answers {
                collect_answers(page, state, collected);
            }
            current = self.next_page_in(page, &self.context(&answers));
        }
        Walk { pages, answers }
    }
}

/// Pages visited by one walk.
#[derive(Debug, Clone)]
pub struct Walk<'m> {
    pub pages: Vec<&'m Page>,
    /// The walked state restricted to answers asked on `pages`.
    pub answers: Value,
}

fn collect_answers(page: &Page, source: &Value, answers: &mut Map<String, Value>) {
    let (from, to) = match &page.section {
        Some(section) => {
            let Some(from) = source.get(section).and_then(Value::as_object) else {
                return;
            };
            let scope = answers
                .entry(section.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(to) = scope else {
                return;
            };
            (from, to)
        }
        None => match source.as_object() {
            Some(from) => (from, answers),
            None => return,
        },
    };
    for component in page.inputs() {
        if let Some(answer) = from.get(&component.name) {
            to.insert(component.name.clone(), answer.clone());
        }
    }
}
