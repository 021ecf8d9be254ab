use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use form_engine::{ComponentKind, FormModel, Page};
use serde::Serialize;

use super::{Settings, print_json};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Form definition (JSON)
    #[arg(value_name = "definition.json")]
    pub definition: PathBuf,
    /// Emit machine readable JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    name: Option<String>,
    version: String,
    start_page: String,
    pages: Vec<PageReport>,
    conditions: Vec<ConditionReport>,
    lists: Vec<ListReport>,
}

#[derive(Debug, Serialize)]
struct PageReport {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    fields: Vec<String>,
    links: Vec<LinkReport>,
}

#[derive(Debug, Serialize)]
struct LinkReport {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConditionReport {
    name: String,
    display_name: String,
    expression: String,
}

#[derive(Debug, Serialize)]
struct ListReport {
    name: String,
    items: usize,
    conditional_items: usize,
}

pub fn run(args: &CheckArgs, settings: &Settings) -> Result<()> {
    let model = settings.load_model(&args.definition)?;
    let report = build_report(&model);
    if args.json {
        return print_json(&report);
    }

    println!(
        "form: {} (version {})",
        report.name.as_deref().unwrap_or("unnamed"),
        report.version
    );
    println!("start page: {}", report.start_page);
    println!("pages:");
    for page in &report.pages {
        let scope = page
            .section
            .as_deref()
            .map(|section| format!(" [{section}]"))
            .unwrap_or_default();
        println!("  {}{scope}", page.path);
        if !page.fields.is_empty() {
            println!("    fields: {}", page.fields.join(", "));
        }
        for link in &page.links {
            match &link.condition {
                Some(condition) => println!("    -> {} if {condition}", link.path),
                None => println!("    -> {}", link.path),
            }
        }
    }
    if !report.conditions.is_empty() {
        println!("conditions:");
        for condition in &report.conditions {
            println!("  {}: {}", condition.name, condition.expression);
        }
    }
    if !report.lists.is_empty() {
        println!("lists:");
        for list in &report.lists {
            println!(
                "  {}: {} items ({} conditional)",
                list.name, list.items, list.conditional_items
            );
        }
    }
    Ok(())
}

fn build_report(model: &FormModel) -> CheckReport {
    CheckReport {
        name: model.name().map(str::to_string),
        version: model.version().to_string(),
        start_page: model.start_page().path.clone(),
        pages: model.pages().iter().map(page_report).collect(),
        conditions: model
            .conditions()
            .iter()
            .map(|condition| ConditionReport {
                name: condition.name.clone(),
                display_name: condition.display_name.clone(),
                expression: condition.text.clone(),
            })
            .collect(),
        lists: model
            .lists()
            .map(|list| ListReport {
                name: list.name.clone(),
                items: list.items.len(),
                conditional_items: list
                    .items
                    .iter()
                    .filter(|item| item.condition.is_some())
                    .count(),
            })
            .collect(),
    }
}

fn page_report(page: &Page) -> PageReport {
    PageReport {
        path: page.path.clone(),
        section: page.section.clone(),
        fields: page
            .inputs()
            .map(|component| match &component.kind {
                ComponentKind::Choice { list } | ComponentKind::MultiChoice { list } => {
                    format!("{} <{list}>", page.state_path(component))
                }
                _ => page.state_path(component),
            })
            .collect(),
        links: page
            .links
            .iter()
            .map(|link| LinkReport {
                path: link.path.clone(),
                condition: link.condition.clone(),
            })
            .collect(),
    }
}
