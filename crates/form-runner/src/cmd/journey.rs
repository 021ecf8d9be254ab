use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;
use serde::Serialize;

use super::{Settings, print_json, read_state};

#[derive(Args, Debug, Clone)]
pub struct JourneyArgs {
    /// Form definition (JSON)
    #[arg(value_name = "definition.json")]
    pub definition: PathBuf,
    /// Answer state (JSON)
    #[arg(long = "state", value_name = "state.json")]
    pub state: PathBuf,
    /// Page to walk from; defaults to the start page
    #[arg(long = "from", value_name = "PATH")]
    pub from: Option<String>,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JourneyReport<'a> {
    from: &'a str,
    relevant_pages: Vec<&'a str>,
    next_path: Option<&'a str>,
}

pub fn run(args: &JourneyArgs, settings: &Settings) -> Result<()> {
    let model = settings.load_model(&args.definition)?;
    let state = read_state(&args.state)?;

    let from = match &args.from {
        Some(path) => model
            .page(path)
            .ok_or_else(|| anyhow!("page '{path}' is not part of the form"))?,
        None => model.start_page(),
    };
    let pages = model.relevant_pages(&from.path, &state);
    let report = JourneyReport {
        from: &from.path,
        relevant_pages: pages.iter().map(|page| page.path.as_str()).collect(),
        next_path: model.next_path(&from.path, &state),
    };

    if args.json {
        return print_json(&report);
    }
    for path in &report.relevant_pages {
        println!("{path}");
    }
    match report.next_path {
        Some(next) => println!("next after {}: {next}", report.from),
        None => println!("{} is terminal for this state", report.from),
    }
    Ok(())
}
