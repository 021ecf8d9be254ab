use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{Settings, print_json, read_state};

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Form definition (JSON)
    #[arg(value_name = "definition.json")]
    pub definition: PathBuf,
    /// Answer state (JSON); an empty state when omitted
    #[arg(long = "state", value_name = "state.json")]
    pub state: Option<PathBuf>,
}

pub fn run(args: &SchemaArgs, settings: &Settings) -> Result<()> {
    let model = settings.load_model(&args.definition)?;
    let state = match &args.state {
        Some(path) => read_state(path)?,
        None => json!({}),
    };
    let walk = model.walk(&state);
    let ctx = model.context(&walk.answers);
    print_json(&model.compose_schema(&walk.pages, &ctx).to_json_schema())
}
