use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use super::{Settings, print_json, read_state};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Form definition (JSON)
    #[arg(value_name = "definition.json")]
    pub definition: PathBuf,
    /// Answer state (JSON)
    #[arg(long = "state", value_name = "state.json")]
    pub state: PathBuf,
    /// Exit with an error when the state has validation errors
    #[arg(long = "strict", default_value_t = false)]
    pub strict: bool,
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &ValidateArgs, settings: &Settings) -> Result<()> {
    let model = settings.load_model(&args.definition)?;
    let state = read_state(&args.state)?;
    let result = model.reconcile(&state);

    if args.json {
        print_json(&result.report())?;
    } else {
        println!("relevant pages: {}", result.relevant_paths().join(" -> "));
        if result.is_complete() {
            println!("complete: no validation errors");
        } else {
            println!("errors:");
            for group in result.errors_by_page() {
                println!("  {}", group.page);
                for error in &group.errors {
                    println!("    {}: {}", error.path, error.message);
                }
            }
        }
        if !result.validation.pruned.is_empty() {
            println!("pruned: {}", result.validation.pruned.join(", "));
        }
        println!("state:");
        println!("{}", serde_json::to_string_pretty(result.pruned_state())?);
    }

    if args.strict && !result.is_complete() {
        bail!(
            "form-runner validate: {} validation error(s) (--strict)",
            result.errors().len()
        );
    }
    Ok(())
}
