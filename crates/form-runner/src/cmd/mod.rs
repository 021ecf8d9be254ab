pub mod check;
pub mod journey;
pub mod schema;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use form_engine::{EngineConfig, FormModel};
use serde_json::Value;
use tracing::debug;

/// Engine settings resolved from `--config` and `--today`.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub engine: EngineConfig,
}

impl Settings {
    pub fn load(config: Option<&Path>, today: Option<&str>) -> Result<Self> {
        let mut engine = match config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                EngineConfig::from_toml(&raw)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        if let Some(today) = today {
            engine.today = Some(today.to_string());
            engine.clock().context("invalid --today")?;
        }
        debug!(?engine, "engine settings");
        Ok(Self { engine })
    }

    pub fn load_model(&self, definition: &Path) -> Result<FormModel> {
        let raw = fs::read_to_string(definition)
            .with_context(|| format!("failed to read definition {}", definition.display()))?;
        let model = FormModel::from_json(&raw)
            .with_context(|| format!("invalid definition {}", definition.display()))?;
        Ok(model.configure(&self.engine)?)
    }
}

/// Reads an answer state document.
pub fn read_state(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read state {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("state {} is not valid JSON", path.display()))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
