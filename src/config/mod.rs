//! Miner configuration
//!
//! A configuration file is YAML (JSON also parses) with a top-level `Name`,
//! optional `RequiredParameters` and an ordered `Strategies` list. Keywords
//! are matched case-insensitively throughout.

mod definition;
mod globals;
mod parameters;

pub use definition::{Definition, expand_template, parse_bool, scalar_to_string, value_to_list};
pub use globals::{Globals, ResourceScope};
pub use parameters::parse_parameters;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::{self, Result};
use crate::resource::Attributes;

/// A loaded configuration file
#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub name: String,
    pub required_parameters: Vec<String>,
    pub strategies: Vec<Definition>,
    pub path: Option<PathBuf>,
}

impl MinerConfig {
    /// Load a configuration file from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(error::config_not_found(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| error::file_read_failed(path.display().to_string(), e.to_string()))?;
        let mut config = Self::from_yaml(&text)
            .map_err(|e| error::config_parse_failed(path.display().to_string(), e.to_string()))?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration text
    ///
    /// Accepts a mapping with a `Strategies` list, a bare list of strategies,
    /// or a single strategy mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => Ok(Self {
                name: "Miner".to_string(),
                required_parameters: Vec::new(),
                strategies: definitions_from(items)?,
                path: None,
            }),
            Value::Mapping(_) => {
                let top = Definition::from_value(value)?;
                let strategies = match top.find("Strategies") {
                    Some(Value::Sequence(items)) => definitions_from(items)?,
                    Some(_) => {
                        return Err(error::config_invalid("Strategies must be a list"));
                    }
                    None if top.kind().is_some() => vec![top.clone()],
                    None => Vec::new(),
                };
                Ok(Self {
                    name: top.get_or("Name", "Miner"),
                    required_parameters: top.get_list("RequiredParameters"),
                    strategies,
                    path: None,
                })
            }
            Value::Null => Err(error::config_invalid("configuration is empty")),
            _ => Err(error::config_invalid(
                "configuration must be a mapping or a list of strategies",
            )),
        }
    }

    /// Every required parameter must resolve in the globals; all missing
    /// names are reported together
    pub fn validate_parameters(&self, globals: &Globals) -> Result<()> {
        let missing: Vec<String> = self
            .required_parameters
            .iter()
            .filter(|name| !globals.contains(name))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(error::missing_parameters(&missing))
        }
    }
}

fn definitions_from(items: &[Value]) -> Result<Vec<Definition>> {
    items.iter().map(Definition::from_value).collect()
}

/// Load a globals file: a YAML mapping of keyword to scalar or list
pub fn load_globals(path: &Path) -> Result<Attributes> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| error::file_read_failed(path.display().to_string(), e.to_string()))?;
    let map: IndexMap<String, Value> = serde_yaml::from_str(&text)
        .map_err(|e| error::config_parse_failed(path.display().to_string(), e.to_string()))?;

    let mut globals = Attributes::new();
    for (key, value) in &map {
        globals.set_values(key.clone(), value_to_list(value));
    }
    Ok(globals)
}
