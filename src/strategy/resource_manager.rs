//! ResourceManager strategy: discard flag and asset housekeeping

use std::fmt;

use super::{Strategy, StrategyInfo};
use crate::config::{Definition, Globals};
use crate::error::{self, Result};
use crate::resource::ResourceList;

/// One validated `Operations` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ResetDiscard,
    ToggleDiscard,
    DeleteDiscard,
    HasAsset(String),
    DeleteAsset(String),
}

impl Operation {
    /// Parses `Name` or `Name::asset`, ignoring case in the operation name
    pub fn parse(token: &str) -> std::result::Result<Self, String> {
        let parts: Vec<&str> = token.trim().split("::").collect();
        match parts.as_slice() {
            [name] => match name.to_lowercase().as_str() {
                "resetdiscard" => Ok(Self::ResetDiscard),
                "togglediscard" => Ok(Self::ToggleDiscard),
                "deletediscard" => Ok(Self::DeleteDiscard),
                "hasasset" | "deleteasset" => Err(format!("[{token}] requires an asset name")),
                _ => Err(format!("[{token}] is not a known operation")),
            },
            [name, asset] => {
                if asset.trim().is_empty() {
                    return Err(format!("[{token}] requires an asset name"));
                }
                let asset = asset.trim().to_string();
                match name.to_lowercase().as_str() {
                    "hasasset" => Ok(Self::HasAsset(asset)),
                    "deleteasset" => Ok(Self::DeleteAsset(asset)),
                    _ => Err(format!("[{token}] is not a known asset operation")),
                }
            }
            _ => Err(format!("[{token}] is ill-formed")),
        }
    }

    /// Runs against the list, returning how many resources were affected
    fn run(&self, resources: &mut ResourceList) -> usize {
        match self {
            Self::ResetDiscard => {
                resources.reset_discard_all();
                resources.len()
            }
            Self::ToggleDiscard => {
                resources.toggle_discard_all();
                resources.len()
            }
            Self::DeleteDiscard => resources.delete_discarded(),
            Self::HasAsset(asset) => {
                let mut discarded = 0;
                for resource in resources.active_iter_mut() {
                    if !resource.has_asset(asset) {
                        resource.discard();
                        discarded += 1;
                    }
                }
                discarded
            }
            Self::DeleteAsset(asset) => resources
                .active_iter_mut()
                .filter_map(|resource| resource.delete_asset(asset))
                .count(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResetDiscard => write!(f, "ResetDiscard"),
            Self::ToggleDiscard => write!(f, "ToggleDiscard"),
            Self::DeleteDiscard => write!(f, "DeleteDiscard"),
            Self::HasAsset(asset) => write!(f, "HasAsset::{asset}"),
            Self::DeleteAsset(asset) => write!(f, "DeleteAsset::{asset}"),
        }
    }
}

#[derive(Debug)]
pub struct ResourceManagerStrategy {
    info: StrategyInfo,
    operations: Vec<Operation>,
}

impl ResourceManagerStrategy {
    pub fn new(definition: &Definition) -> Result<Self> {
        let info = StrategyInfo::new(definition, "ResourceManager");
        let tokens = definition.get_list("Operations");
        if tokens.is_empty() {
            return Err(error::missing_key(&info.name, &info.kind, "Operations"));
        }

        let mut operations = Vec::with_capacity(tokens.len());
        let mut problems = Vec::new();
        for token in &tokens {
            match Operation::parse(token) {
                Ok(op) => operations.push(op),
                Err(problem) => problems.push(problem),
            }
        }
        if !problems.is_empty() {
            return Err(error::invalid_operations(&info.name, &problems));
        }

        Ok(Self { info, operations })
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

impl Strategy for ResourceManagerStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, _globals: &Globals) -> Result<usize> {
        let mut total = 0;
        for operation in &self.operations {
            let affected = operation.run(resources);
            decision!(self.info, operation = %operation, affected, "operation applied");
            total += affected;
        }
        Ok(total)
    }
}
