//! AssetSidebar strategy: nested strategies over each resource's asset list

use super::{BuildContext, Pipeline, Strategy, StrategyInfo, load_nested};
use crate::config::{Definition, Globals};
use crate::error::{self, Result};
use crate::resource::ResourceList;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetOperation {
    /// Run only on resources that already carry the asset
    Append,
    /// Start every resource with an empty asset list
    Create,
}

#[derive(Debug)]
pub struct AssetSidebarStrategy {
    info: StrategyInfo,
    asset: String,
    operation: AssetOperation,
    pipeline: Pipeline,
}

impl AssetSidebarStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        let info = StrategyInfo::new(definition, "AssetSidebar");
        let asset = definition.require("Asset")?;
        let operation = match definition.get_or("Operation", "append").trim().to_lowercase().as_str() {
            "append" => AssetOperation::Append,
            "create" => AssetOperation::Create,
            _ => {
                return Err(definition.invalid("Operation", &definition.get_or("Operation", "")));
            }
        };
        let pipeline = load_nested(definition, "Strategies", "StrategyConfigFile", ctx)?;
        if pipeline.is_empty() {
            return Err(error::empty_sidebar(&info.name, &info.kind));
        }
        Ok(Self {
            info,
            asset,
            operation,
            pipeline,
        })
    }
}

impl Strategy for AssetSidebarStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        let mut processed = 0;
        for slot in resources.active_indices() {
            let Some(resource) = resources.get_mut(slot) else {
                continue;
            };
            if self.operation == AssetOperation::Create {
                resource.set_asset(&self.asset, ResourceList::new());
            } else if !resource.has_asset(&self.asset) {
                decision!(self.info, resource = %resource.identity(), asset = %self.asset, "no asset, skipped");
                continue;
            }

            let (attributes, Some(asset)) = resource.split_asset_mut(&self.asset) else {
                continue;
            };
            let scope = globals.with_scope(attributes.clone());
            self.pipeline.run(asset, &scope)?;
            processed += 1;
        }
        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use crate::strategy::StrategyRegistry;

    fn asset_sidebar(yaml: &str) -> Result<AssetSidebarStrategy> {
        let registry = StrategyRegistry::default();
        let globals = Globals::new();
        let ctx = BuildContext::new(&registry, &globals);
        AssetSidebarStrategy::new(&Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap(), &ctx)
    }

    #[test]
    fn test_append_skips_resources_without_asset() {
        let strategy = asset_sidebar(
            r#"
Asset: Children
Strategies:
  - Type: Calculator
    Equation: 1
    Result: seen
"#,
        )
        .unwrap();
        let mut resources: ResourceList = vec![Resource::new("a"), Resource::new("b")].into_iter().collect();
        if let Some(children) = resources.get_or_create_asset("a", "children") {
            children.append(Resource::new("a1"));
        }

        assert_eq!(strategy.apply(&mut resources, &Globals::new()).unwrap(), 1);
        let child = resources
            .by_id("a")
            .and_then(|r| r.asset("Children"))
            .and_then(|asset| asset.by_id("a1"));
        assert_eq!(child.and_then(|c| c.get("seen")), Some("1"));
        assert!(!resources.has_asset("b", "Children"));
    }

    #[test]
    fn test_nested_scope_sees_owner_attributes() {
        let strategy = asset_sidebar(
            r#"
Asset: Children
Strategies:
  - Type: Calculator
    Equation: owner * 2
    Result: doubled
"#,
        )
        .unwrap();
        let mut resources: ResourceList = std::iter::once(Resource::new("a").with("owner", "5")).collect();
        if let Some(children) = resources.get_or_create_asset("a", "Children") {
            children.append(Resource::new("a1"));
        }
        strategy.apply(&mut resources, &Globals::new()).unwrap();
        let child = resources
            .by_id("a")
            .and_then(|r| r.asset("Children"))
            .and_then(|asset| asset.by_id("a1"));
        assert_eq!(child.and_then(|c| c.get("doubled")), Some("10"));
    }

    #[test]
    fn test_create_replaces_asset() {
        let strategy = asset_sidebar(
            r#"
Asset: Derived
Operation: Create
Strategies:
  - Type: IsNumeric
    Keyword: v
"#,
        )
        .unwrap();
        let mut resources: ResourceList = vec![Resource::new("a"), Resource::new("b")].into_iter().collect();
        if let Some(derived) = resources.get_or_create_asset("a", "Derived") {
            derived.append(Resource::new("old"));
        }
        assert_eq!(strategy.apply(&mut resources, &Globals::new()).unwrap(), 2);
        for id in ["a", "b"] {
            assert_eq!(
                resources.by_id(id).and_then(|r| r.asset("derived")).map(ResourceList::len),
                Some(0)
            );
        }
    }

    #[test]
    fn test_invalid_operation() {
        let err = asset_sidebar("Asset: x\nOperation: merge\nStrategies: [{Type: IsNumeric, Keyword: k}]\n")
            .unwrap_err();
        assert!(err.to_string().contains("merge"));
    }
}
