//! Sidebar strategy: nested strategies over the same resources

use super::{BuildContext, Pipeline, Strategy, StrategyInfo, load_nested};
use crate::config::{Definition, Globals};
use crate::error::{self, Result};
use crate::resource::ResourceList;

#[derive(Debug)]
pub struct SidebarStrategy {
    info: StrategyInfo,
    pipeline: Pipeline,
    save_delete: bool,
}

impl SidebarStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        let info = StrategyInfo::new(definition, "Sidebar");
        let pipeline = load_nested(definition, "Strategies", "StrategyConfigFile", ctx)?;
        if pipeline.is_empty() {
            return Err(error::empty_sidebar(&info.name, &info.kind));
        }
        Ok(Self {
            save_delete: definition.get_bool("SaveDelete", false)?,
            info,
            pipeline,
        })
    }
}

impl Strategy for SidebarStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        let saved = (!self.save_delete).then(|| resources.discard_state());

        let reports = self.pipeline.run(resources, globals)?;
        decision!(self.info, stages = reports.len(), "nested strategies complete");

        if let Some(state) = saved {
            resources.restore_discard_state(&state);
        }
        Ok(resources.active_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use crate::strategy::StrategyRegistry;

    fn sidebar(yaml: &str) -> Result<SidebarStrategy> {
        let registry = StrategyRegistry::default();
        let globals = Globals::new();
        let ctx = BuildContext::new(&registry, &globals);
        SidebarStrategy::new(&Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap(), &ctx)
    }

    fn list() -> ResourceList {
        [("a", "1"), ("b", "2"), ("c", "3")]
            .iter()
            .map(|(id, v)| Resource::new(*id).with("v", *v))
            .collect()
    }

    const NESTED: &str = r#"
Type: Sidebar
Strategies:
  - Type: Limit
    Equation: v > 1
  - Type: Calculator
    Equation: v * 10
    Result: w
"#;

    #[test]
    fn test_restores_discards_by_default() {
        let mut resources = list();
        sidebar(NESTED).unwrap().apply(&mut resources, &Globals::new()).unwrap();
        assert_eq!(resources.active_count(), 3);
        // attribute changes made inside are kept
        assert_eq!(resources.by_id("c").and_then(|r| r.get("w")), Some("30"));
        assert!(!resources.by_id("a").unwrap().contains("w"));
    }

    #[test]
    fn test_save_delete_keeps_discards() {
        let mut resources = list();
        let yaml = format!("{NESTED}SaveDelete: true\n");
        sidebar(&yaml).unwrap().apply(&mut resources, &Globals::new()).unwrap();
        assert_eq!(resources.active_count(), 2);
    }

    #[test]
    fn test_empty_sidebar_is_error() {
        assert!(sidebar("Type: Sidebar\nName: Nothing\n").is_err());
    }
}
