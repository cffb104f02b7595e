//! Filter strategy: keep resources by keyword value membership

use std::collections::HashSet;

use super::{Strategy, StrategyInfo, retain_active};
use crate::config::{Definition, Globals};
use crate::error::Result;
use crate::resource::ResourceList;

#[derive(Debug)]
pub struct FilterStrategy {
    info: StrategyInfo,
    keyword: String,
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl FilterStrategy {
    pub fn new(definition: &Definition) -> Result<Self> {
        Ok(Self {
            info: StrategyInfo::new(definition, "Filter"),
            keyword: definition.require("Keyword")?,
            include: definition.get_list("Include").into_iter().collect(),
            exclude: definition.get_list("Exclude").into_iter().collect(),
        })
    }

    /// A missing keyword is matched as the empty string
    fn keeps(&self, value: &str) -> bool {
        (self.include.is_empty() || self.include.contains(value))
            && (self.exclude.is_empty() || !self.exclude.contains(value))
    }
}

impl Strategy for FilterStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, _globals: &Globals) -> Result<usize> {
        if self.include.is_empty() && self.exclude.is_empty() {
            return Ok(resources.active_count());
        }
        retain_active(&self.info, resources, |resource| {
            Ok(self.keeps(resource.get(&self.keyword).unwrap_or_default()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;

    fn filter(yaml: &str) -> FilterStrategy {
        FilterStrategy::new(&Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap())
            .unwrap()
    }

    fn targets() -> ResourceList {
        [("a", "Mars"), ("b", "Moon"), ("c", "Mars"), ("d", "Mercury")]
            .iter()
            .map(|(id, t)| Resource::new(*id).with("Target", *t))
            .collect()
    }

    fn active(list: &ResourceList) -> Vec<&str> {
        list.active_iter().map(Resource::identity).collect()
    }

    #[test]
    fn test_include() {
        let mut list = targets();
        let kept = filter("Keyword: Target\nInclude: Mars\n")
            .apply(&mut list, &Globals::new())
            .unwrap();
        assert_eq!(kept, 2);
        assert_eq!(active(&list), vec!["a", "c"]);
    }

    #[test]
    fn test_include_and_exclude() {
        let mut list = targets();
        filter("Keyword: Target\nInclude: [Mars, Moon]\nExclude: [Moon]\n")
            .apply(&mut list, &Globals::new())
            .unwrap();
        assert_eq!(active(&list), vec!["a", "c"]);
    }

    #[test]
    fn test_no_sets_is_noop() {
        let mut list = targets();
        filter("Keyword: Target\n").apply(&mut list, &Globals::new()).unwrap();
        assert_eq!(list.active_count(), 4);
    }

    #[test]
    fn test_missing_keyword_matches_empty() {
        let mut list: ResourceList = vec![Resource::new("a"), Resource::new("b").with("Target", "Io")]
            .into_iter()
            .collect();
        filter("Keyword: Target\nExclude: Io\n")
            .apply(&mut list, &Globals::new())
            .unwrap();
        assert_eq!(active(&list), vec!["a"]);
    }

    #[test]
    fn test_keyword_is_required() {
        let def = Definition::from_value(&serde_yaml::from_str("Type: Filter\nInclude: x\n").unwrap()).unwrap();
        assert!(FilterStrategy::new(&def).is_err());
    }
}
