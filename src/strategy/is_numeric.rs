//! IsNumeric strategy: keep resources whose keyword value is a number

use super::{Strategy, StrategyInfo, retain_active};
use crate::config::{Definition, Globals};
use crate::error::Result;
use crate::resource::ResourceList;

#[derive(Debug)]
pub struct IsNumericStrategy {
    info: StrategyInfo,
    keyword: String,
}

impl IsNumericStrategy {
    pub fn new(definition: &Definition) -> Result<Self> {
        Ok(Self {
            info: StrategyInfo::new(definition, "IsNumeric"),
            keyword: definition.require("Keyword")?,
        })
    }
}

impl Strategy for IsNumericStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, _globals: &Globals) -> Result<usize> {
        retain_active(&self.info, resources, |resource| {
            Ok(resource
                .get(&self.keyword)
                .is_some_and(|value| value.trim().parse::<f64>().is_ok()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;

    fn strategy() -> IsNumericStrategy {
        let def = Definition::from_value(&serde_yaml::from_str("Type: IsNumeric\nKeyword: x\n").unwrap())
            .unwrap();
        IsNumericStrategy::new(&def).unwrap()
    }

    #[test]
    fn test_discards_non_numeric() {
        let mut list: ResourceList = ["1.5", "abc", "-2", "1e3", "", "7"]
            .iter()
            .enumerate()
            .map(|(i, v)| Resource::new(format!("r{i}")).with("x", *v))
            .collect();
        let kept = strategy().apply(&mut list, &Globals::new()).unwrap();
        assert_eq!(kept, 4);
        assert_eq!(list.active_count(), 4);
    }

    #[test]
    fn test_absent_attribute_discards() {
        let mut list: ResourceList = vec![Resource::new("a"), Resource::new("b")].into_iter().collect();
        assert_eq!(strategy().apply(&mut list, &Globals::new()).unwrap(), 0);
        assert_eq!(list.active_count(), 0);
    }
}
