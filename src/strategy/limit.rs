//! Limit strategy: keep resources for which an equation is true

use super::{Strategy, StrategyInfo, retain_active};
use crate::config::{Definition, Globals, ResourceScope};
use crate::error::Result;
use crate::expression::Equation;
use crate::resource::ResourceList;

#[derive(Debug)]
pub struct LimitStrategy {
    info: StrategyInfo,
    equation: Equation,
}

impl LimitStrategy {
    pub fn new(definition: &Definition) -> Result<Self> {
        Ok(Self {
            info: StrategyInfo::new(definition, "Limit"),
            equation: Equation::parse(&definition.require("Equation")?)?,
        })
    }
}

impl Strategy for LimitStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        retain_active(&self.info, resources, |resource| {
            self.equation
                .is_true(&ResourceScope::new(resource.attributes(), globals))
        })
    }
}
