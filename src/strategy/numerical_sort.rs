//! NumericalSort strategy: stable sort of the active view by a numeric keyword

use std::cmp::Ordering;

use super::{Strategy, StrategyInfo};
use crate::config::{Definition, Globals};
use crate::error::{self, Result};
use crate::resource::{Resource, ResourceList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "ascending" => Some(Self::Ascending),
            "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct NumericalSortStrategy {
    info: StrategyInfo,
    sort_key: String,
    order: SortOrder,
}

impl NumericalSortStrategy {
    pub fn new(definition: &Definition) -> Result<Self> {
        let info = StrategyInfo::new(definition, "NumericalSort");
        let order = match definition.get_str("Order") {
            None => SortOrder::default(),
            Some(text) => {
                SortOrder::parse(&text).ok_or_else(|| error::invalid_sort_order(&info.name, &text))?
            }
        };
        Ok(Self {
            sort_key: definition.require("SortKey")?,
            order,
            info,
        })
    }

    fn key(&self, resource: &Resource) -> Option<f64> {
        resource
            .get(&self.sort_key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| !v.is_nan())
    }

    /// Unparsable values go last in either order
    fn compare(&self, a: &Resource, b: &Resource) -> Ordering {
        match (self.key(a), self.key(b)) {
            (Some(x), Some(y)) => {
                let ordering = x.total_cmp(&y);
                match self.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl Strategy for NumericalSortStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, _globals: &Globals) -> Result<usize> {
        resources.sort_active_by(|a, b| self.compare(a, b));
        decision!(self.info, key = %self.sort_key, order = ?self.order, "sorted");
        Ok(resources.active_count())
    }
}
