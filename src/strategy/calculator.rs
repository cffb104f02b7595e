//! Calculator strategy: evaluate equations into resource keywords

use serde_yaml::Value;

use super::{Strategy, StrategyInfo};
use crate::config::{Definition, Globals, ResourceScope, scalar_to_string};
use crate::error::{self, MinerError, Result};
use crate::expression::{Equation, format_number};
use crate::resource::{IDENTITY_KEY, Resource, ResourceList};

/// Initializers plus an ordered equation list
///
/// Shared by the Calculator strategy and the StereoPair rank step.
#[derive(Debug, Clone, Default)]
pub struct Calculation {
    initializers: Vec<(String, String)>,
    equations: Vec<(String, Equation)>,
}

impl Calculation {
    /// Reads `Initializers`, `Equations` and the legacy `Equation` + `Result`
    ///
    /// Every ill-formed equation is reported, not just the first.
    pub fn from_definition(definition: &Definition) -> Result<Self> {
        let initializers = definition
            .mapping("Initializers")
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?)))
                    .collect()
            })
            .unwrap_or_default();

        let mut sources: Vec<(String, String)> = Vec::new();
        match definition.find("Equations") {
            Some(Value::Sequence(items)) => {
                for item in items {
                    match item {
                        Value::Mapping(map) => sources.extend(
                            map.iter()
                                .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?))),
                        ),
                        other => {
                            return Err(error::config_invalid(format!(
                                "Equations entries must map a result keyword to an equation, found {other:?}"
                            )));
                        }
                    }
                }
            }
            Some(Value::Mapping(map)) => sources.extend(
                map.iter()
                    .filter_map(|(k, v)| Some((scalar_to_string(k)?, scalar_to_string(v)?))),
            ),
            _ => {}
        }
        if let (Some(equation), Some(result)) = (definition.get_str("Equation"), definition.get_str("Result")) {
            sources.push((result, equation));
        }

        let mut equations = Vec::with_capacity(sources.len());
        let mut failures: Vec<MinerError> = Vec::new();
        for (target, source) in sources {
            match Equation::parse(&source) {
                Ok(equation) => equations.push((target, equation)),
                Err(e) => failures.push(e),
            }
        }
        if failures.len() == 1 {
            if let Some(failure) = failures.pop() {
                return Err(failure);
            }
        } else if !failures.is_empty() {
            let problems: Vec<String> = failures.iter().map(ToString::to_string).collect();
            return Err(error::config_invalid(problems.join("; ")));
        }

        Ok(Self {
            initializers,
            equations,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty() && self.equations.is_empty()
    }

    pub fn equations(&self) -> impl Iterator<Item = (&str, &Equation)> {
        self.equations.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Seeds absent initializers, then evaluates each equation in order
    pub fn apply_to(&self, resource: &mut Resource, globals: &Globals) -> Result<()> {
        for (key, value) in self.results_for(resource, globals)? {
            resource.set(key, value);
        }
        Ok(())
    }

    /// Keyword values [`apply_to`](Self::apply_to) would write, in order,
    /// without touching the resource
    pub fn results_for(&self, resource: &Resource, globals: &Globals) -> Result<Vec<(String, String)>> {
        let mut scratch = resource.attributes().clone();
        let mut results = Vec::new();
        for (key, value) in &self.initializers {
            if !scratch.contains(key) {
                scratch.set(key.clone(), value.clone());
                results.push((key.clone(), value.clone()));
            }
        }
        for (target, equation) in &self.equations {
            let value = format_number(equation.evaluate(&ResourceScope::new(&scratch, globals))?);
            if target != IDENTITY_KEY {
                scratch.set(target.clone(), value.clone());
            }
            results.push((target.clone(), value));
        }
        Ok(results)
    }
}

#[derive(Debug)]
pub struct CalculatorStrategy {
    info: StrategyInfo,
    calculation: Calculation,
}

impl CalculatorStrategy {
    pub fn new(definition: &Definition) -> Result<Self> {
        let info = StrategyInfo::new(definition, "Calculator");
        let calculation = Calculation::from_definition(definition)?;
        if calculation.equations.is_empty() {
            return Err(error::missing_key(&info.name, &info.kind, "Equations"));
        }
        Ok(Self { info, calculation })
    }
}

impl Strategy for CalculatorStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        // A failing equation on any resource leaves every resource unchanged
        let results = resources
            .active_iter()
            .map(|resource| self.calculation.results_for(resource, globals))
            .collect::<Result<Vec<_>>>()?;
        let count = results.len();
        for (resource, values) in resources.active_iter_mut().zip(results) {
            for (key, value) in values {
                resource.set(key, value);
            }
            decision!(self.info, resource = %resource.identity(), "calculated");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator(yaml: &str) -> Result<CalculatorStrategy> {
        CalculatorStrategy::new(&Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap())
    }

    #[test]
    fn test_later_equations_see_earlier_results() {
        let strategy = calculator(
            r#"
Type: Calculator
Equations:
  - y: x * 2
  - z: y + 1
"#,
        )
        .unwrap();
        let mut list: ResourceList = std::iter::once(Resource::new("a").with("x", "1.5")).collect();
        strategy.apply(&mut list, &Globals::new()).unwrap();
        let resource = list.by_id("a").unwrap();
        assert_eq!(resource.get("y"), Some("3"));
        assert_eq!(resource.get("z"), Some("4"));
    }

    #[test]
    fn test_initializers_only_seed_absent() {
        let strategy = calculator(
            r#"
Type: Calculator
Initializers:
  count: 0
Equations:
  - count: count + 1
"#,
        )
        .unwrap();
        let mut list: ResourceList = vec![Resource::new("a"), Resource::new("b").with("count", "10")]
            .into_iter()
            .collect();
        strategy.apply(&mut list, &Globals::new()).unwrap();
        assert_eq!(list.by_id("a").and_then(|r| r.get("count")), Some("1"));
        assert_eq!(list.by_id("b").and_then(|r| r.get("count")), Some("11"));
    }

    #[test]
    fn test_legacy_equation_result() {
        let strategy = calculator("Type: Calculator\nEquation: degs(x)\nResult: d\n").unwrap();
        let mut list: ResourceList = [("a", "12.5"), ("b", "-4")]
            .iter()
            .map(|(id, x)| Resource::new(*id).with("x", *x))
            .collect();
        strategy.apply(&mut list, &Globals::new()).unwrap();
        assert_eq!(list.by_id("a").and_then(|r| r.get("d")), Some("716.197"));
        assert_eq!(list.by_id("b").and_then(|r| r.get("d")), Some("-229.183"));
    }

    #[test]
    fn test_skips_discarded() {
        let strategy = calculator("Type: Calculator\nEquation: 1\nResult: one\n").unwrap();
        let mut list: ResourceList = vec![Resource::new("a"), Resource::new("b")].into_iter().collect();
        list.discard("b");
        assert_eq!(strategy.apply(&mut list, &Globals::new()).unwrap(), 1);
        assert!(!list.by_id("b").unwrap().contains("one"));
    }

    #[test]
    fn test_failing_resource_leaves_others_uncalculated() {
        let strategy = calculator("Type: Calculator\nEquation: x * 2\nResult: y\n").unwrap();
        let mut list: ResourceList = vec![Resource::new("a").with("x", "1"), Resource::new("b")]
            .into_iter()
            .collect();
        let err = strategy.apply(&mut list, &Globals::new()).unwrap_err();
        assert!(matches!(err, MinerError::UnresolvedVariable { .. }));
        assert!(!list.by_id("a").unwrap().contains("y"));
    }

    #[test]
    fn test_parse_errors_aggregate() {
        let err = calculator(
            r#"
Type: Calculator
Equations:
  - a: 1 +
  - b: (2
"#,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1 +"));
        assert!(message.contains("(2"));
    }

    #[test]
    fn test_equations_required() {
        assert!(calculator("Type: Calculator\n").is_err());
    }
}
