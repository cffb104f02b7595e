//! Layered global keyword scopes

use std::sync::Arc;

use crate::expression::Variables;
use crate::resource::Attributes;

/// Ordered global scopes, innermost first
///
/// Nested strategies push the owning resource's attributes as a new
/// innermost scope; lookups fall through to the outer scopes.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    scopes: Vec<Arc<Attributes>>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Attributes) -> Self {
        Self {
            scopes: vec![Arc::new(attributes)],
        }
    }

    /// A copy with `attributes` as the new innermost scope
    pub fn with_scope(&self, attributes: Attributes) -> Self {
        let mut scopes = Vec::with_capacity(self.scopes.len() + 1);
        scopes.push(Arc::new(attributes));
        scopes.extend(self.scopes.iter().cloned());
        Self { scopes }
    }

    /// First match from the innermost scope outwards
    ///
    /// An exact keyword match wins; otherwise the first case-insensitive one.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.scopes
            .iter()
            .find_map(|scope| scope.get(key))
            .or_else(|| {
                self.scopes.iter().find_map(|scope| {
                    scope
                        .keys()
                        .find(|k| k.eq_ignore_ascii_case(key))
                        .and_then(|k| scope.get(k))
                })
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

/// Variable lookup for one resource: its attributes, then the globals
pub struct ResourceScope<'a> {
    pub attributes: &'a Attributes,
    pub globals: &'a Globals,
}

impl<'a> ResourceScope<'a> {
    pub fn new(attributes: &'a Attributes, globals: &'a Globals) -> Self {
        Self {
            attributes,
            globals,
        }
    }
}

impl Variables for ResourceScope<'_> {
    fn value(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).or_else(|| self.globals.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_innermost_scope_wins() {
        let outer = Globals::from_attributes(attrs(&[("a", "outer"), ("b", "outer")]));
        let inner = outer.with_scope(attrs(&[("a", "inner")]));
        assert_eq!(inner.get("a"), Some("inner"));
        assert_eq!(inner.get("b"), Some("outer"));
        assert_eq!(outer.get("a"), Some("outer"));
        assert_eq!(inner.depth(), 2);
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let globals = Globals::from_attributes(attrs(&[("InputDir", "/data")]));
        assert_eq!(globals.get("inputdir"), Some("/data"));
        assert!(!globals.contains("outputdir"));
    }

    #[test]
    fn test_resource_scope_prefers_attributes() {
        let globals = Globals::from_attributes(attrs(&[("x", "1"), ("y", "2")]));
        let resource = attrs(&[("x", "10")]);
        let scope = ResourceScope::new(&resource, &globals);
        assert_eq!(scope.value("x"), Some("10"));
        assert_eq!(scope.value("y"), Some("2"));
        assert_eq!(scope.value("z"), None);
    }
}
