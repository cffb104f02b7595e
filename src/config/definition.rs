//! Strategy definition with case-insensitive keyword access

use serde_yaml::{Mapping, Value};

use super::Globals;
use crate::error::{self, Result};

/// One configured strategy (or any nested keyword group)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    map: Mapping,
}

/// Renders a YAML scalar as text; sequences and mappings yield `None`
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Scalar or list of scalars as a list of strings
pub fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

/// Parses the boolean spellings accepted in configuration files
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Replaces `%1..%N` in `template` with `args`, highest index first
pub fn expand_template(template: &str, args: &[String]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate().rev() {
        result = result.replace(&format!("%{}", i + 1), arg);
    }
    result
}

impl Definition {
    pub fn new(map: Mapping) -> Self {
        Self { map }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Mapping(map) => Ok(Self::new(map.clone())),
            _ => Err(error::config_invalid(
                "strategy definitions must be mappings of keyword to value",
            )),
        }
    }

    /// Finds a keyword ignoring case
    pub fn find(&self, key: &str) -> Option<&Value> {
        self.map.iter().find_map(|(k, v)| match k {
            Value::String(name) if name.eq_ignore_ascii_case(key) => Some(v),
            _ => None,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Strategy name; falls back to the type
    pub fn name(&self) -> String {
        self.get_str("Name")
            .or_else(|| self.get_str("Type"))
            .unwrap_or_else(|| "Unnamed".to_string())
    }

    pub fn kind(&self) -> Option<String> {
        self.get_str("Type").filter(|t| !t.trim().is_empty())
    }

    pub fn description(&self) -> Option<String> {
        self.get_str("Description")
    }

    pub fn is_debug(&self) -> bool {
        self.get_str("Debug")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false)
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.find(key).and_then(scalar_to_string)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or_else(|| default.to_string())
    }

    /// Required keyword
    pub fn require(&self, key: &str) -> Result<String> {
        self.get_str(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| error::missing_key(self.name(), self.kind_or_unknown(), key))
    }

    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.find(key).map(value_to_list).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get_str(key) {
            None => Ok(default),
            Some(text) => parse_bool(&text).ok_or_else(|| self.invalid(key, &text)),
        }
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.get_str(key) {
            None => Ok(default),
            Some(text) => text.trim().parse().map_err(|_| self.invalid(key, &text)),
        }
    }

    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize> {
        match self.get_str(key) {
            None => Ok(default),
            Some(text) => text.trim().parse().map_err(|_| self.invalid(key, &text)),
        }
    }

    pub fn mapping(&self, key: &str) -> Option<&Mapping> {
        match self.find(key) {
            Some(Value::Mapping(map)) => Some(map),
            _ => None,
        }
    }

    pub fn sequence(&self, key: &str) -> Option<&[Value]> {
        match self.find(key) {
            Some(Value::Sequence(items)) => Some(items),
            _ => None,
        }
    }

    pub fn child(&self, key: &str) -> Option<Definition> {
        self.mapping(key).cloned().map(Definition::new)
    }

    /// Keyword/value pairs in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (String, &Value)> {
        self.map
            .iter()
            .filter_map(|(k, v)| scalar_to_string(k).map(|k| (k, v)))
    }

    /// Value of `key` with `%N` placeholders bound from the globals
    ///
    /// Arguments come from `<key>Args` (list of global names) or
    /// `<key>Keyword` (single name). Unresolved names expand to nothing.
    pub fn translate(&self, key: &str, globals: &Globals) -> Option<String> {
        let template = self.get_str(key)?;
        let args = self.argument_names(key);
        if args.is_empty() {
            return Some(template);
        }
        let values: Vec<String> = args
            .iter()
            .map(|name| globals.get(name).unwrap_or_default().to_string())
            .collect();
        Some(expand_template(&template, &values))
    }

    /// Names listed by `<key>Args` or `<key>Keyword`
    pub fn argument_names(&self, key: &str) -> Vec<String> {
        let args = self.get_list(&format!("{key}Args"));
        if args.is_empty() {
            self.get_list(&format!("{key}Keyword"))
        } else {
            args
        }
    }

    /// Invalid value error for this strategy
    pub fn invalid(&self, key: &str, value: &str) -> crate::error::MinerError {
        error::invalid_option(self.name(), self.kind_or_unknown(), key, value)
    }

    fn kind_or_unknown(&self) -> String {
        self.kind().unwrap_or_else(|| "Strategy".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Attributes;

    fn definition(yaml: &str) -> Definition {
        Definition::from_value(&serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_keys_ignore_case() {
        let def = definition("Type: Filter\nKEYWORD: Target\n");
        assert_eq!(def.get_str("keyword"), Some("Target".to_string()));
        assert_eq!(def.kind(), Some("Filter".to_string()));
        assert_eq!(def.name(), "Filter");
    }

    #[test]
    fn test_scalars_and_lists() {
        let def = definition("Include: [a, 2, true]\nExclude: b\nCount: 3\n");
        assert_eq!(def.get_list("Include"), vec!["a", "2", "true"]);
        assert_eq!(def.get_list("Exclude"), vec!["b"]);
        assert_eq!(def.get_usize("Count", 0).unwrap(), 3);
        assert!(def.get_list("Missing").is_empty());
    }

    #[test]
    fn test_bool_spellings() {
        let def = definition("A: yes\nB: 'False'\nC: maybe\n");
        assert!(def.get_bool("A", false).unwrap());
        assert!(!def.get_bool("B", true).unwrap());
        assert!(def.get_bool("C", true).is_err());
        assert!(def.get_bool("D", true).unwrap());
    }

    #[test]
    fn test_require_reports_key() {
        let def = definition("Type: Filter\nName: Keep\n");
        let err = def.require("Keyword").unwrap_err();
        assert!(err.to_string().contains("Keyword"));
        assert!(err.to_string().contains("Keep"));
    }

    #[test]
    fn test_translate_args() {
        let def = definition("CsvFile: '%1/%2.csv'\nCsvFileArgs: [inputdir, missing]\n");
        let globals = Globals::from_attributes([("inputdir", "/data")].into_iter().collect::<Attributes>());
        assert_eq!(def.translate("CsvFile", &globals), Some("/data/.csv".to_string()));
    }

    #[test]
    fn test_translate_keyword_form() {
        let def = definition("Identity: 'img_%1'\nIdentityKeyword: Serial\n");
        let globals = Globals::from_attributes([("Serial", "42")].into_iter().collect::<Attributes>());
        assert_eq!(def.translate("Identity", &globals), Some("img_42".to_string()));
    }

    #[test]
    fn test_expand_template_double_digit() {
        let args: Vec<String> = (1..=10).map(|i| format!("v{i}")).collect();
        assert_eq!(expand_template("%10-%1", &args), "v10-v1");
    }
}
