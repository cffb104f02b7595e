//! Command-line parameter strings of the form `@key:value@key:value`

use crate::error::{self, Result};
use crate::resource::Attributes;

/// Parses a parameters string into attributes
///
/// Keys are kept as written; a value may itself contain `:`.
pub fn parse_parameters(input: &str) -> Result<Attributes> {
    let mut parameters = Attributes::new();
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(parameters);
    }

    let Some(body) = trimmed.strip_prefix('@') else {
        return Err(error::invalid_parameters(input, "must start with '@'"));
    };

    for pair in body.split('@') {
        let Some((key, value)) = pair.split_once(':') else {
            return Err(error::invalid_parameters(
                input,
                format!("'{pair}' is not a key:value pair"),
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(error::invalid_parameters(
                input,
                format!("'{pair}' has an empty key"),
            ));
        }
        parameters.set(key, value);
    }

    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let params = parse_parameters("@inputdir:/data/in@limit:10").unwrap();
        assert_eq!(params.get("inputdir"), Some("/data/in"));
        assert_eq!(params.get("limit"), Some("10"));
    }

    #[test]
    fn test_value_with_colon() {
        let params = parse_parameters("@url:http://host:8080").unwrap();
        assert_eq!(params.get("url"), Some("http://host:8080"));
    }

    #[test]
    fn test_empty_is_ok() {
        assert!(parse_parameters("  ").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_inputs() {
        for bad in ["inputdir:/data", "@inputdir", "@:value", "@a:1@@b:2"] {
            let err = parse_parameters(bad).unwrap_err();
            assert!(err.to_string().contains(bad), "{bad} -> {err}");
        }
    }
}
