//! Path templates for provider endpoints
//!
//! Endpoints are written as `/instance/v1/zones/{zone}/servers/{id}`. Each
//! `{name}` is replaced by the value of the same name from the matrix item or
//! the request (`zone`, `region`, `parent`, `id`).

use crate::error::{Error, Result};
use crate::types::StringMap;

/// Render a path template
///
/// Every placeholder must have a value, and values must be a single path
/// segment (no `/`, `?`, `#` or whitespace). All undefined placeholders are
/// reported together.
pub fn render(template: &str, vars: &StringMap) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut missing = Vec::new();

    for token in tokenize(template) {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Placeholder(name) => match vars.get(name) {
                Some(value) => {
                    check_segment(name, value)?;
                    out.push_str(value);
                }
                None => missing.push(name.to_string()),
            },
        }
    }

    if missing.is_empty() {
        Ok(out)
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Names of the placeholders in a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    tokenize(template)
        .into_iter()
        .filter_map(|token| match token {
            Token::Placeholder(name) => Some(name),
            Token::Literal(_) => None,
        })
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split a template into literals and `{name}` placeholders
///
/// A `{` without a closing `}` is kept as literal text.
fn tokenize(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open + 1..].find('}') else {
            break;
        };
        if open > 0 {
            tokens.push(Token::Literal(&rest[..open]));
        }
        tokens.push(Token::Placeholder(rest[open + 1..open + 1 + len].trim()));
        rest = &rest[open + len + 2..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Literal(rest));
    }
    tokens
}

fn check_segment(name: &str, value: &str) -> Result<()> {
    let bad = value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace());
    if bad {
        return Err(Error::invalid_value(
            name,
            format!("'{value}' is not a valid path segment"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn vars(pairs: &[(&str, &str)]) -> StringMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_render_zone_path() {
        let path = render(
            "/instance/v1/zones/{zone}/servers",
            &vars(&[("zone", "fr-par-1")]),
        )
        .unwrap();
        assert_eq!(path, "/instance/v1/zones/fr-par-1/servers");
    }

    #[test]
    fn test_render_multiple_placeholders() {
        let path = render(
            "/k8s/v1/regions/{region}/clusters/{parent}/pools",
            &vars(&[("region", "nl-ams"), ("parent", "c-123")]),
        )
        .unwrap();
        assert_eq!(path, "/k8s/v1/regions/nl-ams/clusters/c-123/pools");
    }

    #[test]
    fn test_render_without_placeholders() {
        assert_eq!(
            render("/iam/v1alpha1/users", &StringMap::new()).unwrap(),
            "/iam/v1alpha1/users"
        );
    }

    #[test]
    fn test_render_reports_all_missing() {
        let err = render("/{region}/x/{id}", &StringMap::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Undefined variable in path template: region, id"
        );
    }

    #[test_case("a/b" ; "slash")]
    #[test_case("a?b" ; "query")]
    #[test_case("a b" ; "space")]
    #[test_case("" ; "empty")]
    fn test_render_rejects_bad_segments(value: &str) {
        let err = render("/servers/{id}", &vars(&[("id", value)])).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("/rdb/v1/regions/{region}/instances/{ parent }/databases"),
            vec!["region", "parent"]
        );
        assert!(placeholders("/unclosed/{zone").is_empty());
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        assert_eq!(render("/a/{b", &StringMap::new()).unwrap(), "/a/{b");
    }
}
