//! Glob patterns for region/zone selection
//!
//! Shell-style matching over a whole partition name: `*` matches any run of
//! characters, `?` a single character, `[abc]`, `[a-z]` and `[^a-z]` match
//! character classes and `\` escapes the next character. No wildcard crosses
//! a `/`. Matching is case-sensitive.

use regex::Regex;

/// A compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a pattern, returning `None` when it is malformed
    pub fn new(pattern: &str) -> Option<Self> {
        let translated = translate(pattern)?;
        let regex = Regex::new(&translated).ok()?;
        Some(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Check whether the whole input matches
    pub fn matches(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// The original pattern text
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Translate a glob into an anchored regular expression
fn translate(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '\\' => {
                let escaped = chars.next()?;
                out.push_str(&regex::escape(&escaped.to_string()));
            }
            '[' => {
                let negated = chars.next_if_eq(&'^').is_some();
                let mut class = String::new();
                let mut closed = false;
                let mut empty = true;

                while let Some(c) = chars.next() {
                    let literal = match c {
                        ']' if !empty => {
                            closed = true;
                            break;
                        }
                        '\\' => chars.next()?,
                        other => other,
                    };
                    empty = false;
                    class.push_str(&regex::escape(&literal.to_string()));

                    // Range: `a-z`
                    if chars.peek() == Some(&'-') {
                        chars.next();
                        let end = match chars.next()? {
                            '\\' => chars.next()?,
                            ']' => return None,
                            other => other,
                        };
                        if end < literal {
                            return None;
                        }
                        class.push('-');
                        class.push_str(&regex::escape(&end.to_string()));
                    }
                }

                if !closed {
                    return None;
                }
                if negated {
                    out.push_str("[^/");
                } else {
                    out.push('[');
                }
                out.push_str(&class);
                out.push(']');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out.push('$');
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("fr-par", "fr-par", true ; "literal")]
    #[test_case("fr-par", "fr-par-1", false ; "literal is anchored")]
    #[test_case("fr-*", "fr-par", true ; "star suffix")]
    #[test_case("*", "nl-ams-3", true ; "star alone")]
    #[test_case("*-1", "pl-waw-1", true ; "star prefix")]
    #[test_case("*-1", "pl-waw-2", false ; "star prefix mismatch")]
    #[test_case("fr-par-?", "fr-par-2", true ; "question mark")]
    #[test_case("fr-par-?", "fr-par", false ; "question mark needs a char")]
    #[test_case("fr-par-[12]", "fr-par-2", true ; "class")]
    #[test_case("fr-par-[12]", "fr-par-3", false ; "class mismatch")]
    #[test_case("fr-par-[1-2]", "fr-par-1", true ; "range")]
    #[test_case("fr-par-[^1]", "fr-par-1", false ; "negated class")]
    #[test_case("fr-par-[^1]", "fr-par-3", true ; "negated class match")]
    #[test_case("FR-*", "fr-par", false ; "case sensitive")]
    #[test_case("fr.par", "fr-par", false ; "dot is literal")]
    #[test_case("fr\\-par", "fr-par", true ; "escape")]
    #[test_case("*", "a/b", false ; "star does not cross slash")]
    fn test_glob_matches(pattern: &str, input: &str, expected: bool) {
        let glob = GlobPattern::new(pattern).unwrap();
        assert_eq!(glob.matches(input), expected);
    }

    #[test_case("fr-[" ; "unclosed class")]
    #[test_case("fr-par\\" ; "trailing escape")]
    #[test_case("[]" ; "empty class")]
    #[test_case("[z-a]" ; "reversed range")]
    fn test_malformed_patterns(pattern: &str) {
        assert!(GlobPattern::new(pattern).is_none());
    }

    #[test]
    fn test_as_str() {
        let glob = GlobPattern::new("nl-*").unwrap();
        assert_eq!(glob.as_str(), "nl-*");
    }
}
