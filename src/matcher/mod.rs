mod signatures;

pub use signatures::{
    DEBUG_PATHS, ERROR_FINGERPRINTS, SENSITIVE_BODY_TERMS, SENSITIVE_HEADERS, SENSITIVE_TERMS,
    SQL_ERROR_FINGERPRINTS, SUSPICIOUS_SQL_TOKENS,
};

use regex::{Regex, RegexBuilder};

/// An ordered set of substring fingerprints. Matching is case-insensitive and
/// first-match-wins in construction order, so the reported pattern for a given
/// input is always the same one.
pub struct SignatureSet {
    patterns: Vec<(String, Regex)>,
}

impl SignatureSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let regex = RegexBuilder::new(&regex::escape(pattern.as_ref()))
                    .case_insensitive(true)
                    .build()
                    .unwrap();
                (pattern.as_ref().to_string(), regex)
            })
            .collect();

        Self { patterns }
    }

    pub fn first_match(&self, haystack: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(haystack))
            .map(|(pattern, _)| pattern.as_str())
    }

    pub fn matches(&self, haystack: &str) -> bool {
        self.first_match(haystack).is_some()
    }
}

/// First pattern (in slice order) contained in the haystack, case-folded.
pub fn contains_any<'a>(haystack: &str, patterns: &'a [&str]) -> Option<&'a str> {
    let folded = haystack.to_lowercase();
    patterns
        .iter()
        .copied()
        .find(|pattern| folded.contains(&pattern.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_follows_list_order() {
        let set = SignatureSet::new(["sql syntax", "mysql", "sqlstate"]);
        // Both "mysql" and "sqlstate" are present; list order decides.
        let text = "SQLSTATE[42000]: mysql server error";
        assert_eq!(set.first_match(text), Some("mysql"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let set = SignatureSet::new(["stack trace"]);
        assert!(set.matches("Stack Trace: at Object.<anonymous>"));
        assert!(!set.matches("stacktrace"));
    }

    #[test]
    fn test_literal_patterns_are_not_regexes() {
        let set = SignatureSet::new(["' OR '1'='1"]);
        assert!(set.matches("echo: ' or '1'='1 --"));
    }

    #[test]
    fn test_contains_any_first_wins() {
        let patterns = &["password", "secret", "token"];
        assert_eq!(contains_any("the TOKEN and the secret", patterns), Some("secret"));
        assert_eq!(contains_any("nothing here", patterns), None);
    }

    #[test]
    fn test_same_input_same_match() {
        let set = SignatureSet::new(ERROR_FINGERPRINTS.iter().copied());
        let text = "syntax error near unexpected token";
        assert_eq!(set.first_match(text), set.first_match(text));
        assert_eq!(set.first_match(text), Some("syntax error"));
    }
}
