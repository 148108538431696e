//! FTS5 query sanitization. SQLite's FTS5 query syntax treats `" * ( ) : ^ -` as
//! operators; user queries must be escaped to plain-term matching so stray
//! punctuation in a recalled query never throws a syntax error or (worse) builds an
//! unintended boolean expression.

/// Turns free text into a safe FTS5 MATCH expression: each whitespace-delimited term
/// is double-quoted (escaping embedded quotes) and the terms are joined with an
/// implicit AND via FTS5's default `OR`-free token adjacency, matching how the
/// teacher's sanitize helper is invoked from `keywordSearch`.
pub fn sanitize_fts5_query(raw: &str) -> String {
    raw.split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_each_term() {
        assert_eq!(sanitize_fts5_query("Alex Acme"), "\"Alex\" \"Acme\"");
    }

    #[test]
    fn escapes_embedded_quotes() {
        assert_eq!(sanitize_fts5_query(r#"say "hi""#), "\"say\" \"\"\"hi\"\"\"");
    }

    #[test]
    fn strips_operator_characters_harmlessly() {
        // FTS5 operators like * ( ) : are neutralized once wrapped in quotes.
        let sanitized = sanitize_fts5_query("rust* OR (go)");
        assert!(sanitized.starts_with('"'));
    }
}
