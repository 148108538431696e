//! Shared pattern/signal types used by the per-language modules.

use regex::Regex;

use crate::model::Category;

/// One compiled regex plus the category/importance/confidence it implies when it
/// matches. `template` is filled in with the first capture group to produce the
/// detected memory's content (e.g. `"My name is {}"` + capture `"Alex"`).
pub struct SignalPattern {
    pub name: &'static str,
    pub regex: Regex,
    pub category: Category,
    pub importance: f64,
    pub confidence: f64,
    pub template: &'static str,
}

#[derive(Debug, Clone)]
pub struct DetectedSignal {
    pub category: Category,
    pub content: String,
    pub importance: f64,
    pub confidence: f64,
    pub pattern: &'static str,
}

pub fn run_patterns(text: &str, patterns: &[SignalPattern]) -> Vec<DetectedSignal> {
    let mut out = Vec::new();
    for pattern in patterns {
        if let Some(caps) = pattern.regex.captures(text) {
            let captured = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .unwrap_or("")
                .to_string();
            if captured.is_empty() {
                continue;
            }
            let content = if pattern.template.contains("{}") {
                pattern.template.replacen("{}", &captured, 1)
            } else {
                captured
            };
            out.push(DetectedSignal {
                category: pattern.category,
                content,
                importance: pattern.importance,
                confidence: pattern.confidence,
                pattern: pattern.name,
            });
        }
    }
    out
}
