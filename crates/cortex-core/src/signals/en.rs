//! English regex pattern library.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Category;

use super::pattern::SignalPattern;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static signal pattern is valid regex")
}

pub static PATTERNS: Lazy<Vec<SignalPattern>> = Lazy::new(|| {
    vec![
        SignalPattern {
            name: "en_name",
            regex: re(r"(?i)\bmy name is ([A-Z][\w'-]*(?: [A-Z][\w'-]*){0,2})"),
            category: Category::Identity,
            importance: 0.85,
            confidence: 0.9,
            template: "User's name is {}",
        },
        SignalPattern {
            name: "en_im",
            regex: re(r"(?i)\bI'?m ([A-Z][\w'-]*(?: [A-Z][\w'-]*){0,2})\b(?:,|\.| and)"),
            category: Category::Identity,
            importance: 0.7,
            confidence: 0.7,
            template: "User's name is {}",
        },
        SignalPattern {
            name: "en_works_at",
            regex: re(r"(?i)\bI work (?:at|for) ([A-Z][\w&.'-]*(?: [A-Z][\w&.'-]*){0,3})"),
            category: Category::Entity,
            importance: 0.75,
            confidence: 0.85,
            template: "User works at {}",
        },
        SignalPattern {
            name: "en_lives_in",
            regex: re(r"(?i)\bI live in ([A-Z][\w -]*)"),
            category: Category::Fact,
            importance: 0.7,
            confidence: 0.85,
            template: "User lives in {}",
        },
        SignalPattern {
            name: "en_profession",
            regex: re(r"(?i)\bI(?:'m| am) an? ([a-z][\w -]{2,40}?)(?:\.|,| at| in|$)"),
            category: Category::Fact,
            importance: 0.6,
            confidence: 0.6,
            template: "User is a(n) {}",
        },
        SignalPattern {
            name: "en_likes",
            regex: re(r"(?i)\bI (?:really )?(?:like|love|enjoy) ([\w\s,'-]{2,60}?)(?:\.|,|$)"),
            category: Category::Preference,
            importance: 0.6,
            confidence: 0.75,
            template: "User likes {}",
        },
        SignalPattern {
            name: "en_dislikes",
            regex: re(r"(?i)\bI (?:hate|dislike|can'?t stand) ([\w\s,'-]{2,60}?)(?:\.|,|$)"),
            category: Category::Preference,
            importance: 0.6,
            confidence: 0.75,
            template: "User dislikes {}",
        },
        SignalPattern {
            name: "en_constraint_never",
            regex: re(r"(?i)\bnever ([\w\s,'-]{3,80}?)(?:\.|,|$)"),
            category: Category::Constraint,
            importance: 0.95,
            confidence: 0.8,
            template: "Never {}",
        },
        SignalPattern {
            name: "en_constraint_always",
            regex: re(r"(?i)\balways ([\w\s,'-]{3,80}?)(?:\.|,|$)"),
            category: Category::Constraint,
            importance: 0.9,
            confidence: 0.75,
            template: "Always {}",
        },
        SignalPattern {
            name: "en_todo",
            regex: re(r"(?i)\b(?:remind me to|I need to|don'?t forget to) ([\w\s,'-]{3,80}?)(?:\.|,|$)"),
            category: Category::Todo,
            importance: 0.7,
            confidence: 0.7,
            template: "{}",
        },
        SignalPattern {
            name: "en_correction",
            regex: re(r"(?i)\bactually,? (?:my|it'?s) ([\w\s,'-]{2,80}?)(?:,|\.|$)"),
            category: Category::Correction,
            importance: 0.8,
            confidence: 0.7,
            template: "Correction: {}",
        },
    ]
});

pub const SMALL_TALK: &[&str] = &[
    "hi", "hello", "hey", "thanks", "thank you", "ok", "okay", "yes", "no", "cool",
    "nice", "got it", "sounds good", "bye", "goodbye", "sure",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::pattern::run_patterns;

    #[test]
    fn detects_name() {
        let hits = run_patterns("My name is Alex and I work at Acme Corp.", &PATTERNS);
        assert!(hits.iter().any(|h| h.content.contains("Alex")));
        assert!(hits.iter().any(|h| h.content.contains("Acme Corp")));
    }

    #[test]
    fn detects_constraint() {
        let hits = run_patterns(
            "Never run destructive shell commands without confirmation.",
            &PATTERNS,
        );
        assert!(hits
            .iter()
            .any(|h| h.category == Category::Constraint));
    }
}
