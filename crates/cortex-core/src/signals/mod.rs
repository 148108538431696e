//! Language-aware regex library (§4.2): maps an exchange to zero or more
//! [`DetectedSignal`]s without any LLM or embedding call. Runs in microseconds and is
//! invoked on every ingest's fast channel.

mod en;
mod ja;
mod pattern;
mod zh;

pub use pattern::DetectedSignal;

/// Tries every supported language's pattern table against `text`. Cheap enough at
/// this scale that language auto-detection isn't needed first - a language's
/// regexes simply don't match text written in a different script.
pub fn detect(text: &str) -> Vec<DetectedSignal> {
    let mut out = pattern::run_patterns(text, &en::PATTERNS);
    out.extend(pattern::run_patterns(text, &zh::PATTERNS));
    out.extend(pattern::run_patterns(text, &ja::PATTERNS));
    out
}

/// True if `text` is pure greeting/filler: short, and either empty of alphabetic
/// content beyond a known small-talk phrase, or an exact/near match to one.
pub fn is_small_talk(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    let normalized = lowered.trim_end_matches(['.', '!', '?']).trim();

    let all_lists = [en::SMALL_TALK, zh::SMALL_TALK, ja::SMALL_TALK];
    for list in all_lists {
        if list.contains(&normalized) {
            return true;
        }
    }

    let word_count = trimmed.split_whitespace().count();
    if word_count <= 2 {
        let has_substantive_alpha = trimmed
            .chars()
            .filter(|c| c.is_alphabetic())
            .count()
            > 12;
        if !has_substantive_alpha {
            return all_lists
                .iter()
                .any(|list| list.iter().any(|phrase| normalized.contains(phrase)));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_small_talk() {
        assert!(is_small_talk("hi"));
        assert!(is_small_talk("Thanks!"));
        assert!(is_small_talk("你好"));
    }

    #[test]
    fn substantive_message_is_not_small_talk() {
        assert!(!is_small_talk(
            "My name is Alex and I work at Acme Corp."
        ));
    }

    #[test]
    fn empty_text_is_small_talk() {
        assert!(is_small_talk(""));
        assert!(is_small_talk("   "));
    }

    #[test]
    fn detect_combines_all_languages() {
        let hits = detect("My name is Alex. 我叫小明。");
        assert!(hits.len() >= 2);
    }
}
