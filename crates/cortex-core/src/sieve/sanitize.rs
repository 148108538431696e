//! Strips previously-injected context so Gate's own output never round-trips back
//! in as a fresh extraction (§4.4 step 1).

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<cortex_memory>.*?</cortex_memory>").expect("valid regex")
});

static ROLE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(system|assistant|user|tool)\s*:\s*").expect("valid regex")
});

static CHATML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<\|im_start\|>.*?<\|im_end\|>|<\|im_start\|>|<\|im_end\|>").expect("valid regex")
});

/// Removes `<cortex_memory>` blocks, leftover chat-ML framing tokens, and leading
/// role markers. Does not touch ordinary prose that happens to contain a colon.
pub fn sanitize(text: &str) -> String {
    let stripped = TAG_BLOCK.replace_all(text, "");
    let stripped = CHATML.replace_all(&stripped, "");
    let stripped = ROLE_MARKER.replace_all(&stripped, "");
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_memory_tag() {
        let input = "hello <cortex_memory>user likes rust</cortex_memory> world";
        assert_eq!(sanitize(input), "hello  world");
    }

    #[test]
    fn strips_chatml_framing() {
        let input = "<|im_start|>system\nyou are a bot<|im_end|>actual message";
        assert_eq!(sanitize(input), "actual message");
    }

    #[test]
    fn leaves_plain_prose_untouched() {
        assert_eq!(sanitize("I work at Acme Corp"), "I work at Acme Corp");
    }
}
