//! Priority injection and token-budgeted formatting (§4.5 steps 8-9).

use crate::model::{Category, Memory};

/// `ceil(chars / 4)`, the cheap rule-of-thumb ratio documented as an explicit
/// simplification (§4.5.1): conservative, not exact, and good enough for a budget
/// check that only needs to never blow past `max_tokens`.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}

/// Stable-sorts `scored` so `constraint` and `agent_persona` memories come first (in
/// score order within that group), guaranteeing they survive token truncation.
pub fn prioritize(mut scored: Vec<(Memory, f64)>) -> Vec<(Memory, f64)> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let is_priority = |c: Category| matches!(c, Category::Constraint | Category::AgentPersona);
    scored.sort_by_key(|(m, _)| !is_priority(m.category));
    scored
}

/// Greedily appends memory contents, separated by a structured delimiter, until the
/// next would exceed `max_tokens`. Returns the formatted context plus the ids
/// actually injected (for the caller's `access_count` increment).
pub fn format_context(prioritized: &[(Memory, f64)], max_tokens: usize) -> (String, Vec<String>) {
    let mut context = String::new();
    let mut injected = Vec::new();
    let mut used_tokens = 0usize;

    for (memory, _score) in prioritized {
        let block = format!("[{}] {}\n", memory.category.as_str(), memory.content);
        let block_tokens = estimate_tokens(&block);
        if used_tokens + block_tokens > max_tokens {
            break;
        }
        context.push_str(&block);
        used_tokens += block_tokens;
        injected.push(memory.id.clone());
    }
    (context, injected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{new_id, Layer};

    fn memory(category: Category, content: &str) -> Memory {
        let now = chrono::Utc::now();
        Memory {
            id: new_id(),
            agent_id: "agent-1".to_string(),
            layer: Layer::Core,
            category,
            content: content.to_string(),
            importance: 0.5,
            confidence: 0.7,
            decay_score: 1.0,
            access_count: 0,
            created_at: now,
            updated_at: now,
            expires_at: None,
            superseded_by: None,
            is_pinned: false,
            source: "test".to_string(),
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn constraint_is_placed_first_even_with_lower_score() {
        let low_priority = (memory(Category::Constraint, "never use profanity"), 0.1);
        let high_score = (memory(Category::Fact, "likes coffee"), 0.9);
        let prioritized = prioritize(vec![high_score, low_priority.clone()]);
        assert_eq!(prioritized[0].0.category, Category::Constraint);
    }

    #[test]
    fn format_context_stops_at_budget() {
        let big = (memory(Category::Fact, &"x".repeat(1000)), 0.9);
        let (context, injected) = format_context(&[big], 10);
        assert!(context.is_empty());
        assert!(injected.is_empty());
    }

    #[test]
    fn estimate_tokens_is_conservative_ratio() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
