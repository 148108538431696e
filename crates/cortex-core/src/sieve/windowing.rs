//! Multi-turn conversation windowing (§4.4 step 2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Proportional per-message character budget: each message gets a share of
/// `total_budget` proportional to its raw length, with a `floor`-char minimum so a
/// short turn in a window full of long ones isn't truncated to nothing.
///
/// Allocating floors first and splitting only the remainder among messages whose
/// proportional share already exceeds the floor keeps `sum(allocate_budget(..)) <=
/// total_budget` (modulo the largest message absorbing rounding remainder).
pub fn allocate_budget(lengths: &[usize], total_budget: usize, floor: usize) -> Vec<usize> {
    if lengths.is_empty() {
        return Vec::new();
    }
    let n = lengths.len();
    let floor_total = floor * n;
    if floor_total >= total_budget {
        return vec![floor; n];
    }
    let raw_total: usize = lengths.iter().sum::<usize>().max(1);
    let remainder = total_budget - floor_total;
    let mut out: Vec<usize> = lengths
        .iter()
        .map(|&len| floor + (remainder * len) / raw_total)
        .collect();

    // Integer division loses a few chars to rounding; hand them to the last message.
    let allocated: usize = out.iter().sum();
    if allocated < total_budget {
        if let Some(last) = out.last_mut() {
            *last += total_budget - allocated;
        }
    }
    out
}

/// Keeps the last `context_messages` turns, truncates each to its proportional
/// budget, and formats as alternating `[USER]`/`[ASSISTANT]` blocks.
pub fn window(
    messages: &[ConversationTurn],
    context_messages: usize,
    max_conversation_chars: usize,
    floor: usize,
) -> String {
    let start = messages.len().saturating_sub(context_messages);
    let window = &messages[start..];
    let lengths: Vec<usize> = window.iter().map(|t| t.content.chars().count()).collect();
    let budgets = allocate_budget(&lengths, max_conversation_chars, floor);

    let mut out = String::new();
    for (turn, budget) in window.iter().zip(budgets) {
        let label = match turn.role {
            Role::User => "[USER]",
            Role::Assistant => "[ASSISTANT]",
        };
        let truncated: String = turn.content.chars().take(budget).collect();
        out.push_str(label);
        out.push(' ');
        out.push_str(&truncated);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_respects_floor() {
        let lengths = [10, 1000];
        let budgets = allocate_budget(&lengths, 400, 200);
        assert!(budgets[0] >= 200);
        assert!(budgets[1] >= 200);
    }

    #[test]
    fn budget_is_proportional_above_floor() {
        let lengths = [1000, 3000];
        let budgets = allocate_budget(&lengths, 4000, 200);
        assert!(budgets[1] > budgets[0]);
    }

    #[test]
    fn budget_never_exceeds_total_when_floors_dominate() {
        let lengths = [5, 5, 5, 5, 5];
        let budgets = allocate_budget(&lengths, 100, 200);
        assert_eq!(budgets, vec![200; 5]);
    }

    #[test]
    fn window_keeps_only_last_n_turns() {
        let turns: Vec<ConversationTurn> = (0..10)
            .map(|i| ConversationTurn {
                role: Role::User,
                content: format!("turn {i}"),
            })
            .collect();
        let out = window(&turns, 4, 4000, 200);
        assert!(out.contains("turn 9"));
        assert!(!out.contains("turn 0"));
    }
}
