//! Post-fusion scoring: layer weight, recency boost, access boost, and the
//! multi-hit boost applied when merging across query variants (§4.5 steps 5-6).

use chrono::{DateTime, Utc};

use crate::model::Layer;

/// Decays to 1.0 over `window_days` from now; memories updated within the window get
/// up to ~1.3x boost, linearly falling off to no boost at the window edge.
pub fn recency_boost(updated_at: DateTime<Utc>, window_days: i64, now: DateTime<Utc>) -> f64 {
    if window_days <= 0 {
        return 1.0;
    }
    let age_days = (now - updated_at).num_seconds() as f64 / 86_400.0;
    if age_days <= 0.0 {
        return 1.3;
    }
    let window = window_days as f64;
    if age_days >= window {
        return 1.0;
    }
    1.0 + 0.3 * (1.0 - age_days / window)
}

/// Gentle log factor of access count so heavily-recalled memories rank slightly
/// higher without dominating the fused score.
pub fn access_boost(access_count: u64) -> f64 {
    1.0 + 0.05 * ((access_count as f64) + 1.0).ln()
}

/// `1 + 0.08 * ln(h)` for h >= 2, diminishing returns on appearing in multiple query
/// variants' result lists; a single-hit candidate gets no boost (h=1 -> ln(1)=0 would
/// already be a no-op, but we special-case h<2 to avoid calling ln on 0/negative h).
pub fn multi_hit_boost(h: usize) -> f64 {
    if h < 2 {
        return 1.0;
    }
    1.0 + 0.08 * (h as f64).ln()
}

pub fn reciprocal_rank_fusion(lists: &[Vec<String>], k: f64) -> std::collections::HashMap<String, f64> {
    let weighted: Vec<(&[String], f64)> = lists.iter().map(|list| (list.as_slice(), 1.0)).collect();
    weighted_reciprocal_rank_fusion(&weighted, k)
}

/// RRF with a per-list weight (§6 `search.vectorWeight`/`search.textWeight`):
/// `Σ weight(L) / (k + rank(m, L))` over the lists m appears in.
pub fn weighted_reciprocal_rank_fusion(lists: &[(&[String], f64)], k: f64) -> std::collections::HashMap<String, f64> {
    let mut scores = std::collections::HashMap::new();
    for (list, weight) in lists {
        for (rank, id) in list.iter().enumerate() {
            *scores.entry(id.clone()).or_insert(0.0) += weight / (k + rank as f64);
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn layer_weight_orders_core_above_archive() {
        assert!(Layer::Core.score_weight() > Layer::Working.score_weight());
        assert!(Layer::Working.score_weight() > Layer::Archive.score_weight());
    }

    #[test]
    fn recency_boost_decays_to_one() {
        let now = Utc::now();
        let fresh = recency_boost(now, 14, now);
        let old = recency_boost(now - Duration::days(30), 14, now);
        assert!(fresh > old);
        assert_eq!(old, 1.0);
    }

    #[test]
    fn multi_hit_boost_is_one_for_single_hit() {
        assert_eq!(multi_hit_boost(1), 1.0);
        assert_eq!(multi_hit_boost(0), 1.0);
    }

    #[test]
    fn multi_hit_boost_increases_with_hits() {
        let two = multi_hit_boost(2);
        let four = multi_hit_boost(4);
        assert!(two > 1.0);
        assert!(four > two);
    }

    #[test]
    fn rrf_rewards_items_in_multiple_lists() {
        let lists = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["b".to_string(), "a".to_string(), "d".to_string()],
        ];
        let scores = reciprocal_rank_fusion(&lists, 60.0);
        assert!(scores["a"] > scores["c"]);
        assert!(scores["b"] > scores["d"]);
    }
}
