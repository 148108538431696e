//! Simplified/Traditional Chinese regex pattern library.

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
            name: "zh_name",
            regex: re(r"我叫([一-鿿\w]{1,10})"),
            category: Category::Identity,
            importance: 0.85,
            confidence: 0.9,
            template: "用户名字是{}",
        },
        SignalPattern {
            name: "zh_name_is",
            regex: re(r"我的名字是([一-鿿\w]{1,10})"),
            category: Category::Identity,
            importance: 0.85,
            confidence: 0.9,
            template: "用户名字是{}",
        },
        SignalPattern {
            name: "zh_works_at",
            regex: re(r"我在([一-鿿\w]{1,20})工作"),
            category: Category::Entity,
            importance: 0.75,
            confidence: 0.8,
            template: "用户在{}工作",
        },
        SignalPattern {
            name: "zh_lives_in",
            regex: re(r"我住在([一-鿿\w]{1,20})"),
            category: Category::Fact,
            importance: 0.7,
            confidence: 0.8,
            template: "用户住在{}",
        },
        SignalPattern {
            name: "zh_likes",
            regex: re(r"我(?:喜欢|爱)([一-鿿\w]{1,30})"),
            category: Category::Preference,
            importance: 0.6,
            confidence: 0.7,
            template: "用户喜欢{}",
        },
        SignalPattern {
            name: "zh_never",
            regex: re(r"(?:永远不要|绝对不要)([一-鿿\w，,]{1,40})"),
            category: Category::Constraint,
            importance: 0.9,
            confidence: 0.75,
            template: "不要{}",
        },
    ]
});

pub const SMALL_TALK: &[&str] = &[
    "你好", "谢谢", "好的", "是的", "不", "再见", "没问题", "嗯", "哈喽",
];
