//! Japanese regex pattern library.

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
            name: "ja_name",
            regex: re(r"私(?:の名前)?は([\p{Han}\p{Hiragana}\p{Katakana}\w]{1,12})です"),
            category: Category::Identity,
            importance: 0.85,
            confidence: 0.85,
            template: "ユーザーの名前は{}",
        },
        SignalPattern {
            name: "ja_works_at",
            regex: re(r"([\p{Han}\p{Hiragana}\p{Katakana}\w]{1,20})で働いています"),
            category: Category::Entity,
            importance: 0.75,
            confidence: 0.8,
            template: "ユーザーは{}で働いている",
        },
        SignalPattern {
            name: "ja_lives_in",
            regex: re(r"([\p{Han}\p{Hiragana}\p{Katakana}\w]{1,20})に住んでいます"),
            category: Category::Fact,
            importance: 0.7,
            confidence: 0.8,
            template: "ユーザーは{}に住んでいる",
        },
        SignalPattern {
            name: "ja_likes",
            regex: re(r"([\p{Han}\p{Hiragana}\p{Katakana}\w]{1,30})が好きです"),
            category: Category::Preference,
            importance: 0.6,
            confidence: 0.7,
            template: "ユーザーは{}が好き",
        },
        SignalPattern {
            name: "ja_never",
            regex: re(r"絶対に([\p{Han}\p{Hiragana}\p{Katakana}\w]{1,40})(?:しない|禁止)"),
            category: Category::Constraint,
            importance: 0.9,
            confidence: 0.75,
            template: "{}しない",
        },
    ]
});

pub const SMALL_TALK: &[&str] = &[
    "こんにちは",
    "ありがとう",
    "はい",
    "いいえ",
    "さようなら",
    "了解",
    "わかった",
];
