//! キーワード部分一致による解析（パターンエンジンが使えない場合の代替）
//!
//! 各キーワードは出現有無のみ数える。重要キーワードは 1.5 倍。
//! 日付形式（MM/DD/YYYY, Month Day, HH:MM）は種類ごとに緊急度へ +1.5。

use regex::Regex;

pub const HIGH_WEIGHT: f64 = 1.5;
pub const REGULAR_WEIGHT: f64 = 1.0;
pub const DATE_PATTERN_WEIGHT: f64 = 1.5;

const URGENCY_KEYWORDS: &[&str] = &[
    "today", "tomorrow", "tonight", "asap", "urgent", "immediately", "emergency", "critical",
    "this week", "this month", "this morning", "this afternoon", "this evening", "deadline",
    "due", "by", "before", "soon", "quickly", "fast", "rapid", "prompt", "waiting", "pending",
    "limited", "closing", "important", "priority", "crucial", "significant",
    "running out of time", "last chance", "last opportunity", "last day", "last call", "hurry",
];

const HIGH_URGENCY_KEYWORDS: &[&str] = &[
    "today", "asap", "urgent", "immediately", "emergency", "critical",
];

const ACTION_KEYWORDS: &[&str] = &[
    "apply", "submit", "call", "email", "send", "register", "sign", "complete", "finish", "do",
    "make", "prepare", "check", "verify", "confirm", "review", "pay", "schedule", "book",
    "order", "buy", "download", "install", "update", "contact", "follow", "attend", "join",
    "meet", "create", "add", "track", "report", "file", "fill", "upload", "backup", "login",
    "access", "don't forget", "reminder", "remind me", "need to", "have to", "must", "should",
    "remember to", "note", "task", "todo", "to-do", "checklist", "assignment",
    "responsible for", "your task", "your job", "approve", "validate",
];

const HIGH_ACTION_KEYWORDS: &[&str] = &["need to", "have to", "must", "don't forget"];

lazy_static::lazy_static! {
    static ref DATE_PATTERNS: Vec<Regex> = vec![
        // MM/DD/YYYY など
        Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").unwrap(),
        // Month Day
        Regex::new(r"\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]* \d{1,2}\b").unwrap(),
        // HH:MM
        Regex::new(r"\b\d{1,2}:\d{2}\b").unwrap(),
    ];
}

/// 重み付きキーワード件数
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeywordCounts {
    pub urgency: f64,
    pub action: f64,
}

pub fn keyword_counts(text: &str) -> KeywordCounts {
    let lower = text.to_lowercase().replace('\u{2019}', "'");

    let mut urgency = weighted_hits(&lower, URGENCY_KEYWORDS, HIGH_URGENCY_KEYWORDS);
    let action = weighted_hits(&lower, ACTION_KEYWORDS, HIGH_ACTION_KEYWORDS);

    urgency += DATE_PATTERNS
        .iter()
        .filter(|re| re.is_match(&lower))
        .count() as f64
        * DATE_PATTERN_WEIGHT;

    KeywordCounts { urgency, action }
}

fn weighted_hits(text: &str, keywords: &[&str], high: &[&str]) -> f64 {
    keywords
        .iter()
        .filter(|keyword| text.contains(*keyword))
        .map(|keyword| {
            if high.contains(keyword) {
                HIGH_WEIGHT
            } else {
                REGULAR_WEIGHT
            }
        })
        .sum()
}
