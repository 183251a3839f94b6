//! 日付・時刻表現からの緊急度
//!
//! 相対日付（today, tomorrow, this week, next week）と時刻（HH:MM）を検出し、
//! 最も近い期限に対応する緊急度を返す。

use regex::Regex;

/// today / tonight / now
pub const IMMEDIATE_URGENCY: f64 = 1.0;
pub const TOMORROW_URGENCY: f64 = 0.9;
pub const THIS_WEEK_URGENCY: f64 = 0.7;
pub const NEXT_WEEK_URGENCY: f64 = 0.4;
/// 時刻の記載があれば最低この値
pub const CLOCK_TIME_URGENCY: f64 = 0.6;

lazy_static::lazy_static! {
    static ref CLOCK_TIME_RE: Regex = Regex::new(r"\b([0-1]?[0-9]|2[0-3]):([0-5][0-9])\b").unwrap();
}

/// トークン列と原文から日付由来の緊急度を算出（該当なしは 0.0）
pub fn date_urgency(tokens: &[String], text: &str) -> f64 {
    let mut urgency: f64 = 0.0;

    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1).map(String::as_str);
        let value = match (token.as_str(), next) {
            ("today" | "tonight" | "now", _) => IMMEDIATE_URGENCY,
            ("tomorrow", _) => TOMORROW_URGENCY,
            ("this", Some("week")) => THIS_WEEK_URGENCY,
            ("next", Some("week")) => NEXT_WEEK_URGENCY,
            _ => continue,
        };
        urgency = urgency.max(value);
    }

    if has_clock_time(text) {
        urgency = urgency.max(CLOCK_TIME_URGENCY);
    }

    urgency
}

pub fn has_clock_time(text: &str) -> bool {
    CLOCK_TIME_RE.is_match(text)
}
