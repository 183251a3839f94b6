//! トークン列パターンマッチャー
//!
//! 各パターンはトークン指定（小文字一致・レンマ一致・任意の1トークン）の列。
//! 任意トークンを含むパターンは、省略した場合と消費した場合の両方の
//! スパンを返す。同じ (ラベル, 開始, 終了) は1件として数える。

use super::tokens::{inflects, tokenize};
use crate::error::{Error, Result};
use std::collections::HashSet;

/// マッチのラベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalLabel {
    Urgency,
    Action,
}

/// 1トークン分の指定
#[derive(Debug, Clone)]
pub enum TokenSpec {
    /// 小文字表記がいずれかに一致
    Lower(&'static [&'static str]),
    /// いずれかの原形の活用形
    Lemma(&'static [&'static str]),
    /// 任意の1トークン（省略可）
    Optional,
}

impl TokenSpec {
    fn matches(&self, token: &str) -> bool {
        match self {
            TokenSpec::Lower(words) => words.contains(&token),
            TokenSpec::Lemma(lemmas) => lemmas.iter().any(|lemma| inflects(token, lemma)),
            TokenSpec::Optional => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenPattern {
    pub label: SignalLabel,
    pub tokens: Vec<TokenSpec>,
}

impl TokenPattern {
    pub fn new(label: SignalLabel, tokens: Vec<TokenSpec>) -> Self {
        Self { label, tokens }
    }
}

/// パターン別のマッチ件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchCounts {
    pub urgency: usize,
    pub action: usize,
}

/// パターンマッチエンジン
#[derive(Debug, Clone)]
pub struct PatternEngine {
    patterns: Vec<TokenPattern>,
}

impl PatternEngine {
    /// 既定の緊急度・行動パターンで構築
    pub fn new() -> Result<Self> {
        Self::with_patterns(default_patterns())
    }

    pub fn with_patterns(patterns: Vec<TokenPattern>) -> Result<Self> {
        if patterns.is_empty() {
            return Err(Error::Pattern("no patterns registered".into()));
        }

        for (idx, pattern) in patterns.iter().enumerate() {
            match pattern.tokens.first() {
                None => return Err(Error::Pattern(format!("pattern #{} is empty", idx))),
                Some(TokenSpec::Optional) => {
                    return Err(Error::Pattern(format!(
                        "pattern #{} starts with an optional token",
                        idx
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 全マッチスパンを列挙
    pub fn find_matches(&self, tokens: &[String]) -> HashSet<(SignalLabel, usize, usize)> {
        let mut spans = HashSet::new();

        for start in 0..tokens.len() {
            for pattern in &self.patterns {
                for end in match_ends(&pattern.tokens, tokens, start) {
                    if end > start {
                        spans.insert((pattern.label, start, end));
                    }
                }
            }
        }

        spans
    }

    /// テキストのマッチ件数を数える
    ///
    /// 単語トークンが1つも取れないテキストはエラー（呼び出し側がキーワード解析へ切り替える）。
    pub fn count(&self, text: &str) -> Result<MatchCounts> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(Error::Pattern("text has no word tokens".into()));
        }

        let mut counts = MatchCounts::default();
        for (label, _, _) in self.find_matches(&tokens) {
            match label {
                SignalLabel::Urgency => counts.urgency += 1,
                SignalLabel::Action => counts.action += 1,
            }
        }

        Ok(counts)
    }
}

/// `pos` から始めて `specs` を満たせる終了位置をすべて返す
fn match_ends(specs: &[TokenSpec], tokens: &[String], pos: usize) -> Vec<usize> {
    let Some((spec, rest)) = specs.split_first() else {
        return vec![pos];
    };

    let mut ends = Vec::new();

    if matches!(spec, TokenSpec::Optional) {
        ends.extend(match_ends(rest, tokens, pos));
    }

    if let Some(token) = tokens.get(pos) {
        if spec.matches(token) {
            ends.extend(match_ends(rest, tokens, pos + 1));
        }
    }

    ends
}

fn lower(words: &'static [&'static str]) -> TokenSpec {
    TokenSpec::Lower(words)
}

fn lemma(lemmas: &'static [&'static str]) -> TokenSpec {
    TokenSpec::Lemma(lemmas)
}

const ACTION_VERBS: &[&str] = &[
    "apply", "submit", "call", "email", "send", "register", "sign", "complete", "finish", "do",
    "make", "prepare", "check", "verify", "confirm", "review", "pay", "schedule", "book",
    "order", "buy", "download", "install", "update", "contact", "follow", "attend", "join",
    "meet", "create", "add", "track", "report", "file", "fill", "upload", "backup", "login",
    "access",
];

/// 既定のパターン集合
pub fn default_patterns() -> Vec<TokenPattern> {
    use SignalLabel::{Action, Urgency};
    use TokenSpec::Optional;

    vec![
        // 緊急度: 即時性
        TokenPattern::new(
            Urgency,
            vec![lower(&[
                "today", "tomorrow", "tonight", "asap", "urgent", "immediately", "emergency",
                "critical",
            ])],
        ),
        TokenPattern::new(
            Urgency,
            vec![
                lower(&["this"]),
                lower(&["week", "month", "morning", "afternoon", "evening"]),
            ],
        ),
        // 締切表現
        TokenPattern::new(
            Urgency,
            vec![lower(&["deadline", "due", "by", "before"]), Optional],
        ),
        TokenPattern::new(
            Urgency,
            vec![lower(&["soon", "quickly", "fast", "rapid", "prompt"])],
        ),
        TokenPattern::new(
            Urgency,
            vec![lower(&["waiting", "pending", "limited", "closing"])],
        ),
        TokenPattern::new(
            Urgency,
            vec![lower(&["important", "priority", "critical", "crucial", "significant"])],
        ),
        TokenPattern::new(
            Urgency,
            vec![
                lower(&["running"]),
                lower(&["out"]),
                lower(&["of"]),
                lower(&["time"]),
            ],
        ),
        TokenPattern::new(
            Urgency,
            vec![
                lower(&["last"]),
                lower(&["chance", "opportunity", "day", "call"]),
            ],
        ),
        // 行動: 命令形の動詞
        TokenPattern::new(Action, vec![lemma(ACTION_VERBS)]),
        TokenPattern::new(
            Action,
            vec![lower(&["don't"]), lower(&["forget"]), lower(&["to"])],
        ),
        TokenPattern::new(Action, vec![lower(&["reminder"]), Optional]),
        TokenPattern::new(Action, vec![lower(&["remind"]), lower(&["me"]), Optional]),
        // 必要性
        TokenPattern::new(Action, vec![lemma(&["need"]), lower(&["to"])]),
        TokenPattern::new(Action, vec![lemma(&["have"]), lower(&["to"])]),
        TokenPattern::new(Action, vec![lemma(&["must"]), Optional]),
        TokenPattern::new(Action, vec![lemma(&["should"]), Optional]),
        TokenPattern::new(Action, vec![lemma(&["remember"]), lower(&["to"])]),
        TokenPattern::new(Action, vec![lower(&["note"]), Optional]),
        // タスク
        TokenPattern::new(
            Action,
            vec![lower(&["task", "todo", "to-do", "checklist", "assignment"])],
        ),
        TokenPattern::new(Action, vec![lower(&["responsible"]), lower(&["for"])]),
        TokenPattern::new(
            Action,
            vec![
                lower(&["your"]),
                lower(&["task", "job", "responsibility", "assignment"]),
            ],
        ),
        // 承認・確認依頼
        TokenPattern::new(
            Action,
            vec![lower(&["approve", "confirm", "validate", "verify"])],
        ),
    ]
}
