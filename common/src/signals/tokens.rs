//! 単語トークン化と簡易レンマ照合
//!
//! OCRテキストを小文字の単語列に分割する。句読点は捨て、
//! 語中のアポストロフィ・ハイフン（don't, to-do）は保持する。

/// テキストを小文字トークン列に分割
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let c = if c == '\u{2019}' { '\'' } else { c };
        if c.is_alphanumeric() {
            current.extend(c.to_lowercase());
            continue;
        }

        // 語中の ' と - は単語の一部
        let joins_word = (c == '\'' || c == '-')
            && !current.is_empty()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        if joins_word {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// 不規則活用（活用形, 原形）
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("did", "do"),
    ("does", "do"),
    ("done", "do"),
    ("doing", "do"),
    ("made", "make"),
    ("paid", "pay"),
    ("sent", "send"),
    ("bought", "buy"),
    ("met", "meet"),
];

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// `word` が `lemma` の活用形か判定
///
/// 規則活用（-s, -es, -ed, -ing, 子音重ね, y→ies/ied）と不規則活用表のみ扱う。
pub fn inflects(word: &str, lemma: &str) -> bool {
    if word == lemma {
        return true;
    }

    if IRREGULAR_FORMS
        .iter()
        .any(|&(form, base)| form == word && base == lemma)
    {
        return true;
    }

    let Some(suffix) = word.strip_prefix(lemma) else {
        return inflects_with_stem_change(word, lemma);
    };

    match suffix {
        "s" | "es" | "ed" | "ing" => true,
        "d" => lemma.ends_with('e'),
        _ => match lemma.chars().last() {
            // submit → submitted / submitting
            Some(last) if !VOWELS.contains(&last) => {
                suffix == format!("{}ed", last) || suffix == format!("{}ing", last)
            }
            _ => false,
        },
    }
}

fn inflects_with_stem_change(word: &str, lemma: &str) -> bool {
    // make → making
    if let Some(stem) = lemma.strip_suffix('e') {
        if word.strip_prefix(stem) == Some("ing") {
            return true;
        }
    }

    // apply → applies / applied
    if let Some(stem) = lemma.strip_suffix('y') {
        if let Some(suffix) = word.strip_prefix(stem) {
            let consonant_before = stem.chars().last().is_some_and(|c| !VOWELS.contains(&c));
            return consonant_before && (suffix == "ies" || suffix == "ied");
        }
    }

    false
}
