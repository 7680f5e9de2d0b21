//! Sentence splitting: text in, ordered `SentenceList` out.

use serde::Deserialize;

use crate::model::SentenceList;

/// Language of a text: an explicit code such as `"en"`, or `"auto"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum LanguageHint {
    #[default]
    Auto,
    Code(String),
}

impl From<String> for LanguageHint {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl LanguageHint {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Code(s.to_ascii_lowercase())
        }
    }
}

impl std::fmt::Display for LanguageHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Code(code) => write!(f, "{code}"),
        }
    }
}

pub trait SentenceSplitter {
    fn split(&self, text: &str, hint: &LanguageHint) -> SentenceList;
}

/// Punctuation-rule splitter.
///
/// CJK text (`zh`, `ja`, or `auto` with Han characters present) is split on
/// runs of `。！？` with the delimiters dropped. Everything else is split after
/// sentence-final punctuation that is followed by whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSplitter;

impl SentenceSplitter for RuleSplitter {
    fn split(&self, text: &str, hint: &LanguageHint) -> SentenceList {
        let cjk = match hint {
            LanguageHint::Code(code) => matches!(code.as_str(), "zh" | "ja"),
            LanguageHint::Auto => contains_han(text),
        };
        let sentences = if cjk {
            split_cjk(text)
        } else {
            split_spaced(text)
        };
        SentenceList::new(sentences)
    }
}

/// Pre-split input: one sentence per non-blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSplitter;

impl SentenceSplitter for LineSplitter {
    fn split(&self, text: &str, _hint: &LanguageHint) -> SentenceList {
        SentenceList::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        )
    }
}

fn contains_han(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？')
}

fn split_spaced(text: &str) -> Vec<String> {
    let text = text.replace('\n', " ");
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut prev_terminal = false;

    for ch in text.chars() {
        if ch.is_whitespace() && prev_terminal {
            push_trimmed(&mut out, &cur);
            cur.clear();
            prev_terminal = false;
            continue;
        }
        if !(ch.is_whitespace() && cur.is_empty()) {
            cur.push(ch);
        }
        prev_terminal = is_terminal(ch);
    }
    push_trimmed(&mut out, &cur);
    out
}

fn split_cjk(text: &str) -> Vec<String> {
    let text = text.replace('\n', "");
    text.split(['。', '！', '？'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}
