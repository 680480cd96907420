//! Splitting a prompt sentence into clickable words.
//!
//! The word-choice sentence marks its blank with a run of underscores; every
//! other non-space token is a word the learner can click to look up.

const BLANK_MIN_LEN: usize = 4;
const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']', '{', '}'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentencePart {
    Word(String),
    Blank(String),
    Space(String),
}

impl SentencePart {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            SentencePart::Word(text) | SentencePart::Blank(text) | SentencePart::Space(text) => {
                text
            }
        }
    }
}

/// Tokenize `sentence`, keeping whitespace so the parts concatenate back to
/// the original text.
#[must_use]
pub fn tokenize_sentence(sentence: &str) -> Vec<SentencePart> {
    let mut parts = Vec::new();
    let mut word = String::new();
    let mut space = String::new();

    for ch in sentence.chars() {
        if ch.is_whitespace() {
            if !word.is_empty() {
                split_blanks(&std::mem::take(&mut word), &mut parts);
            }
            space.push(ch);
        } else {
            if !space.is_empty() {
                parts.push(SentencePart::Space(std::mem::take(&mut space)));
            }
            word.push(ch);
        }
    }
    if !word.is_empty() {
        split_blanks(&word, &mut parts);
    }
    if !space.is_empty() {
        parts.push(SentencePart::Space(space));
    }
    parts
}

fn split_blanks(token: &str, parts: &mut Vec<SentencePart>) {
    let mut text = String::new();
    let mut underscores = 0_usize;

    let flush_underscores = |text: &mut String, underscores: &mut usize, parts: &mut Vec<SentencePart>| {
        if *underscores >= BLANK_MIN_LEN {
            if !text.is_empty() {
                parts.push(SentencePart::Word(std::mem::take(text)));
            }
            parts.push(SentencePart::Blank("_".repeat(*underscores)));
        } else {
            text.push_str(&"_".repeat(*underscores));
        }
        *underscores = 0;
    };

    for ch in token.chars() {
        if ch == '_' {
            underscores += 1;
        } else {
            flush_underscores(&mut text, &mut underscores, parts);
            text.push(ch);
        }
    }
    flush_underscores(&mut text, &mut underscores, parts);
    if !text.is_empty() {
        parts.push(SentencePart::Word(text));
    }
}

/// Strip punctuation from a clicked token. Returns `None` when nothing
/// lookup-worthy is left.
#[must_use]
pub fn clean_word(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|ch| !PUNCTUATION.contains(ch)).collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
