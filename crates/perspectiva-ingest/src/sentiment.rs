//! Lexical sentiment classification.

use perspectiva_core::Sentiment;

/// Words counted as positive signals.
const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "positive", "up", "win", "benefit", "beneficial", "growth", "success",
];

/// Words counted as negative signals.
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worse", "loss", "down", "decline", "negative", "risk", "crash", "drop",
];

/// Classify text by comparing positive and negative keyword counts.
///
/// Total and deterministic: empty input and ties are `Neutral`, the same
/// text always yields the same label.
#[must_use]
pub fn classify(text: &str) -> Sentiment {
    let mut positive = 0_usize;
    let mut negative = 0_usize;

    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if POSITIVE_WORDS.contains(&w.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&w.as_str()) {
            negative += 1;
        }
    }

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
