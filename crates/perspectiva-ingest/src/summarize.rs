//! Extractive summarization.
//!
//! Primary strategy ranks sentences by the average frequency of their
//! significant terms and keeps the top N in original order. If that
//! produces nothing, the first N sentences are taken; as a last resort the
//! raw text is truncated. For non-empty input the result is always
//! non-empty and never longer than the input.

use std::collections::HashMap;

/// Input at or below this length is returned unmodified.
const MIN_INPUT_LEN: usize = 200;

/// Character budget for the truncation fallback.
const TRUNCATE_BUDGET: usize = 500;

/// Common English words excluded from sentence-salience scoring.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "had", "has", "have",
    "he", "her", "his", "in", "is", "it", "its", "not", "of", "on", "or", "said", "she", "that",
    "the", "their", "they", "this", "to", "was", "were", "which", "will", "with",
];

/// Reduce `text` to at most `max_sentences` representative sentences.
///
/// Total for non-empty input: some fallback always yields output.
#[must_use]
pub fn summarize(text: &str, max_sentences: usize) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    if text.len() <= MIN_INPUT_LEN {
        return text.to_string();
    }

    let max_sentences = max_sentences.max(1);

    let ranked = salient_sentences(text, max_sentences);
    if !ranked.is_empty() {
        return ranked;
    }

    let naive = first_sentences(text, max_sentences);
    if !naive.is_empty() {
        return naive;
    }

    truncate(text, TRUNCATE_BUDGET)
}

/// Split text into sentences on `.`, `!`, `?` followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev_was_terminal = false;

    for (idx, ch) in text.char_indices() {
        if prev_was_terminal && ch.is_whitespace() {
            let sentence = text[start..idx].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = idx;
        }
        prev_was_terminal = matches!(ch, '.' | '!' | '?');
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

fn significant_terms(sentence: &str) -> Vec<String> {
    sentence
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Rank sentences by mean significant-term frequency; keep the top
/// `max_sentences` in their original order.
fn salient_sentences(text: &str, max_sentences: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= max_sentences {
        return sentences.join(" ");
    }

    let mut frequency: HashMap<String, usize> = HashMap::new();
    let terms_per_sentence: Vec<Vec<String>> =
        sentences.iter().map(|s| significant_terms(s)).collect();
    for terms in &terms_per_sentence {
        for term in terms {
            *frequency.entry(term.clone()).or_insert(0) += 1;
        }
    }

    let mut scored: Vec<(usize, f64)> = terms_per_sentence
        .iter()
        .enumerate()
        .map(|(idx, terms)| {
            let score = if terms.is_empty() {
                0.0
            } else {
                #[allow(clippy::cast_precision_loss)]
                let sum: f64 = terms
                    .iter()
                    .map(|t| frequency.get(t).copied().unwrap_or(0) as f64)
                    .sum();
                #[allow(clippy::cast_precision_loss)]
                let denom = terms.len() as f64;
                sum / denom
            };
            (idx, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut picked: Vec<usize> = scored
        .into_iter()
        .take(max_sentences)
        .map(|(idx, _)| idx)
        .collect();
    picked.sort_unstable();

    picked
        .into_iter()
        .map(|idx| sentences[idx])
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_sentences(text: &str, max_sentences: usize) -> String {
    split_sentences(text)
        .into_iter()
        .take(max_sentences)
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(text: &str, budget: usize) -> String {
    if text.len() <= budget {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .take_while(|(idx, _)| *idx < budget)
        .last()
        .map_or(0, |(idx, ch)| idx + ch.len_utf8());
    format!("{}...", text[..cut].trim_end())
}
