//! Removes the agent's "thinking out loud" artifacts from answer text:
//! meta-commentary sentences first, then paragraphs the agent repeated.
//!
//! `clean` is deterministic and idempotent, so it is safe to run on every
//! partial snapshot of the same answer.

use once_cell::sync::Lazy;
use regex::RegexSet;
use std::collections::HashSet;

/// Sentence openers in which the agent narrates its own process.
static META_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)^I (will|am) (begin|beginning|starting|querying|retrieving|searching|gathering|synthesizing|refining|finalizing)",
        r"(?i)^Now (searching|querying|retrieving|gathering|synthesizing)",
        r"(?i)^I have (gathered|retrieved|collected|found)",
        r"(?i)^I (am|will) now (synthesizing|refining|finalizing|completing)",
        r"(?i)^This (archive|collection) (contains|reveals|provides|offers)",
        r"(?i)^Among the (collection's|archive's)",
        r"(?i)^From a (policy|perspective)",
        r"(?i)^Moreover,",
        r"(?i)^Furthermore,",
        r"(?i)^Similarly,",
    ])
    .expect("meta-commentary patterns are valid regexes")
});

/// Short fragments containing these are process narration the pattern
/// list misses.
const PROCESS_WORDS: [&str; 4] = ["querying", "retrieving", "gathering", "synthesizing"];

const SIGNATURE_LEN: usize = 50;
const MIN_PARAGRAPH_LEN: usize = 20;

/// Strip meta-commentary sentences and duplicated paragraphs.
pub fn clean(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let surviving: Vec<&str> = split_sentences(text)
        .into_iter()
        .filter(|sentence| !is_meta_commentary(sentence))
        .collect();
    let joined = surviving.join(" ");

    // The agent sometimes replays whole paragraphs; keep the first
    // occurrence of each signature.
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<&str> = Vec::new();
    for paragraph in joined.split("\n\n") {
        let trimmed = paragraph.trim();
        let signature: String = trimmed
            .chars()
            .take(SIGNATURE_LEN)
            .collect::<String>()
            .to_lowercase();
        if !seen.contains(&signature) && trimmed.chars().count() > MIN_PARAGRAPH_LEN {
            seen.insert(signature);
            unique.push(paragraph);
        }
    }

    unique.join("\n\n").trim().to_string()
}

fn is_meta_commentary(sentence: &str) -> bool {
    if META_PATTERNS.is_match(sentence) {
        return true;
    }

    let trimmed = sentence.trim();
    if trimmed.chars().count() < MIN_PARAGRAPH_LEN {
        let lower = trimmed.to_lowercase();
        if PROCESS_WORDS.iter().any(|word| lower.contains(word)) {
            return true;
        }
    }

    false
}

/// Split on sentence-terminal punctuation followed by whitespace. The
/// punctuation stays with its sentence; the whitespace run is consumed.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut after_terminal = false;
    let mut in_break = false;

    for (i, c) in text.char_indices() {
        if in_break {
            if c.is_whitespace() {
                continue;
            }
            start = i;
            in_break = false;
        } else if c.is_whitespace() && after_terminal {
            sentences.push(&text[start..i]);
            in_break = true;
            after_terminal = false;
            continue;
        }
        after_terminal = matches!(c, '.' | '!' | '?');
    }

    if !in_break {
        sentences.push(&text[start..]);
    }

    sentences
}
