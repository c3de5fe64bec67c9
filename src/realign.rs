//! Punctuation-guided realignment of word-speaker boundaries.
//!
//! Diarization places speaker changes by acoustics alone, which lands them mid-sentence
//! often enough to matter. Punctuation is a better proxy for true utterance breaks, so
//! this module corrects the mapping in two steps:
//!
//! - Step A ([`apply_predicted_punctuation`]): fold a punctuation model's per-word
//!   predictions into the word texts, so sentence boundaries become visible in the words
//!   themselves.
//! - Step B ([`realign_speaker_boundaries`]): wherever a speaker change falls strictly
//!   inside a sentence, find the enclosing sentence extent and relabel it with its
//!   majority speaker, which moves the boundary to the first word after the
//!   sentence-ending mark.
//!
//! When no punctuation information is available the caller skips both steps and the
//! mapping passes through unchanged.
//!
//! The tuned constants (mark sets, window size, majority threshold) are preserved from
//! the observed behavior of the production system; do not re-derive them.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::WordSpeaker;

/// Marks that end a sentence.
pub const SENTENCE_ENDING_MARKS: &str = ".?!";

/// The full set of trailing marks the punctuation model can emit.
const MODEL_MARKS: &str = ".,;:!?";

/// Realignment never considers a sentence extent longer than this many words.
pub const MAX_WORDS_PER_SENTENCE: usize = 50;

/// Multi-letter acronym pattern: two or more single-letter-dot groups, optionally with a
/// bare trailing letter so that both "U.S." and "U.S.A" match.
static ACRONYM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z]\.){2,}$|^(?:[A-Za-z]\.)+[A-Za-z]$").expect("acronym pattern is valid")
});

fn is_acronym(word: &str) -> bool {
    ACRONYM.is_match(word)
}

fn ends_with_sentence_mark(word: &str) -> bool {
    word.chars()
        .last()
        .is_some_and(|c| SENTENCE_ENDING_MARKS.contains(c))
}

fn ends_with_model_mark(word: &str) -> bool {
    word.chars().last().is_some_and(|c| MODEL_MARKS.contains(c))
}

/// Step A: append predicted sentence-ending punctuation to words that lack it.
///
/// `predictions` holds one optional trailing mark per mapping entry (extra predictions
/// are ignored, missing ones leave the tail untouched). A mark is appended only when it
/// is sentence-ending, the word does not already carry a model mark, and the word is not
/// an acronym. A resulting double period collapses to one.
pub fn apply_predicted_punctuation(mapping: &mut [WordSpeaker], predictions: &[Option<char>]) {
    for (entry, predicted) in mapping.iter_mut().zip(predictions) {
        let Some(mark) = predicted else {
            continue;
        };
        if !SENTENCE_ENDING_MARKS.contains(*mark) || entry.word.is_empty() {
            continue;
        }
        if ends_with_model_mark(&entry.word) || is_acronym(&entry.word) {
            continue;
        }

        entry.word.push(*mark);
        if entry.word.ends_with("..") {
            entry.word.pop();
        }
    }
}

/// Left extent of the sentence containing `idx`: scan backwards while the speaker stays
/// the same and no sentence end intervenes, bounded by `max_words`. `None` when the scan
/// stops without reaching a sentence start (the extent is ambiguous).
fn sentence_start(mapping: &[WordSpeaker], idx: usize, max_words: usize) -> Option<usize> {
    let mut left = idx;
    while left > 0
        && idx - left < max_words
        && mapping[left - 1].speaker == mapping[left].speaker
        && !ends_with_sentence_mark(&mapping[left - 1].word)
    {
        left -= 1;
    }

    if left == 0 || ends_with_sentence_mark(&mapping[left - 1].word) {
        Some(left)
    } else {
        None
    }
}

/// Right extent of the sentence containing `idx`: scan forward to the next sentence end,
/// bounded by `max_words`. `None` when the scan stops without finding one.
fn sentence_end(mapping: &[WordSpeaker], idx: usize, max_words: usize) -> Option<usize> {
    let mut right = idx;
    while right + 1 < mapping.len()
        && right - idx < max_words
        && !ends_with_sentence_mark(&mapping[right].word)
    {
        right += 1;
    }

    if right + 1 == mapping.len() || ends_with_sentence_mark(&mapping[right].word) {
        Some(right)
    } else {
        None
    }
}

/// The majority speaker of a window, ties broken by first occurrence, together with its
/// count.
fn majority_speaker(window: &[WordSpeaker]) -> (String, usize) {
    let mut best: (&str, usize) = ("", 0);
    for entry in window {
        let count = window.iter().filter(|e| e.speaker == entry.speaker).count();
        if count > best.1 {
            best = (&entry.speaker, count);
        }
    }
    (best.0.to_owned(), best.1)
}

/// Step B: move speaker boundaries off mid-sentence positions.
///
/// Scans for speaker changes whose preceding word carries no sentence-ending mark,
/// resolves the enclosing sentence extent, and relabels the extent with its majority
/// speaker when that majority covers at least half of it. Extents that cannot be
/// resolved, and windows without a sufficient majority, keep their diarization-derived
/// boundaries unchanged.
///
/// Idempotent: a second pass over its own output changes nothing, because every
/// surviving speaker change either sits on a sentence end or was already judged
/// ambiguous.
pub fn realign_speaker_boundaries(mapping: &mut [WordSpeaker], max_words: usize) {
    let len = mapping.len();
    let mut k = 0usize;

    while k < len {
        if k + 1 < len
            && mapping[k].speaker != mapping[k + 1].speaker
            && !ends_with_sentence_mark(&mapping[k].word)
        {
            let extent = sentence_start(mapping, k, max_words).and_then(|left| {
                let budget = max_words.saturating_sub(k - left).saturating_sub(1);
                sentence_end(mapping, k, budget).map(|right| (left, right))
            });

            if let Some((left, right)) = extent {
                let window = &mapping[left..=right];
                let (speaker, count) = majority_speaker(window);
                if count >= window.len() / 2 {
                    for entry in &mut mapping[left..=right] {
                        entry.speaker = speaker.clone();
                    }
                    k = right;
                }
            }
        }
        k += 1;
    }
}
