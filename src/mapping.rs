//! Initial word-to-speaker mapping.
//!
//! A single left-to-right merge over two time-ordered sequences: for each word (in time
//! order) the turn cursor advances while the word's anchor time lies past the current
//! turn's end, then the word takes the current turn's speaker. O(words + turns), and the
//! cursor never re-scans turns already passed.
//!
//! Degradation rules:
//! - words before the first turn take the first turn's speaker
//! - words after the last turn keep the last turn's speaker
//! - overlapping turns resolve by first-match-by-scan order (the cursor stops at the
//!   first turn whose end covers the anchor)

use crate::turns::TurnIndex;
use crate::types::{WordSpeaker, WordTimestamp};

/// Which point of a word's interval anchors it to a speaker turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorPolicy {
    /// Anchor at the word's start time (the default).
    #[default]
    Start,
    /// Anchor at the word's end time.
    End,
    /// Anchor at the midpoint of the word's interval.
    Mid,
}

impl AnchorPolicy {
    pub(crate) fn resolve(self, start_ms: i64, end_ms: i64) -> i64 {
        match self {
            Self::Start => start_ms,
            Self::End => end_ms,
            Self::Mid => (start_ms + end_ms) / 2,
        }
    }

    /// Stable slug used in model tags.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Mid => "mid",
        }
    }
}

/// Assign each word to a speaker turn, producing one WSM entry per input word.
///
/// Returns [`crate::Error::EmptyTurnIndex`] when `turns` holds no turns at all; every
/// other shape degrades gracefully as described in the module docs.
pub fn map_words_to_speakers(
    words: &[WordTimestamp],
    turns: &TurnIndex,
    anchor: AnchorPolicy,
) -> crate::Result<Vec<WordSpeaker>> {
    if words.is_empty() {
        return Ok(Vec::new());
    }
    let turns = turns.turns();
    if turns.is_empty() {
        return Err(crate::Error::EmptyTurnIndex);
    }

    let mut mapping = Vec::with_capacity(words.len());
    let mut cursor = 0usize;

    for word in words {
        let anchor_ms = anchor.resolve(word.start_ms, word.end_ms);
        while anchor_ms > turns[cursor].end_ms && cursor + 1 < turns.len() {
            cursor += 1;
        }
        mapping.push(WordSpeaker {
            word: word.text.clone(),
            start_ms: word.start_ms,
            end_ms: word.end_ms,
            speaker: turns[cursor].speaker.clone(),
            source_id: word.source_id,
        });
    }

    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpeakerTurn;

    fn word(text: &str, start_ms: i64, end_ms: i64) -> WordTimestamp {
        WordTimestamp {
            text: text.into(),
            start_ms,
            end_ms,
            source_id: 0,
        }
    }

    fn turn(start_ms: i64, end_ms: i64, speaker: &str) -> SpeakerTurn {
        SpeakerTurn {
            start_ms,
            end_ms,
            speaker: speaker.into(),
        }
    }

    fn speakers(mapping: &[WordSpeaker]) -> Vec<&str> {
        mapping.iter().map(|m| m.speaker.as_str()).collect()
    }

    #[test]
    fn maps_words_into_containing_turns() -> anyhow::Result<()> {
        // The reference scenario: boundary word lands with the turn containing its start.
        let words = [
            word("Hello", 0, 500),
            word("world", 500, 1000),
            word("Goodbye", 1000, 1500),
        ];
        let turns = TurnIndex::from_turns(vec![turn(0, 1000, "A"), turn(1000, 1500, "B")]);

        let mapping = map_words_to_speakers(&words, &turns, AnchorPolicy::Start)?;
        assert_eq!(mapping.len(), 3);
        assert_eq!(speakers(&mapping), ["A", "A", "B"]);
        Ok(())
    }

    #[test]
    fn single_turn_takes_every_word_regardless_of_anchor() -> anyhow::Result<()> {
        let words = [word("a", 0, 100), word("b", 5000, 6000)];
        let turns = TurnIndex::from_turns(vec![turn(0, 10_000, "solo")]);
        for anchor in [AnchorPolicy::Start, AnchorPolicy::End, AnchorPolicy::Mid] {
            let mapping = map_words_to_speakers(&words, &turns, anchor)?;
            assert_eq!(speakers(&mapping), ["solo", "solo"]);
        }
        Ok(())
    }

    #[test]
    fn words_past_the_last_turn_keep_the_last_speaker() -> anyhow::Result<()> {
        let words = [word("in", 100, 200), word("out", 9000, 9500)];
        let turns = TurnIndex::from_turns(vec![turn(0, 1000, "A"), turn(1000, 2000, "B")]);
        let mapping = map_words_to_speakers(&words, &turns, AnchorPolicy::Start)?;
        assert_eq!(speakers(&mapping), ["A", "B"]);
        Ok(())
    }

    #[test]
    fn word_before_first_turn_takes_first_speaker() -> anyhow::Result<()> {
        let words = [word("early", 0, 100)];
        let turns = TurnIndex::from_turns(vec![turn(500, 1000, "A")]);
        let mapping = map_words_to_speakers(&words, &turns, AnchorPolicy::Start)?;
        assert_eq!(speakers(&mapping), ["A"]);
        Ok(())
    }

    #[test]
    fn overlapping_turns_resolve_first_match() -> anyhow::Result<()> {
        // Both turns contain 600ms; scan order prefers the earlier one.
        let words = [word("w", 600, 700)];
        let turns = TurnIndex::from_turns(vec![turn(0, 1000, "A"), turn(500, 1500, "B")]);
        let mapping = map_words_to_speakers(&words, &turns, AnchorPolicy::Start)?;
        assert_eq!(speakers(&mapping), ["A"]);
        Ok(())
    }

    #[test]
    fn mid_anchor_crosses_boundary_where_start_does_not() -> anyhow::Result<()> {
        // Word spans the boundary: start lands in A, midpoint lands in B.
        let words = [word("bridge", 900, 1500)];
        let turns = TurnIndex::from_turns(vec![turn(0, 1000, "A"), turn(1000, 2000, "B")]);

        let by_start = map_words_to_speakers(&words, &turns, AnchorPolicy::Start)?;
        assert_eq!(speakers(&by_start), ["A"]);

        let by_mid = map_words_to_speakers(&words, &turns, AnchorPolicy::Mid)?;
        assert_eq!(speakers(&by_mid), ["B"]);
        Ok(())
    }

    #[test]
    fn empty_words_yield_empty_mapping() -> anyhow::Result<()> {
        let turns = TurnIndex::from_turns(vec![turn(0, 1000, "A")]);
        assert!(map_words_to_speakers(&[], &turns, AnchorPolicy::Start)?.is_empty());
        Ok(())
    }

    #[test]
    fn empty_turns_error() {
        let words = [word("lost", 0, 100)];
        let err = map_words_to_speakers(&words, &TurnIndex::default(), AnchorPolicy::Start)
            .unwrap_err();
        assert!(matches!(err, crate::Error::EmptyTurnIndex));
    }

    #[test]
    fn output_preserves_word_order_and_count() -> anyhow::Result<()> {
        let words: Vec<WordTimestamp> = (0..20)
            .map(|i| word(&format!("w{i}"), i * 100, i * 100 + 90))
            .collect();
        let turns = TurnIndex::from_turns(vec![turn(0, 900, "A"), turn(900, 2000, "B")]);
        let mapping = map_words_to_speakers(&words, &turns, AnchorPolicy::Start)?;
        assert_eq!(mapping.len(), words.len());
        assert!(mapping.windows(2).all(|w| w[0].start_ms <= w[1].start_ms));
        Ok(())
    }
}
