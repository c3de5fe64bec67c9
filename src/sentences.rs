//! Sentence-level aggregation of a realigned word-speaker mapping.

use crate::realign::SENTENCE_ENDING_MARKS;
use crate::types::{SentenceSegment, WordSpeaker};

fn ends_sentence(word: &str) -> bool {
    word.chars()
        .last()
        .is_some_and(|c| SENTENCE_ENDING_MARKS.contains(c))
}

/// Fold a word-speaker mapping into sentence segments.
///
/// A new segment starts whenever the speaker changes or the previous word ended with a
/// sentence-ending mark. Segment text is the run's words joined with single spaces;
/// segment times span the first word's start to the last word's end. A trailing run with
/// no terminal punctuation still closes at end of input.
pub fn aggregate_sentences(mapping: &[WordSpeaker]) -> Vec<SentenceSegment> {
    let mut sentences = Vec::new();
    let Some(first) = mapping.first() else {
        return sentences;
    };

    let mut current = SentenceSegment {
        start_ms: first.start_ms,
        end_ms: first.end_ms,
        speaker: first.speaker.clone(),
        text: first.word.clone(),
        source_id: first.source_id,
    };
    let mut prev = first;

    for entry in &mapping[1..] {
        if entry.speaker != prev.speaker || ends_sentence(&prev.word) {
            sentences.push(current);
            current = SentenceSegment {
                start_ms: entry.start_ms,
                end_ms: entry.end_ms,
                speaker: entry.speaker.clone(),
                text: entry.word.clone(),
                source_id: entry.source_id,
            };
        } else {
            current.end_ms = entry.end_ms;
            current.text.push(' ');
            current.text.push_str(&entry.word);
        }
        prev = entry;
    }
    sentences.push(current);

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, start_ms: i64, end_ms: i64, speaker: &str) -> WordSpeaker {
        WordSpeaker {
            word: word.into(),
            start_ms,
            end_ms,
            speaker: speaker.into(),
            source_id: start_ms,
        }
    }

    #[test]
    fn empty_mapping_yields_no_segments() {
        assert!(aggregate_sentences(&[]).is_empty());
    }

    #[test]
    fn single_speaker_without_punctuation_folds_to_one_segment() {
        let mapping = [
            entry("the", 0, 200, "A"),
            entry("quick", 200, 400, "A"),
            entry("fox", 400, 900, "A"),
        ];
        let sentences = aggregate_sentences(&mapping);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "the quick fox");
        assert_eq!(sentences[0].start_ms, 0);
        assert_eq!(sentences[0].end_ms, 900);
        assert_eq!(sentences[0].speaker, "A");
    }

    #[test]
    fn splits_exactly_at_speaker_change() {
        let mapping = [
            entry("Hello", 0, 500, "A"),
            entry("world", 500, 1000, "A"),
            entry("Goodbye", 1000, 1500, "B"),
        ];
        let sentences = aggregate_sentences(&mapping);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Hello world");
        assert_eq!(sentences[0].speaker, "A");
        assert_eq!((sentences[0].start_ms, sentences[0].end_ms), (0, 1000));
        assert_eq!(sentences[1].text, "Goodbye");
        assert_eq!(sentences[1].speaker, "B");
        assert_eq!((sentences[1].start_ms, sentences[1].end_ms), (1000, 1500));
    }

    #[test]
    fn splits_after_sentence_ending_punctuation() {
        let mapping = [
            entry("Done.", 0, 300, "A"),
            entry("Next", 300, 600, "A"),
            entry("one", 600, 900, "A"),
        ];
        let sentences = aggregate_sentences(&mapping);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Done.");
        assert_eq!(sentences[1].text, "Next one");
    }

    #[test]
    fn comma_does_not_split() {
        let mapping = [entry("well,", 0, 300, "A"), entry("fine", 300, 600, "A")];
        let sentences = aggregate_sentences(&mapping);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].text, "well, fine");
    }

    #[test]
    fn trailing_run_without_punctuation_still_closes() {
        let mapping = [
            entry("Over.", 0, 300, "A"),
            entry("and", 300, 600, "A"),
            entry("out", 600, 900, "A"),
        ];
        let sentences = aggregate_sentences(&mapping);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "and out");
        assert_eq!(sentences[1].end_ms, 900);
    }

    #[test]
    fn segments_are_non_overlapping_and_cover_the_run() {
        let mapping = [
            entry("a.", 0, 100, "A"),
            entry("b", 100, 200, "A"),
            entry("c?", 200, 300, "B"),
            entry("d", 300, 400, "B"),
        ];
        let sentences = aggregate_sentences(&mapping);
        assert_eq!(sentences.len(), 3);
        assert!(sentences.windows(2).all(|w| w[0].end_ms <= w[1].start_ms));
        assert_eq!(sentences.first().map(|s| s.start_ms), Some(0));
        assert_eq!(sentences.last().map(|s| s.end_ms), Some(400));
    }

    #[test]
    fn source_id_comes_from_first_word_of_run() {
        let mapping = [
            entry("one", 0, 100, "A"),
            entry("two", 100, 200, "A"),
            entry("three", 200, 300, "B"),
        ];
        let sentences = aggregate_sentences(&mapping);
        assert_eq!(sentences[0].source_id, 0);
        assert_eq!(sentences[1].source_id, 200);
    }
}
