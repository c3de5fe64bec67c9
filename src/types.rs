//! Core and wire data model for the alignment pipeline.
//!
//! Two representations live here on purpose:
//! - Core types carry integer milliseconds. All alignment arithmetic happens on these, so
//!   ordering comparisons are exact and never subject to float rounding.
//! - Wire types carry `f64` seconds with camelCase field names, matching what the pipeline
//!   orchestrator sends and expects back.
//!
//! Everything is request-scoped: built fresh per call, dropped once the response is
//! serialized.

use serde::{Deserialize, Serialize};

/// A single ASR word with its timestamps. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct WordTimestamp {
    pub text: String,
    pub start_ms: i64,
    pub end_ms: i64,
    /// Id of the source annotation this word came from (echoed into output segments).
    pub source_id: i64,
}

/// One diarization interval attributed to a single speaker.
///
/// Turns for the same speaker may be non-contiguous. Turns from different speakers are
/// expected not to overlap; when they do, mapping resolves by first-match-by-scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerTurn {
    pub start_ms: i64,
    pub end_ms: i64,
    pub speaker: String,
}

/// One word-speaker mapping (WSM) entry.
///
/// Created by the mapper with one entry per input word; the realigner may rewrite
/// `speaker` and append punctuation to `word` in place.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSpeaker {
    pub word: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub speaker: String,
    pub source_id: i64,
}

/// A sentence-level speaker turn derived from a contiguous same-speaker WSM run.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceSegment {
    pub start_ms: i64,
    pub end_ms: i64,
    pub speaker: String,
    /// The run's words joined with single spaces, punctuation preserved.
    pub text: String,
    pub source_id: i64,
}

const MS_PER_SEC: f64 = 1000.0;

pub(crate) fn sec_to_ms(sec: f64) -> i64 {
    (sec * MS_PER_SEC).round() as i64
}

pub(crate) fn ms_to_sec(ms: i64) -> f64 {
    ms as f64 / MS_PER_SEC
}

// ---------------------------------------------------------------------------
// Wire model
// ---------------------------------------------------------------------------

/// A raw diarization turn as supplied on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpeakerTurn {
    pub onset_sec: f64,
    pub duration_sec: f64,
    pub speaker_label: String,
    #[serde(default)]
    pub source_id: i64,
}

impl RawSpeakerTurn {
    /// Convert into the core representation (`end = onset + duration`).
    pub fn to_turn(&self) -> SpeakerTurn {
        let start_ms = sec_to_ms(self.onset_sec);
        SpeakerTurn {
            start_ms,
            end_ms: start_ms + sec_to_ms(self.duration_sec),
            speaker: self.speaker_label.clone(),
        }
    }
}

/// A raw ASR word as supplied on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWord {
    pub start_sec: f64,
    pub end_sec: f64,
    pub text: String,
    #[serde(default)]
    pub source_id: i64,
}

impl RawWord {
    pub fn to_word(&self) -> WordTimestamp {
        WordTimestamp {
            text: self.text.clone(),
            start_ms: sec_to_ms(self.start_sec),
            end_ms: sec_to_ms(self.end_sec),
            source_id: self.source_id,
        }
    }
}

/// A base64-encoded WAV payload attached to a request item.
///
/// Present when the caller wants this service to run diarization or ASR itself instead of
/// supplying turns/words directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    pub id: i64,
    pub base64: String,
    #[serde(default = "default_channels")]
    pub channels: u16,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default = "default_bits_per_sample")]
    pub bits_per_sample: u16,
}

fn default_channels() -> u16 {
    1
}

fn default_frequency() -> u32 {
    16_000
}

fn default_bits_per_sample() -> u16 {
    16
}

/// One audio input to align: diarization turns plus ASR words, optionally with the audio
/// itself for collaborator-driven processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignItem {
    #[serde(default)]
    pub audio: Option<AudioPayload>,
    #[serde(default)]
    pub speaker_turns: Vec<RawSpeakerTurn>,
    #[serde(default)]
    pub words: Vec<RawWord>,
}

/// The request shape consumed by the alignment orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignRequest {
    pub items: Vec<AlignItem>,

    /// Apply punctuation-guided realignment (degrades to pass-through when no punctuation
    /// model is available).
    #[serde(default)]
    pub use_punctuation: bool,

    /// `true` emits one segment per word; `false` emits sentence-level segments.
    #[serde(default)]
    pub word_level_output: bool,

    /// Requested language; unsupported values fall back to the documented default.
    #[serde(default)]
    pub lang: Option<String>,

    /// Diarization domain profile; unsupported values fall back to the documented default.
    #[serde(default)]
    pub domain: Option<String>,

    /// Punctuation model identifier used as the cache key.
    #[serde(default)]
    pub punctuation_model: Option<String>,
}

/// One speaker-labeled output segment (word- or sentence-level).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSegment {
    pub start_sec: f64,
    pub end_sec: f64,
    pub speaker_label: String,
    pub text: String,
    /// Deterministic identifier of the models/config that produced this segment.
    pub model_tag: String,
    pub source_id: i64,
}

impl AlignedSegment {
    pub(crate) fn from_word(entry: &WordSpeaker, model_tag: &str) -> Self {
        Self {
            start_sec: ms_to_sec(entry.start_ms),
            end_sec: ms_to_sec(entry.end_ms),
            speaker_label: entry.speaker.clone(),
            text: entry.word.clone(),
            model_tag: model_tag.to_owned(),
            source_id: entry.source_id,
        }
    }

    pub(crate) fn from_sentence(sentence: &SentenceSegment, model_tag: &str) -> Self {
        Self {
            start_sec: ms_to_sec(sentence.start_ms),
            end_sec: ms_to_sec(sentence.end_ms),
            speaker_label: sentence.speaker.clone(),
            text: sentence.text.clone(),
            model_tag: model_tag.to_owned(),
            source_id: sentence.source_id,
        }
    }
}

/// Provenance record appended once per processed audio input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationRecord {
    pub user: String,
    pub timestamp_epoch_sec: i64,
    pub comment: String,
}

/// The response shape produced by the alignment orchestrator.
///
/// Always well-formed: under partial or total failure the lists are simply (possibly)
/// empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignResponse {
    pub segments: Vec<AlignedSegment>,
    pub modification_log: Vec<ModificationRecord>,
}
