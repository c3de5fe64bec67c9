//! Speaker-turn index construction.
//!
//! Diarization output arrives either as in-memory turn records (from the wire or a
//! `Diarizer` collaborator) or as RTTM text. Both paths normalize into a [`TurnIndex`]:
//! a sequence of [`SpeakerTurn`]s sorted ascending by start time, which is the shape the
//! mapper's advancing-cursor merge depends on.
//!
//! A single corrupt RTTM line is logged and dropped, never fatal; one bad record must
//! not abort the whole request.

use tracing::warn;

use crate::types::{RawSpeakerTurn, SpeakerTurn, sec_to_ms};

/// Minimum whitespace-separated fields for a well-formed RTTM line.
const RTTM_MIN_FIELDS: usize = 10;

/// One parsed RTTM record.
///
/// Field layout: `SPEAKER <file> <channel> <onset> <duration> <ortho> <type> <name>
/// <confidence> <lookahead>`. Confidence and lookahead parse `NA` to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RttmLine {
    pub segment_type: String,
    pub channel: u32,
    pub onset_sec: f64,
    pub duration_sec: f64,
    pub speaker: String,
    pub confidence: Option<f32>,
    pub lookahead_sec: Option<f32>,
}

impl RttmLine {
    /// Parse a single RTTM line.
    pub fn parse(line: &str) -> crate::Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < RTTM_MIN_FIELDS {
            return Err(crate::Error::MalformedRttm(format!(
                "expected at least {RTTM_MIN_FIELDS} fields, got {}: '{line}'",
                fields.len()
            )));
        }

        Ok(Self {
            segment_type: fields[0].to_owned(),
            channel: parse_field(fields[2], "channel", line)?,
            onset_sec: parse_field(fields[3], "onset", line)?,
            duration_sec: parse_field(fields[4], "duration", line)?,
            speaker: fields[7].to_owned(),
            confidence: parse_na_field(fields[8]),
            lookahead_sec: parse_na_field(fields[9]),
        })
    }

    fn to_turn(&self) -> SpeakerTurn {
        let start_ms = sec_to_ms(self.onset_sec);
        SpeakerTurn {
            start_ms,
            end_ms: start_ms + sec_to_ms(self.duration_sec),
            speaker: self.speaker.clone(),
        }
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, name: &str, line: &str) -> crate::Result<T> {
    raw.parse().map_err(|_| {
        crate::Error::MalformedRttm(format!("unparseable {name} field '{raw}' in line '{line}'"))
    })
}

fn parse_na_field(raw: &str) -> Option<f32> {
    if raw.contains("NA") {
        return None;
    }
    raw.parse().ok()
}

/// A normalized, queryable sequence of speaker turns, sorted ascending by start time.
#[derive(Debug, Clone, Default)]
pub struct TurnIndex {
    turns: Vec<SpeakerTurn>,
}

impl TurnIndex {
    /// Build from in-memory turns (any order).
    pub fn from_turns(mut turns: Vec<SpeakerTurn>) -> Self {
        turns.sort_by_key(|t| t.start_ms);
        Self { turns }
    }

    /// Build from wire turn records.
    pub fn from_raw(raw: &[RawSpeakerTurn]) -> Self {
        Self::from_turns(raw.iter().map(RawSpeakerTurn::to_turn).collect())
    }

    /// Build from RTTM text, skipping malformed lines.
    ///
    /// Blank lines are ignored; lines that fail to parse are logged at WARN and dropped so
    /// valid lines on either side still contribute.
    pub fn from_rttm(rttm: &str) -> Self {
        let mut turns = Vec::new();
        for line in rttm.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match RttmLine::parse(line) {
                Ok(parsed) => turns.push(parsed.to_turn()),
                Err(err) => warn!(%err, "skipping diarization record"),
            }
        }
        Self::from_turns(turns)
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// The sorted turns.
    pub fn turns(&self) -> &[SpeakerTurn] {
        &self.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_A: &str = "SPEAKER audio 1 0.50 2.00 <NA> <NA> speaker_0 <NA> <NA>";
    const LINE_B: &str = "SPEAKER audio 1 2.50 1.00 <NA> <NA> speaker_1 0.87 <NA>";

    #[test]
    fn parses_standard_rttm_line() -> anyhow::Result<()> {
        let parsed = RttmLine::parse(LINE_A)?;
        assert_eq!(parsed.segment_type, "SPEAKER");
        assert_eq!(parsed.channel, 1);
        assert_eq!(parsed.onset_sec, 0.5);
        assert_eq!(parsed.duration_sec, 2.0);
        assert_eq!(parsed.speaker, "speaker_0");
        assert_eq!(parsed.confidence, None);
        Ok(())
    }

    #[test]
    fn parses_numeric_confidence() -> anyhow::Result<()> {
        let parsed = RttmLine::parse(LINE_B)?;
        assert_eq!(parsed.confidence, Some(0.87));
        Ok(())
    }

    #[test]
    fn short_line_is_malformed() {
        // 7 fields instead of >= 10.
        let err = RttmLine::parse("SPEAKER audio 1 0.50 2.00 <NA> <NA>").unwrap_err();
        assert!(matches!(err, crate::Error::MalformedRttm(_)));
    }

    #[test]
    fn malformed_line_is_skipped_but_neighbors_survive() {
        let rttm = format!("{LINE_A}\nSPEAKER audio 1 0.50 2.00 <NA> <NA>\n{LINE_B}\n");
        let index = TurnIndex::from_rttm(&rttm);
        assert_eq!(index.len(), 2);
        assert_eq!(index.turns()[0].speaker, "speaker_0");
        assert_eq!(index.turns()[1].speaker, "speaker_1");
    }

    #[test]
    fn unparseable_onset_is_skipped() {
        let rttm = "SPEAKER audio 1 bogus 2.00 <NA> <NA> speaker_0 <NA> <NA>";
        assert!(TurnIndex::from_rttm(rttm).is_empty());
    }

    #[test]
    fn index_sorts_by_start_time() {
        let index = TurnIndex::from_turns(vec![
            SpeakerTurn {
                start_ms: 2500,
                end_ms: 3500,
                speaker: "B".into(),
            },
            SpeakerTurn {
                start_ms: 500,
                end_ms: 2500,
                speaker: "A".into(),
            },
        ]);
        assert_eq!(index.turns()[0].speaker, "A");
        assert_eq!(index.turns()[1].speaker, "B");
    }

    #[test]
    fn empty_rttm_yields_empty_index() {
        assert!(TurnIndex::from_rttm("").is_empty());
        assert!(TurnIndex::from_rttm("\n  \n").is_empty());
    }
}
