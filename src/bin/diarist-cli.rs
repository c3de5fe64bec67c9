use std::fs;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::Parser;

use diarist::opts::OutputGranularity;
use diarist::turns::TurnIndex;
use diarist::types::{AlignItem, AlignRequest, RawSpeakerTurn, RawWord};
use diarist::Aligner;

/// Align an ASR word-timestamp file against a diarization RTTM file, offline.
#[derive(Parser, Debug)]
#[command(name = "diarist")]
#[command(about = "A speaker-text alignment CLI")]
struct Params {
    /// Path to the diarization output (RTTM).
    #[arg(short = 'r', long = "rttm")]
    pub rttm_path: String,

    /// Path to the ASR word timestamps (JSON array of {startSec, endSec, text}).
    #[arg(short = 'w', long = "words")]
    pub words_path: String,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputGranularity::Sentences
    )]
    pub output_type: OutputGranularity,
}

fn main() -> Result<()> {
    diarist::logging::init();
    let params = Params::parse();

    let rttm = fs::read_to_string(&params.rttm_path)
        .with_context(|| format!("failed to read RTTM file '{}'", params.rttm_path))?;
    let words_json = fs::read_to_string(&params.words_path)
        .with_context(|| format!("failed to read words file '{}'", params.words_path))?;
    let words: Vec<RawWord> =
        serde_json::from_str(&words_json).context("words file is not a JSON word array")?;

    let speaker_turns = TurnIndex::from_rttm(&rttm)
        .turns()
        .iter()
        .map(|turn| RawSpeakerTurn {
            onset_sec: turn.start_ms as f64 / 1000.0,
            duration_sec: (turn.end_ms - turn.start_ms) as f64 / 1000.0,
            speaker_label: turn.speaker.clone(),
            source_id: 0,
        })
        .collect();

    let request = AlignRequest {
        items: vec![AlignItem {
            audio: None,
            speaker_turns,
            words,
        }],
        use_punctuation: false,
        word_level_output: params.output_type == OutputGranularity::Words,
        lang: None,
        domain: None,
        punctuation_model: None,
    };

    let response = Aligner::default().process(&request);

    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(writer, &response.segments)?;
    println!();
    Ok(())
}
