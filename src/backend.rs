//! Black-box model collaborator seams.
//!
//! The aligner never talks to a neural runtime directly. Diarization and ASR are
//! supplied by implementations of the traits below (an in-process binding, a subprocess
//! wrapper around an external tool, a remote call; the aligner does not care). What it
//! guarantees in return: collaborators are invoked once per audio item, sequentially,
//! with a scratch directory that is theirs alone for the duration of the call.

use crate::audio::AudioData;
use crate::opts::Domain;
use crate::scratch::ScratchDir;
use crate::types::{SpeakerTurn, WordTimestamp};

/// Per-invocation context handed to model collaborators.
pub struct ModelContext<'a> {
    /// Resolved language code (already validated against the supported set).
    pub lang: &'a str,
    /// Diarization domain profile.
    pub domain: Domain,
    /// Scratch directory scoped to this audio item; removed when the item finishes.
    pub scratch: &'a ScratchDir,
}

/// A diarization model: audio in, speaker turns out.
pub trait Diarizer: Send + Sync {
    fn diarize(&self, audio: &AudioData, cx: &ModelContext<'_>)
    -> crate::Result<Vec<SpeakerTurn>>;

    /// Stable identifier folded into output model tags.
    fn model_id(&self) -> &str;
}

/// An ASR model: audio in, word timestamps out.
pub trait Asr: Send + Sync {
    fn transcribe(
        &self,
        audio: &AudioData,
        cx: &ModelContext<'_>,
    ) -> crate::Result<Vec<WordTimestamp>>;

    /// Stable identifier folded into output model tags.
    fn model_id(&self) -> &str;
}
