//! High-level API for running speaker-text alignment.
//!
//! We expose a single entry point (`Aligner`) that wires together the lower-level
//! pieces: turn-index construction, word-speaker mapping, punctuation-guided
//! realignment, and sentence aggregation.
//!
//! The intent is:
//! - Construct once, with whatever model collaborators the deployment has.
//! - Call `process` per request; every call is self-contained.
//! - Per-item failures are contained: one bad audio item is logged and skipped, its
//!   siblings still produce output, and the response is always well-formed.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::backend::{Asr, Diarizer, ModelContext};
use crate::mapping::map_words_to_speakers;
use crate::opts::{AlignOpts, OutputGranularity, resolve_language};
use crate::punctuation::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_PUNCTUATION_MODEL, Punctuator, PunctuatorCache,
    PunctuatorProvider,
};
use crate::realign::{
    MAX_WORDS_PER_SENTENCE, apply_predicted_punctuation, realign_speaker_boundaries,
};
use crate::scratch::ScratchDir;
use crate::sentences::aggregate_sentences;
use crate::turns::TurnIndex;
use crate::types::{
    AlignItem, AlignRequest, AlignResponse, AlignedSegment, ModificationRecord, RawWord,
    WordTimestamp,
};

/// The annotator identity stamped into provenance output.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub name: String,
    pub version: String,
}

impl Default for ServiceIdentity {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// The alignment orchestrator.
///
/// Owns the long-lived resources: the service identity, optional model collaborators,
/// and the bounded punctuator cache (the only state shared across requests).
pub struct Aligner {
    identity: ServiceIdentity,
    diarizer: Option<Box<dyn Diarizer>>,
    asr: Option<Box<dyn Asr>>,
    punctuators: Option<PunctuatorCache>,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(ServiceIdentity::default())
    }
}

impl Aligner {
    /// Create an aligner with no model collaborators.
    ///
    /// Fully functional for requests that supply diarization turns and ASR words
    /// directly; punctuation correction degrades to pass-through.
    pub fn new(identity: ServiceIdentity) -> Self {
        Self {
            identity,
            diarizer: None,
            asr: None,
            punctuators: None,
        }
    }

    /// Attach a diarization collaborator, used for items that carry audio but no turns.
    pub fn with_diarizer(mut self, diarizer: Box<dyn Diarizer>) -> Self {
        self.diarizer = Some(diarizer);
        self
    }

    /// Attach an ASR collaborator, used for items that carry audio but no words.
    pub fn with_asr(mut self, asr: Box<dyn Asr>) -> Self {
        self.asr = Some(asr);
        self
    }

    /// Attach a punctuation model provider behind a bounded LRU cache.
    pub fn with_punctuator_provider(
        mut self,
        provider: Box<dyn PunctuatorProvider>,
        capacity: usize,
    ) -> Self {
        self.punctuators = Some(PunctuatorCache::new(provider, capacity));
        self
    }

    /// Attach a punctuation model provider with the default cache capacity.
    pub fn with_default_punctuator_cache(self, provider: Box<dyn PunctuatorProvider>) -> Self {
        self.with_punctuator_provider(provider, DEFAULT_CACHE_CAPACITY)
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    /// Deterministic identifier of the models/config a request's output was produced
    /// with.
    pub fn model_tag(&self, opts: &AlignOpts) -> String {
        let punctuation = if opts.use_punctuation {
            opts.punctuation_model
                .as_deref()
                .unwrap_or(DEFAULT_PUNCTUATION_MODEL)
        } else {
            "none"
        };

        let mut parts = vec![
            format!("{}-{}", self.identity.name, self.identity.version),
            opts.domain.as_str().to_owned(),
            opts.anchor.as_str().to_owned(),
            punctuation.to_owned(),
        ];
        if let Some(diarizer) = &self.diarizer {
            parts.push(diarizer.model_id().to_owned());
        }
        if let Some(asr) = &self.asr {
            parts.push(asr.model_id().to_owned());
        }
        parts.join("__")
    }

    /// Process one alignment request.
    ///
    /// Never fails: items are processed strictly sequentially, a failing item is logged
    /// and excluded from the output, and the response is well-formed even when every
    /// item failed.
    pub fn process(&self, request: &AlignRequest) -> AlignResponse {
        let request_started = epoch_seconds();
        let opts = AlignOpts::from_request(request);
        let model_tag = self.model_tag(&opts);

        let mut segments = Vec::new();
        let mut modification_log = Vec::new();

        for (index, item) in request.items.iter().enumerate() {
            match self.align_item(item, &opts, &model_tag) {
                Ok(mut item_segments) => {
                    info!(item = index, segments = item_segments.len(), "aligned item");
                    segments.append(&mut item_segments);
                    modification_log.push(ModificationRecord {
                        user: self.identity.name.clone(),
                        timestamp_epoch_sec: request_started,
                        comment: format!(
                            "{} ({}), {model_tag}",
                            self.identity.name, self.identity.version
                        ),
                    });
                }
                Err(err) => {
                    error!(item = index, %err, "item failed; continuing with remaining items");
                }
            }
        }

        AlignResponse {
            segments,
            modification_log,
        }
    }

    /// Align a single audio item.
    pub fn align_item(
        &self,
        item: &AlignItem,
        opts: &AlignOpts,
        model_tag: &str,
    ) -> crate::Result<Vec<AlignedSegment>> {
        let lang = resolve_language(opts.language.as_deref());

        let words: Vec<WordTimestamp> = if item.words.is_empty() {
            match &item.audio {
                Some(_) => self.transcribe_item(item, lang, opts)?,
                None => Vec::new(),
            }
        } else {
            item.words.iter().map(RawWord::to_word).collect()
        };

        // Nothing to align; skip diarization entirely.
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let turn_index = if item.speaker_turns.is_empty() {
            self.diarize_item(item, lang, opts)?
        } else {
            TurnIndex::from_raw(&item.speaker_turns)
        };

        let mut mapping = map_words_to_speakers(&words, &turn_index, opts.anchor)?;

        if opts.use_punctuation {
            match self.punctuator_for(opts) {
                Ok(punctuator) => {
                    let texts: Vec<&str> = mapping.iter().map(|e| e.word.as_str()).collect();
                    match punctuator.predict(&texts) {
                        Ok(predictions) => {
                            apply_predicted_punctuation(&mut mapping, &predictions);
                            realign_speaker_boundaries(&mut mapping, MAX_WORDS_PER_SENTENCE);
                        }
                        Err(err) => {
                            warn!(%err, "punctuation prediction failed; keeping diarization boundaries");
                        }
                    }
                }
                Err(err) => {
                    warn!(%err, "punctuation model unavailable; keeping diarization boundaries");
                }
            }
        }

        let segments = match opts.granularity {
            OutputGranularity::Words => mapping
                .iter()
                .map(|entry| AlignedSegment::from_word(entry, model_tag))
                .collect(),
            OutputGranularity::Sentences => aggregate_sentences(&mapping)
                .iter()
                .map(|sentence| AlignedSegment::from_sentence(sentence, model_tag))
                .collect(),
        };

        Ok(segments)
    }

    fn diarize_item(
        &self,
        item: &AlignItem,
        lang: &str,
        opts: &AlignOpts,
    ) -> crate::Result<TurnIndex> {
        let Some(payload) = &item.audio else {
            return Err(crate::Error::msg(
                "item carries neither speaker turns nor audio to diarize",
            ));
        };
        let Some(diarizer) = &self.diarizer else {
            return Err(crate::Error::ModelUnavailable(
                "no diarizer configured".into(),
            ));
        };

        let audio = crate::audio::decode_payload(payload)?;
        let scratch = ScratchDir::new()?;
        let cx = ModelContext {
            lang,
            domain: opts.domain,
            scratch: &scratch,
        };
        let turns = diarizer.diarize(&audio, &cx)?;
        Ok(TurnIndex::from_turns(turns))
    }

    fn transcribe_item(
        &self,
        item: &AlignItem,
        lang: &str,
        opts: &AlignOpts,
    ) -> crate::Result<Vec<WordTimestamp>> {
        // Callers check for audio before dispatching here.
        let Some(payload) = &item.audio else {
            return Ok(Vec::new());
        };
        let Some(asr) = &self.asr else {
            return Err(crate::Error::ModelUnavailable(
                "no ASR model configured".into(),
            ));
        };

        let audio = crate::audio::decode_payload(payload)?;
        let scratch = ScratchDir::new()?;
        let cx = ModelContext {
            lang,
            domain: opts.domain,
            scratch: &scratch,
        };
        asr.transcribe(&audio, &cx)
    }

    fn punctuator_for(&self, opts: &AlignOpts) -> crate::Result<Arc<dyn Punctuator>> {
        let cache = self.punctuators.as_ref().ok_or_else(|| {
            crate::Error::ModelUnavailable("no punctuation model provider configured".into())
        })?;
        let model = opts
            .punctuation_model
            .as_deref()
            .unwrap_or(DEFAULT_PUNCTUATION_MODEL);
        cache.get_or_load(model)
    }
}

impl AlignOpts {
    /// Map a wire request into library options. Anchor policy stays at its default; the
    /// wire does not expose it.
    pub fn from_request(request: &AlignRequest) -> Self {
        Self {
            use_punctuation: request.use_punctuation,
            granularity: OutputGranularity::from_word_level_flag(request.word_level_output),
            anchor: Default::default(),
            language: request.lang.clone(),
            domain: crate::opts::Domain::resolve(request.domain.as_deref()),
            punctuation_model: request.punctuation_model.clone(),
        }
    }
}

fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
