//! Library-level alignment options.
//!
//! This struct represents *library-level configuration*, not the wire request directly.
//! The server maps incoming requests into this type so that:
//! - the library remains reusable outside of an HTTP context
//! - other frontends (CLIs, tests, batch jobs) can construct options programmatically

use tracing::warn;

use crate::mapping::AnchorPolicy;

/// Languages the underlying model family supports.
pub const SUPPORTED_LANGUAGES: &[&str] = &["de", "en", "es"];

/// Fallback when a request names an unsupported language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Resolve a requested language against the supported set.
///
/// Unsupported values fall back to [`DEFAULT_LANGUAGE`] with a warning rather than
/// failing the request.
pub fn resolve_language(requested: Option<&str>) -> &'static str {
    let Some(raw) = requested else {
        return DEFAULT_LANGUAGE;
    };
    match SUPPORTED_LANGUAGES.iter().copied().find(|l| *l == raw) {
        Some(lang) => lang,
        None => {
            warn!(requested = raw, fallback = DEFAULT_LANGUAGE, "unsupported language");
            DEFAULT_LANGUAGE
        }
    }
}

/// Diarization domain profile, selecting the tuning the diarizer runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Domain {
    General,
    #[default]
    Meeting,
    Telephonic,
}

impl Domain {
    /// Resolve a requested domain, falling back to [`Domain::Meeting`] with a warning.
    pub fn resolve(requested: Option<&str>) -> Self {
        let Some(raw) = requested else {
            return Self::default();
        };
        match raw {
            "general" => Self::General,
            "meeting" => Self::Meeting,
            "telephonic" => Self::Telephonic,
            other => {
                warn!(requested = other, fallback = "meeting", "unsupported domain");
                Self::default()
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Meeting => "meeting",
            Self::Telephonic => "telephonic",
        }
    }
}

/// The granularity of emitted segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputGranularity {
    /// One segment per word.
    Words,

    /// One segment per sentence-level speaker turn.
    #[default]
    Sentences,
}

impl OutputGranularity {
    pub fn from_word_level_flag(word_level: bool) -> Self {
        if word_level { Self::Words } else { Self::Sentences }
    }
}

/// Options that control how one alignment request is performed.
#[derive(Debug, Clone, Default)]
pub struct AlignOpts {
    /// Apply punctuation-guided realignment when a punctuation model is available.
    pub use_punctuation: bool,

    /// Word- or sentence-level output.
    pub granularity: OutputGranularity,

    /// Which point of a word's interval anchors it to a speaker turn.
    pub anchor: AnchorPolicy,

    /// Requested language (resolved against the supported set at use time).
    pub language: Option<String>,

    /// Diarization domain profile.
    pub domain: Domain,

    /// Punctuation model identifier; `None` selects the default model.
    pub punctuation_model: Option<String>,
}
