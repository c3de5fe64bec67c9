//! `diarist` — word-to-speaker alignment and re-segmentation for speech pipelines.
//!
//! This crate provides:
//! - Speaker-turn index construction from diarization output (including RTTM text)
//! - Word-to-speaker mapping over independently produced ASR word timestamps
//! - Punctuation-guided realignment of speaker boundaries
//! - Sentence-level aggregation of the aligned transcript
//! - A request orchestrator with per-item failure containment
//!
//! The library is designed to be used by both CLI tools and long-running services. The
//! neural models involved (diarization, ASR, punctuation) stay behind trait seams; the
//! crate itself binds no model runtime.

// High-level API (most consumers should start here).
pub mod aligner;
pub mod opts;

// Core alignment stages, in pipeline order.
pub mod turns;
pub mod mapping;
pub mod realign;
pub mod sentences;

// Data model: core (milliseconds) and wire (seconds, camelCase JSON) types.
pub mod types;

// Model collaborator seams and supporting resources.
pub mod backend;
pub mod punctuation;
pub mod audio;
pub mod scratch;

// Crate-wide error type.
pub mod error;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use aligner::{Aligner, ServiceIdentity};
pub use error::{Error, Result};
pub use opts::{AlignOpts, OutputGranularity};
pub use types::{AlignRequest, AlignResponse};
