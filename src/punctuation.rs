//! Punctuation model seam and the process-wide model cache.
//!
//! The punctuation model is external; the aligner only needs "word sequence in,
//! predicted trailing mark per word out". Implementations live behind [`Punctuator`] and
//! are produced by a [`PunctuatorProvider`] keyed by model identifier.
//!
//! Loaded models are the one resource shared across requests, so they sit in a bounded
//! [`PunctuatorCache`]: a map plus a recency list under a mutex, least-recently-used
//! eviction, lazily populated, never invalidated mid-process. The mutex makes
//! get-or-create safe if the host ever runs alignments concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

/// Default capacity of the punctuator cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 3;

/// Default punctuation model identifier.
pub const DEFAULT_PUNCTUATION_MODEL: &str = "kredor/punctuate-all";

/// A loaded punctuation model.
///
/// `predict` returns one optional trailing mark per input word, drawn from `.?!,;:`.
pub trait Punctuator: Send + Sync {
    fn predict(&self, words: &[&str]) -> crate::Result<Vec<Option<char>>>;
}

/// Loads punctuation models by identifier.
pub trait PunctuatorProvider: Send + Sync {
    fn load(&self, model: &str) -> crate::Result<Arc<dyn Punctuator>>;
}

struct CacheState {
    entries: HashMap<String, Arc<dyn Punctuator>>,
    /// Model keys ordered least- to most-recently used.
    recency: Vec<String>,
}

/// Bounded LRU cache of loaded punctuators.
pub struct PunctuatorCache {
    provider: Box<dyn PunctuatorProvider>,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl PunctuatorCache {
    pub fn new(provider: Box<dyn PunctuatorProvider>, capacity: usize) -> Self {
        Self {
            provider,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                recency: Vec::new(),
            }),
        }
    }

    /// Fetch the punctuator for `model`, loading it on first use.
    ///
    /// Eviction happens at insert time: once the cache holds `capacity` models, the
    /// least recently used one is dropped to make room.
    pub fn get_or_load(&self, model: &str) -> crate::Result<Arc<dyn Punctuator>> {
        let mut state = self.state.lock().expect("punctuator cache poisoned");

        if let Some(found) = state.entries.get(model).cloned() {
            debug!(model, "punctuator cache hit");
            touch(&mut state.recency, model);
            return Ok(found);
        }

        info!(model, "loading punctuation model");
        let loaded = self.provider.load(model)?;

        if state.entries.len() >= self.capacity && !state.recency.is_empty() {
            let evicted = state.recency.remove(0);
            state.entries.remove(&evicted);
            info!(model = %evicted, "evicted punctuation model");
        }
        state.entries.insert(model.to_owned(), loaded.clone());
        touch(&mut state.recency, model);

        Ok(loaded)
    }

    #[cfg(test)]
    fn cached_models(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("punctuator cache poisoned")
            .recency
            .clone()
    }
}

fn touch(recency: &mut Vec<String>, model: &str) {
    recency.retain(|m| m != model);
    recency.push(model.to_owned());
}
