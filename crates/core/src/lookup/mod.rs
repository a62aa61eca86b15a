//! Definition lookup over a pluggable upstream source.
//!
//! `DictionaryClient` owns the decision logic: top-voted selection for a word
//! and the bounded threshold search for random words. The upstream transport
//! sits behind `DefinitionSource` so handlers and tests can swap it out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::candidate::{first_above_threshold, select_top_voted, DefinitionCandidate};
use crate::errors::LookupError;
use crate::retry::RetryPolicy;

pub const DEFAULT_RANDOM_THRESHOLD: i64 = 13_000;

#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Candidates the upstream knows for `term`.
    async fn define(&self, term: &str) -> Result<Vec<DefinitionCandidate>, LookupError>;

    /// One batch of random candidates.
    async fn random(&self) -> Result<Vec<DefinitionCandidate>, LookupError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomWordPolicy {
    pub threshold: i64,
    pub retry: RetryPolicy,
}

impl Default for RandomWordPolicy {
    fn default() -> Self {
        Self { threshold: DEFAULT_RANDOM_THRESHOLD, retry: RetryPolicy::default() }
    }
}

#[derive(Clone)]
pub struct DictionaryClient {
    source: Arc<dyn DefinitionSource>,
    random_policy: RandomWordPolicy,
}

impl DictionaryClient {
    pub fn new(source: Arc<dyn DefinitionSource>, random_policy: RandomWordPolicy) -> Self {
        Self { source, random_policy }
    }

    pub fn random_policy(&self) -> &RandomWordPolicy {
        &self.random_policy
    }

    /// Top-voted definition for `word`.
    pub async fn define(&self, word: &str) -> Result<DefinitionCandidate, LookupError> {
        let term = word.trim();
        if term.is_empty() {
            return Err(LookupError::NotFound { term: String::new() });
        }

        let candidates = self.source.define(term).await?;
        debug!(
            event_name = "lookup.define.candidates",
            term,
            candidate_count = candidates.len(),
            "upstream returned definition candidates"
        );

        select_top_voted(&candidates)
            .cloned()
            .ok_or_else(|| LookupError::NotFound { term: term.to_owned() })
    }

    /// Random word whose approval count clears the configured threshold.
    ///
    /// Upstream errors abort immediately; only batches without a qualifying
    /// candidate are retried.
    pub async fn random_word(&self) -> Result<DefinitionCandidate, LookupError> {
        let RandomWordPolicy { threshold, retry } = &self.random_policy;

        for attempt in 0..=retry.max_retries {
            let candidates = self.source.random().await?;
            if let Some(candidate) = first_above_threshold(&candidates, *threshold) {
                debug!(
                    event_name = "lookup.random.accepted",
                    attempt,
                    word = %candidate.word,
                    approval_count = candidate.approval_count,
                    "random candidate cleared threshold"
                );
                return Ok(candidate.clone());
            }

            debug!(
                event_name = "lookup.random.rejected_batch",
                attempt,
                threshold,
                candidate_count = candidates.len(),
                "no random candidate cleared threshold"
            );

            if attempt < retry.max_retries {
                let delay = retry.backoff(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let attempts = retry.max_attempts();
        warn!(
            event_name = "lookup.random.exhausted",
            attempts,
            threshold,
            "random word retries exhausted"
        );
        Err(LookupError::RetriesExhausted { attempts, threshold: *threshold })
    }
}
