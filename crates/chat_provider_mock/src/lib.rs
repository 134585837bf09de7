//! Deterministic mock implementation of the shared `chat_provider` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level testing of the session coordinator: call
//! outcomes are scripted up front and every request is captured for
//! inspection. The empty-key short-circuit of the real transport is
//! honored so credential flows can be exercised without a network.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chat_provider::{
    AskRequest, ChatError, ChatProvider, FixRequest, ProviderProfile,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

const DEFAULT_RESPONSE: &str = "Mocked CoDa reply: everything looks good so far. \
Share a snippet and I will walk through it step by step.";

/// Scripted mock provider used by host tests and local runs.
pub struct MockChatProvider {
    model_ids: Vec<String>,
    outcomes: Mutex<VecDeque<Result<String, ChatError>>>,
    asks: Mutex<Vec<AskRequest>>,
    fixes: Mutex<Vec<FixRequest>>,
}

impl MockChatProvider {
    /// Creates a mock provider with caller-scripted outcomes, served in
    /// order. When the script runs dry the default canned reply is served.
    #[must_use]
    pub fn new(outcomes: Vec<Result<String, ChatError>>) -> Self {
        Self {
            model_ids: vec!["mock".to_string(), "mock-alt".to_string()],
            outcomes: Mutex::new(outcomes.into()),
            asks: Mutex::new(Vec::new()),
            fixes: Mutex::new(Vec::new()),
        }
    }

    /// Appends one scripted outcome to the queue.
    pub fn enqueue(&self, outcome: Result<String, ChatError>) {
        lock_unpoisoned(&self.outcomes).push_back(outcome);
    }

    /// Returns every captured ask request in submission order.
    #[must_use]
    pub fn captured_asks(&self) -> Vec<AskRequest> {
        lock_unpoisoned(&self.asks).clone()
    }

    /// Returns every captured fix request in submission order.
    #[must_use]
    pub fn captured_fixes(&self) -> Vec<FixRequest> {
        lock_unpoisoned(&self.fixes).clone()
    }

    fn next_outcome(&self) -> Result<String, ChatError> {
        lock_unpoisoned(&self.outcomes)
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_RESPONSE.to_string()))
    }
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: self.model_ids[0].clone(),
        }
    }

    fn model_ids(&self) -> Vec<String> {
        self.model_ids.clone()
    }

    async fn ask(&self, req: AskRequest) -> Result<String, ChatError> {
        if req.api_key.trim().is_empty() {
            lock_unpoisoned(&self.asks).push(req);
            return Err(ChatError::MissingCredential);
        }

        lock_unpoisoned(&self.asks).push(req);
        self.next_outcome()
    }

    async fn fix(&self, req: FixRequest) -> Result<String, ChatError> {
        if req.api_key.trim().is_empty() {
            lock_unpoisoned(&self.fixes).push(req);
            return Err(ChatError::MissingCredential);
        }

        lock_unpoisoned(&self.fixes).push(req);
        self.next_outcome()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
