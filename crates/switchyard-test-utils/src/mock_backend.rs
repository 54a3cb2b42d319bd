// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion backend for the embedded and remote tiers.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use switchyard_core::{SwitchyardError, TierId};
use switchyard_router::{CompletionBackend, CompletionPrompt};

/// Replies popped from a FIFO queue. When the queue is empty the backend
/// declines. Transport failures are reported against `tier` (remote unless
/// built with [`MockBackend::for_tier`]).
pub struct MockBackend {
    tier: TierId,
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<CompletionPrompt>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::for_tier(TierId::Remote)
    }

    pub fn for_tier(tier: TierId) -> Self {
        Self {
            tier,
            replies: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(Ok).collect())),
            ..Self::new()
        }
    }

    pub async fn add_reply(&self, text: impl Into<String>) {
        self.replies.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a transport failure.
    pub async fn add_failure(&self, message: impl Into<String>) {
        self.replies.lock().await.push_back(Err(message.into()));
    }

    /// Prompts received so far.
    pub async fn prompts(&self) -> Vec<CompletionPrompt> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock-backend"
    }

    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, SwitchyardError> {
        self.prompts.lock().await.push(prompt.clone());
        match self.replies.lock().await.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(SwitchyardError::TierUnavailable {
                tier: self.tier,
                message,
            }),
            None => Ok(r#"{"tool": null, "confidence": 0.0}"#.to_string()),
        }
    }
}
