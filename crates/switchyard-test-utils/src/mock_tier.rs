// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted resolution tier for deterministic router tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use switchyard_core::{
    Arguments, ResolutionTier, RoutingRequest, SwitchyardError, TierDecision, TierId,
};

/// One scripted attempt.
#[derive(Debug, Clone)]
pub enum MockStep {
    Answer { tool: String, confidence: f64 },
    Fail,
    Malformed,
    Decline,
    /// Sleep, then play the inner step.
    Delay(Duration, Box<MockStep>),
}

impl MockStep {
    pub fn answer(tool: &str, confidence: f64) -> Self {
        Self::Answer {
            tool: tool.to_string(),
            confidence,
        }
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delay(delay, Box::new(self))
    }
}

/// A tier that plays steps from a FIFO queue.
///
/// When the queue is empty the fallback step (a decline unless set) repeats.
pub struct MockTier {
    id: TierId,
    steps: Arc<Mutex<VecDeque<MockStep>>>,
    fallback: MockStep,
    attempts: AtomicUsize,
}

impl MockTier {
    pub fn new(id: TierId) -> Self {
        Self {
            id,
            steps: Arc::new(Mutex::new(VecDeque::new())),
            fallback: MockStep::Decline,
            attempts: AtomicUsize::new(0),
        }
    }

    /// A tier that always plays `step`.
    pub fn always(id: TierId, step: MockStep) -> Self {
        Self {
            fallback: step,
            ..Self::new(id)
        }
    }

    pub fn with_steps(id: TierId, steps: Vec<MockStep>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(VecDeque::from(steps))),
            ..Self::new(id)
        }
    }

    pub async fn push_step(&self, step: MockStep) {
        self.steps.lock().await.push_back(step);
    }

    /// Attempts started so far, including ones still in flight.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn next_step(&self) -> MockStep {
        self.steps
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl ResolutionTier for MockTier {
    fn id(&self) -> TierId {
        self.id
    }

    fn name(&self) -> String {
        format!("mock-{}", self.id)
    }

    async fn attempt(
        &self,
        _request: &RoutingRequest,
    ) -> Result<Option<TierDecision>, SwitchyardError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let mut step = self.next_step().await;
        while let MockStep::Delay(delay, inner) = step {
            tokio::time::sleep(delay).await;
            step = *inner;
        }
        match step {
            MockStep::Answer { tool, confidence } => {
                Ok(Some(TierDecision::new(tool, Arguments::new(), confidence)))
            }
            MockStep::Fail => Err(SwitchyardError::TierUnavailable {
                tier: self.id,
                message: "scripted failure".into(),
            }),
            MockStep::Malformed => Err(SwitchyardError::ParseError {
                tier: self.id,
                message: "scripted garbage".into(),
            }),
            MockStep::Decline | MockStep::Delay(..) => Ok(None),
        }
    }
}
