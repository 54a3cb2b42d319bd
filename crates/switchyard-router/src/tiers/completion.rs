// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiers that ask a language model for the decision (embedded and remote).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use switchyard_core::{
    Arguments, ResolutionTier, RoutingRequest, SwitchyardError, TierDecision, TierId, ToolCatalog,
};

use crate::backend::{CompletionBackend, CompletionPrompt};

const INSTRUCTIONS: &str = "You map a user request to exactly one tool call. \
Reply with a single JSON object and nothing else: \
{\"tool\": <tool name or null>, \"arguments\": {<name>: <value>}, \"confidence\": <0.0-1.0>}. \
Use null for tool when no listed tool fits.";

/// A tier backed by a completion model.
pub struct CompletionTier {
    id: TierId,
    backend: Arc<dyn CompletionBackend>,
    catalog: ToolCatalog,
}

impl CompletionTier {
    pub fn new(id: TierId, backend: Arc<dyn CompletionBackend>, catalog: ToolCatalog) -> Self {
        Self {
            id,
            backend,
            catalog,
        }
    }

    pub fn prompt(&self, request: &RoutingRequest) -> CompletionPrompt {
        let mut system = String::from(INSTRUCTIONS);
        if !self.catalog.is_empty() {
            system.push_str("\n\nAvailable tools:");
            for (name, spec) in self.catalog.iter() {
                system.push_str(&format!("\n- {name}"));
                if !spec.description.is_empty() {
                    system.push_str(&format!(": {}", spec.description));
                }
                if !spec.required_args.is_empty() {
                    system.push_str(&format!(" (required: {})", spec.required_args.join(", ")));
                }
            }
        }

        let user = match &request.context {
            Some(context) => format!("Context: {context}\n\nRequest: {}", request.query),
            None => format!("Request: {}", request.query),
        };
        CompletionPrompt { system, user }
    }
}

#[async_trait]
impl ResolutionTier for CompletionTier {
    fn id(&self) -> TierId {
        self.id
    }

    fn name(&self) -> String {
        format!("{}:{}", self.id, self.backend.name())
    }

    async fn attempt(
        &self,
        request: &RoutingRequest,
    ) -> Result<Option<TierDecision>, SwitchyardError> {
        let text = self.backend.complete(&self.prompt(request)).await?;
        parse_decision(self.id, &text)
    }
}

#[derive(Deserialize)]
struct RawDecision {
    tool: Option<String>,
    #[serde(default)]
    arguments: Arguments,
    confidence: f64,
}

/// Interpret model output as a decision. `tool: null` is a decline.
pub fn parse_decision(tier: TierId, text: &str) -> Result<Option<TierDecision>, SwitchyardError> {
    let parse_error = |message: String| SwitchyardError::ParseError { tier, message };

    let body = strip_fence(text);
    let raw: RawDecision =
        serde_json::from_str(body).map_err(|e| parse_error(format!("not a decision object: {e}")))?;

    let Some(tool) = raw.tool else {
        return Ok(None);
    };
    let tool = tool.trim();
    if tool.is_empty() {
        return Err(parse_error("empty tool name".into()));
    }
    if !(0.0..=1.0).contains(&raw.confidence) {
        return Err(parse_error(format!(
            "confidence {} outside [0, 1]",
            raw.confidence
        )));
    }
    Ok(Some(TierDecision::new(tool, raw.arguments, raw.confidence)))
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
