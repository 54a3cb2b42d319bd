// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Last-resort keyword tier.
//!
//! Rules are checked in order against the normalized query; a keyword
//! matches on word boundaries only. Confidence is a fixed low band: 0.45 on a
//! rule match and 0.3 for the default tool unless configured otherwise.

use async_trait::async_trait;
use regex::Regex;
use switchyard_config::model::FallbackConfig;
use switchyard_core::text::normalize_query;
use switchyard_core::{
    Arguments, ResolutionTier, RoutingRequest, SwitchyardError, TierDecision, TierId,
};

/// One compiled keyword rule.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    tool: String,
    keywords: Vec<String>,
    arguments: Vec<(String, Regex)>,
}

impl KeywordRule {
    pub fn new(tool: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            tool: tool.into(),
            keywords: keywords
                .iter()
                .map(|k| normalize_query(k))
                .filter(|k| !k.is_empty())
                .collect(),
            arguments: Vec::new(),
        }
    }

    /// Fill `name` from the named capture `value` of `pattern`.
    pub fn with_argument(
        mut self,
        name: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, SwitchyardError> {
        let regex = Regex::new(pattern).map_err(|e| {
            SwitchyardError::Config(format!("invalid argument pattern {pattern:?}: {e}"))
        })?;
        if !regex.capture_names().flatten().any(|n| n == "value") {
            return Err(SwitchyardError::Config(format!(
                "argument pattern {pattern:?} has no `value` capture"
            )));
        }
        self.arguments.push((name.into(), regex));
        Ok(self)
    }

    fn matches(&self, padded_query: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| padded_query.contains(&format!(" {k} ")))
    }

    fn extract(&self, query: &str) -> Arguments {
        self.arguments
            .iter()
            .filter_map(|(name, regex)| {
                let value = regex.captures(query)?.name("value")?.as_str().to_string();
                Some((name.clone(), serde_json::Value::String(value)))
            })
            .collect()
    }
}

/// Keyword rules with an optional default tool.
#[derive(Debug, Clone)]
pub struct FallbackTier {
    rules: Vec<KeywordRule>,
    default_tool: Option<String>,
    confidence: f64,
    match_confidence: f64,
}

impl FallbackTier {
    pub fn new(rules: Vec<KeywordRule>, default_tool: Option<String>) -> Self {
        let defaults = FallbackConfig::default();
        Self {
            rules,
            default_tool,
            confidence: defaults.confidence,
            match_confidence: defaults.match_confidence,
        }
    }

    pub fn from_config(config: &FallbackConfig) -> Result<Self, SwitchyardError> {
        let rules = config
            .rules
            .iter()
            .map(|rule| {
                let keywords: Vec<&str> = rule.keywords.iter().map(String::as_str).collect();
                rule.arguments.iter().try_fold(
                    KeywordRule::new(&rule.tool, &keywords),
                    |built, (name, pattern)| built.with_argument(name, pattern),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            default_tool: config.default_tool.clone(),
            confidence: config.confidence,
            match_confidence: config.match_confidence,
        })
    }
}

#[async_trait]
impl ResolutionTier for FallbackTier {
    fn id(&self) -> TierId {
        TierId::Fallback
    }

    async fn attempt(
        &self,
        request: &RoutingRequest,
    ) -> Result<Option<TierDecision>, SwitchyardError> {
        let padded = format!(" {} ", normalize_query(&request.query));
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&padded)) {
            return Ok(Some(TierDecision::new(
                rule.tool.clone(),
                rule.extract(&request.query),
                self.match_confidence,
            )));
        }

        Ok(self
            .default_tool
            .as_ref()
            .map(|tool| TierDecision::new(tool.clone(), Arguments::new(), self.confidence)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tier() -> FallbackTier {
        FallbackTier::new(
            vec![
                KeywordRule::new("list_dir", &["list files", "show directory"])
                    .with_argument("path", r"in (?P<value>\S+)")
                    .unwrap(),
                KeywordRule::new("post_social", &["tweet", "post"]),
            ],
            Some("chat".into()),
        )
    }

    #[tokio::test]
    async fn first_matching_rule_wins_with_captured_argument() {
        let decision = tier()
            .attempt(&RoutingRequest::new("Please LIST FILES in Reports/2024"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decision.tool_name, "list_dir");
        assert_eq!(decision.arguments["path"], json!("Reports/2024"));
        assert_eq!(decision.confidence, 0.45);
    }

    #[tokio::test]
    async fn keywords_match_whole_words_only() {
        let decision = tier()
            .attempt(&RoutingRequest::new("read the postmortem"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decision.tool_name, "chat");
        assert_eq!(decision.confidence, 0.3);
    }

    #[tokio::test]
    async fn no_default_tool_declines() {
        let tier = FallbackTier::new(vec![KeywordRule::new("post_social", &["tweet"])], None);
        assert!(tier
            .attempt(&RoutingRequest::new("hello there"))
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn pattern_without_value_capture_is_rejected() {
        let err = KeywordRule::new("x", &["y"]).with_argument("path", r"in (\S+)").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[tokio::test]
    async fn builds_from_config() {
        let config: FallbackConfig = toml::from_str(
            r#"
default_tool = "chat"
confidence = 0.35

[[rules]]
tool = "send_email"
keywords = ["email", "mail"]
arguments = { to = 'to (?P<value>\S+@\S+)' }
"#,
        )
        .unwrap();
        let tier = FallbackTier::from_config(&config).unwrap();
        let decision = tier
            .attempt(&RoutingRequest::new("email the report to ops@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(decision.tool_name, "send_email");
        assert_eq!(decision.arguments["to"], json!("ops@example.com"));

        let decision = tier.attempt(&RoutingRequest::new("hmm")).await.unwrap().unwrap();
        assert_eq!(decision.confidence, 0.35);
    }
}
