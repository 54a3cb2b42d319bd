// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assemble a router from configuration.

use std::sync::Arc;

use switchyard_config::model::SwitchyardConfig;
use switchyard_core::{SwitchyardError, TierId};
use switchyard_model::ServingSlot;
use tracing::{debug, info};

use crate::backend::HttpCompletionBackend;
use crate::router::Router;
use crate::tiers::{CompletionTier, FallbackTier, TrainedTier};

/// Build the serving router: tiers in `router.tier_order`, disabled tiers and
/// completion tiers without an endpoint left out, the trained tier reading
/// from `slot`.
pub fn build_router(
    config: &SwitchyardConfig,
    slot: ServingSlot,
) -> Result<Router, SwitchyardError> {
    let catalog = config.catalog.to_catalog();
    let mut router = Router::new(catalog.clone());

    for &tier in &config.router.tier_order {
        let settings = config.router.tiers.get(tier).clone();
        if !settings.enabled {
            debug!(tier = %tier, "tier disabled");
            continue;
        }
        match tier {
            TierId::Embedded | TierId::Remote => {
                let endpoint = if tier == TierId::Embedded {
                    &config.embedded
                } else {
                    &config.remote
                };
                if endpoint.endpoint.is_none() {
                    debug!(tier = %tier, "no endpoint configured, tier skipped");
                    continue;
                }
                let backend = HttpCompletionBackend::new(tier, endpoint)?;
                router.push_tier(
                    Arc::new(CompletionTier::new(tier, Arc::new(backend), catalog.clone())),
                    settings,
                );
            }
            TierId::Pattern => {
                router.push_tier(Arc::new(TrainedTier::serving(slot.clone())), settings);
            }
            TierId::Fallback => {
                router.push_tier(Arc::new(FallbackTier::from_config(&config.fallback)?), settings);
            }
        }
    }

    info!(tiers = ?router.tier_order(), "router assembled");
    Ok(router)
}

#[cfg(test)]
mod tests {
    use switchyard_config::load_config_from_str;
    use switchyard_model::empty_slot;

    use super::*;

    #[test]
    fn tiers_without_endpoints_are_skipped() {
        let config = load_config_from_str("").unwrap();
        let router = build_router(&config, empty_slot()).unwrap();
        assert_eq!(router.tier_order(), vec![TierId::Pattern, TierId::Fallback]);
    }

    #[test]
    fn order_and_enablement_follow_config() {
        let config = load_config_from_str(
            r#"
[router]
tier_order = ["fallback", "remote", "pattern"]

[router.tiers.pattern]
enabled = false
min_confidence = 0.6
timeout_ms = 100

[remote]
endpoint = "http://127.0.0.1:9"
"#,
        )
        .unwrap();
        let router = build_router(&config, empty_slot()).unwrap();
        assert_eq!(router.tier_order(), vec![TierId::Fallback, TierId::Remote]);
    }
}
