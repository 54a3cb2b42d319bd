// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchyard resolve` command implementation.

use switchyard_config::model::SwitchyardConfig;
use switchyard_core::{RoutingRequest, RoutingResult, SwitchyardError};
use switchyard_router::build_router;

use crate::lifecycle::open_version_control;

/// Resolve one request against the production artifact and print the result
/// as JSON. Exits successfully even when no tier resolved the request.
pub async fn run_resolve(
    config: &SwitchyardConfig,
    request: RoutingRequest,
) -> Result<RoutingResult, SwitchyardError> {
    let version_control = open_version_control(config).await?;
    let router = build_router(config, version_control.slot())?;

    let result = router.resolve(&request).await;
    let rendered = serde_json::to_string_pretty(&result)
        .map_err(|e| SwitchyardError::Internal(format!("failed to render result: {e}")))?;
    println!("{rendered}");
    Ok(result)
}
