//! Endpoint resolution.

use agentctl_core::descriptor::ServiceInfo;
use anyhow::{bail, Result};

/// Configured override if any, otherwise the regional endpoint.
pub fn resolve_endpoint(
    service: &ServiceInfo,
    endpoint_url: Option<&str>,
    region: Option<&str>,
) -> Result<String> {
    if let Some(url) = endpoint_url {
        return Ok(url.trim_end_matches('/').to_string());
    }
    match region {
        Some(region) => Ok(service.regional_endpoint(region)),
        None => bail!(
            "no region configured; pass --region or set AWS_REGION (or aws.region in the config file)"
        ),
    }
}
