// Configuration validation
//
// Rejects values that would only fail later, at request time

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

const MAX_PAGE_SIZE: u32 = 1000;

pub fn validate_config(config: &ClientConfig) -> Result<()> {
    validate_aws_config(&config.aws)?;
    validate_log_config(&config.log)?;
    validate_paging_config(&config.paging)?;
    Ok(())
}

fn validate_aws_config(config: &AwsConfig) -> Result<()> {
    if let Some(region) = &config.region {
        if region.trim().is_empty() {
            bail!("aws.region must not be empty");
        }
        if region.contains(char::is_whitespace) || region.contains('/') {
            bail!("aws.region '{}' is not a valid region name", region);
        }
    }

    if let Some(profile) = &config.profile {
        if profile.trim().is_empty() {
            bail!("aws.profile must not be empty");
        }
    }

    if let Some(endpoint) = &config.endpoint_url {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| anyhow::anyhow!("aws.endpoint_url '{}' is not a valid URL: {}", endpoint, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("aws.endpoint_url must use http or https, got '{}'", parsed.scheme());
        }
        if parsed.host_str().is_none() {
            bail!("aws.endpoint_url '{}' has no host", endpoint);
        }
        if parsed.scheme() == "http" && config.sign_requests {
            warn!(endpoint = %endpoint, "signing requests sent over plain http");
        }
    }

    if config.timeout_secs == 0 {
        bail!("aws.timeout_secs must be greater than 0");
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }
    Ok(())
}

fn validate_paging_config(config: &PagingConfig) -> Result<()> {
    if let Some(size) = config.page_size {
        if size == 0 || size > MAX_PAGE_SIZE {
            bail!("paging.page_size must be between 1 and {}, got {}", MAX_PAGE_SIZE, size);
        }
    }
    Ok(())
}
