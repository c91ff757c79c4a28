use super::{ClientConfig, LogFormat, OutputFormat};
use anyhow::{anyhow, Result};

pub const ENV_PREFIX: &str = "AGENTCTL_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the AGENTCTL_ prefix
    /// Used for AWS standard variables (AWS_REGION, etc.)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Apply environment-variable overrides to the config.
///
/// Standard AWS variables are applied first so the AGENTCTL_ ones win.
pub fn apply_env_overrides<E: EnvSource>(config: &mut ClientConfig, env: &E) -> Result<()> {
    // AWS standard variables (without AGENTCTL_ prefix for compatibility)
    if let Some(region) = get_raw_env_string(env, "AWS_DEFAULT_REGION") {
        config.aws.region = Some(region);
    }
    if let Some(region) = get_raw_env_string(env, "AWS_REGION") {
        config.aws.region = Some(region);
    }
    if let Some(profile) = get_raw_env_string(env, "AWS_PROFILE") {
        config.aws.profile = Some(profile);
    }
    if let Some(endpoint) = get_raw_env_string(env, "AWS_ENDPOINT_URL") {
        config.aws.endpoint_url = Some(endpoint);
    }

    // AWS connection
    if let Some(region) = get_env_string(env, "REGION") {
        config.aws.region = Some(region);
    }
    if let Some(profile) = get_env_string(env, "PROFILE") {
        config.aws.profile = Some(profile);
    }
    if let Some(endpoint) = get_env_string(env, "ENDPOINT_URL") {
        config.aws.endpoint_url = Some(endpoint);
    }
    if let Some(val) = get_env_bool(env, "SIGN_REQUESTS")? {
        config.aws.sign_requests = val;
    }
    if let Some(val) = get_env_u64(env, "TIMEOUT_SECS")? {
        config.aws.timeout_secs = val;
    }

    // Output and logging
    if let Some(format) = get_env_string(env, "OUTPUT") {
        config.output.format = format
            .parse::<OutputFormat>()
            .map_err(|e| anyhow!("Invalid {}OUTPUT value: {}", ENV_PREFIX, e))?;
    }
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .map_err(|e| anyhow!("Invalid {}LOG_FORMAT value: {}", ENV_PREFIX, e))?;
    }

    // Confirmation and paging
    if let Some(val) = get_env_bool(env, "ASSUME_YES")? {
        config.confirm.assume_yes = val;
    }
    if let Some(val) = get_env_bool(env, "AUTO_ITERATE")? {
        config.paging.auto_iterate = val;
    }
    if let Some(val) = get_env_u64(env, "PAGE_SIZE")? {
        let size = u32::try_from(val)
            .map_err(|_| anyhow!("{}PAGE_SIZE is out of range: {}", ENV_PREFIX, val))?;
        config.paging.page_size = Some(size);
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|val| !val.is_empty())
}

/// Get a raw environment variable without the AGENTCTL_ prefix
fn get_raw_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get_raw(key).filter(|val| !val.is_empty())
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(anyhow!(
                        "Failed to parse {}{} (expected bool): {}",
                        ENV_PREFIX,
                        key,
                        other
                    ))
                }
            };
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
