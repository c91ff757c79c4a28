// Configuration source loading.
//
// Priority order:
// 1. Command-line flags
// 2. Environment variables (AGENTCTL_* prefix, then AWS_*)
// 3. Config file: --config, AGENTCTL_CONFIG, AGENTCTL_CONFIG_CONTENT,
//    ./agentctl.toml, ./.agentctl.toml
// 4. Defaults

use crate::env_overrides::{self, EnvSource};
use crate::*;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

const DEFAULT_FILES: &[&str] = &["agentctl.toml", ".agentctl.toml"];

pub fn load_config<E: EnvSource>(cli: &CliOverrides, env: &E, cwd: &Path) -> Result<ClientConfig> {
    let mut config = load_from_file(cli, env, cwd)?.unwrap_or_default();

    env_overrides::apply_env_overrides(&mut config, env)?;
    apply_cli_overrides(&mut config, cli);

    config.validate()?;
    Ok(config)
}

fn load_from_file<E: EnvSource>(
    cli: &CliOverrides,
    env: &E,
    cwd: &Path,
) -> Result<Option<ClientConfig>> {
    if let Some(path) = &cli.config_path {
        return read_file(path).map(Some);
    }

    if let Some(path) = env.get("CONFIG").filter(|p| !p.is_empty()) {
        return read_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT").filter(|c| !c.is_empty()) {
        let config = ClientConfig::from_toml(&content)
            .context("Failed to parse inline config from AGENTCTL_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    for name in DEFAULT_FILES {
        let path = cwd.join(name);
        if path.exists() {
            return read_file(&path).map(Some);
        }
    }

    Ok(None)
}

fn read_file(path: &Path) -> Result<ClientConfig> {
    debug!(path = %path.display(), "loading config file");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    ClientConfig::from_toml(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn apply_cli_overrides(config: &mut ClientConfig, cli: &CliOverrides) {
    if let Some(region) = &cli.region {
        config.aws.region = Some(region.clone());
    }
    if let Some(profile) = &cli.profile {
        config.aws.profile = Some(profile.clone());
    }
    if let Some(endpoint) = &cli.endpoint_url {
        config.aws.endpoint_url = Some(endpoint.clone());
    }
    if cli.no_sign_request {
        config.aws.sign_requests = false;
    }
    if let Some(format) = cli.output {
        config.output.format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
}
