//! Name conversions shared by the build-time model generator and the runtime.
//!
//! Wire names are camelCase (`agentRuntimeId`), nouns are PascalCase
//! (`AgentRuntime`), and everything the CLI exposes is kebab-case.

/// Convert a camelCase or PascalCase identifier to kebab-case.
///
/// Acronyms stay together: `TokenVaultCMK` becomes `token-vault-cmk` and
/// `ARNValue` becomes `arn-value`.
pub fn kebab_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == ' ' {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            continue;
        }

        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }

        out.push(c.to_ascii_lowercase());
    }

    out
}

/// CLI command name for a verb/noun pair, e.g. `Remove` + `AgentRuntime`.
pub fn command_name(verb: &str, noun: &str) -> String {
    format!("{}-{}", verb.to_ascii_lowercase(), kebab_case(noun))
}

/// Case- and separator-insensitive form used to match user-supplied names
/// against wire names (`AgentRuntimeId`, `agent-runtime-id`, `agentRuntimeId`).
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
