//! Configuration loading

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::domain::services::validate_stack_name;
use crate::error::{StackError, StackResult};

use super::types::Config;

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> StackResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| StackError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let mut config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| StackError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    config.base_dir = base_dir_of(path);

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    validate(&config, path)?;
    Ok((config, warnings))
}

/// Load from `path` when present, otherwise built-in defaults; env overrides
/// are applied either way
pub fn load_or_default(path: &Path) -> StackResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = if path.exists() {
        load_with_warnings(path)?
    } else {
        let config = Config {
            base_dir: base_dir_of(path),
            ..Config::default()
        };
        (config, Vec::new())
    };
    let config = with_env_overrides(config);
    validate(&config, path)?;
    Ok((config, warnings))
}

/// Apply environment variable overrides (OTELSTACK_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_overrides_from(config, |key| std::env::var(key).ok())
}

pub(crate) fn with_overrides_from(
    mut config: Config,
    env: impl Fn(&str) -> Option<String>,
) -> Config {
    if let Some(name) = env("OTELSTACK_STACK").filter(|v| !v.is_empty()) {
        config.stack.name = name;
    }

    if let Some(location) = env("OTELSTACK_LOCATION").filter(|v| !v.is_empty()) {
        config.stack.location = location;
    }

    if let Some(file) = env("OTELSTACK_CONFIG_FILE").filter(|v| !v.is_empty()) {
        config.collector.config_file = PathBuf::from(file);
    }

    if let Some(program) = env("OTELSTACK_AZ").filter(|v| !v.is_empty()) {
        config.az.program = PathBuf::from(program);
    }

    config
}

fn base_dir_of(path: &Path) -> PathBuf {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    absolute(&dir)
}

/// Anchor `path` at the working directory and normalise it, so every
/// spelling of the same directory yields the same base.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => normalize(path),
    }
}

/// Lexical normalisation: drops `.` and folds `..` into its parent.
/// Symlinks are left alone.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folded = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if folded {
                    out.pop();
                } else if !matches!(
                    out.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Checks that need the whole configuration, env overrides included
fn validate(config: &Config, path: &Path) -> StackResult<()> {
    validate_stack_name(&config.stack.name)?;

    let collector = &config.collector;
    if collector.min_replicas > collector.max_replicas {
        return Err(StackError::InvalidConfig {
            file: path.to_path_buf(),
            message: format!(
                "collector.min_replicas ({}) is greater than collector.max_replicas ({})",
                collector.min_replicas, collector.max_replicas
            ),
        });
    }
    Ok(())
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "stack",
        "name",
        "location",
        "state_dir",
        "resource_group",
        "storage_account",
        "collector",
        "config_file",
        "image",
        "app_name",
        "target_port",
        "health_port",
        "health_path",
        "mount_path",
        "min_replicas",
        "max_replicas",
        "storage",
        "sku",
        "share_name",
        "share_quota_gib",
        "storage_name",
        "access_mode",
        "az",
        "program",
        "output",
        "color",
        "unicode",
        "secrets",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
