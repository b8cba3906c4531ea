use crate::app::models::RunConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration must be a JSON object")]
    NotAnObject,
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Loose view of the file. Every key is optional here so that validation can
/// report all problems at once instead of stopping at the first.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    base_path: Option<Value>,
    directories_to_skip: Option<Value>,
    search_depth: Option<Value>,
    test_command: Option<Value>,
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read config at {:?}", path))?;
    let config = parse_config(&content)
        .context(format!("Failed to parse config at {:?}", path))?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<RunConfig> {
    let value: Value = serde_json::from_str(content).context("Config is not valid JSON")?;
    if !value.is_object() {
        return Err(ConfigError::NotAnObject.into());
    }
    let raw: RawConfig = serde_json::from_value(value)?;
    Ok(validate(raw)?)
}

fn validate(raw: RawConfig) -> Result<RunConfig, ConfigError> {
    let mut problems = Vec::new();

    let base_path = match raw.base_path {
        Some(Value::String(s)) if !s.is_empty() => Some(PathBuf::from(s)),
        Some(Value::String(_)) => {
            problems.push("`basePath` must not be empty".to_string());
            None
        }
        Some(other) => {
            problems.push(format!("`basePath` must be a string, got {}", kind(&other)));
            None
        }
        None => {
            problems.push("missing `basePath`".to_string());
            None
        }
    };

    let directories_to_skip = match raw.directories_to_skip {
        Some(value) => match string_array(&value) {
            Some(items) => Some(items.into_iter().map(PathBuf::from).collect()),
            None => {
                problems.push(format!(
                    "`directoriesToSkip` must be an array of strings, got {}",
                    kind(&value)
                ));
                None
            }
        },
        None => {
            problems.push("missing `directoriesToSkip`".to_string());
            None
        }
    };

    let search_depth = match raw.search_depth {
        Some(Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(depth) => Some(depth),
            Err(_) => {
                problems.push(format!(
                    "`searchDepth` must contain an integer, got {:?}",
                    s
                ));
                None
            }
        },
        Some(Value::Number(n)) => match n.as_i64() {
            Some(depth) => Some(depth),
            None => {
                problems.push(format!(
                    "`searchDepth` must be an integer, got {}",
                    n
                ));
                None
            }
        },
        Some(other) => {
            problems.push(format!(
                "`searchDepth` must be a string containing an integer, got {}",
                kind(&other)
            ));
            None
        }
        None => {
            problems.push("missing `searchDepth`".to_string());
            None
        }
    };

    let test_command = match raw.test_command {
        None | Some(Value::Null) => Some(RunConfig::default_test_command()),
        Some(value) => match string_array(&value) {
            Some(items) if !items.is_empty() => Some(items),
            _ => {
                problems.push(
                    "`testCommand` must be a non-empty array of strings".to_string(),
                );
                None
            }
        },
    };

    match (base_path, directories_to_skip, search_depth, test_command) {
        (Some(base_path), Some(directories_to_skip), Some(search_depth), Some(test_command))
            if problems.is_empty() =>
        {
            Ok(RunConfig {
                base_path,
                directories_to_skip,
                search_depth,
                test_command,
            })
        }
        _ => Err(ConfigError::Invalid(problems)),
    }
}

fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
