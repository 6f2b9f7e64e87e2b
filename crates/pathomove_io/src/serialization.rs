//! JSON helpers for run outputs and configuration snapshots.

use crate::error::{IoError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string(data)?)
}

pub fn to_json_pretty<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Deserializes `json`, rejecting blank input with a validation error.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }
    Ok(serde_json::from_str(json)?)
}

pub fn write_json_file<T: Serialize, P: AsRef<Path>>(data: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = to_json_pretty(data)?;
    std::fs::write(path, json).context(format!("writing {}", path.display()))
}

pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).context(format!("reading {}", path.display()))?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathomove_core::SimConfig;

    #[test]
    fn test_blank_json_rejected() {
        let result: Result<SimConfig> = from_json("   ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_config_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = SimConfig::default();
        config.run.seed = 99;
        write_json_file(&config, &path).unwrap();
        let loaded: SimConfig = read_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_json_file::<SimConfig, _>("/nonexistent/config.json").unwrap_err();
        assert!(err.to_string().contains("reading /nonexistent/config.json"));
    }
}
