//! JSON and TOML inputs

use anyhow::Context;
use holocron_analytics::HealthSnapshot;
use holocron_core::HolocronConfig;
use holocron_model::{Answers, CeremonyTemplate};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and decode a JSON file
///
/// # Errors
/// Unreadable file or malformed JSON
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Template file; validated on load
///
/// # Errors
/// As [`read_json`], plus template validation failures
pub fn load_template(path: &Path) -> anyhow::Result<CeremonyTemplate> {
    read_json(path)
}

/// Team size, templates and responses
///
/// # Errors
/// As [`read_json`]
pub fn load_snapshot(path: &Path) -> anyhow::Result<HealthSnapshot> {
    read_json(path)
}

/// Answers keyed by question id
///
/// # Errors
/// As [`read_json`]
pub fn load_answers(path: &Path) -> anyhow::Result<Answers> {
    read_json(path)
}

/// Configuration file when given, defaults otherwise, then env overrides
///
/// # Errors
/// Unreadable or malformed config file
pub fn load_config(path: Option<&Path>) -> anyhow::Result<HolocronConfig> {
    let config = match path {
        Some(path) => HolocronConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => HolocronConfig::default(),
    };
    Ok(config.apply_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;
    use holocron_test_utils::{scale_item, template_with_items};
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn template_round_trips_through_a_file() {
        let template = template_with_items("t1", vec![scale_item("mood")]);
        let file = write_temp(&serde_json::to_string(&template).unwrap());
        assert_eq!(load_template(file.path()).unwrap(), template);
    }

    #[test]
    fn invalid_template_is_rejected_on_load() {
        let file = write_temp(r#"{"id": "", "team_id": "team1"}"#);
        let err = load_template(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "{err}");
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn config_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.notifications.workers, 2);
    }
}
