//! Configuration module
//!
//! Loads tagshift.toml, or the older tagshift.json layout, and turns it
//! into the settings the engine, caches and codec take.

pub mod legacy;
pub mod model;

use anyhow::Context;
use std::path::Path;

use self::legacy::LegacyConfig;

pub use self::model::*;

impl TagshiftConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content, path.extension().is_some_and(|ext| ext == "json"))
    }

    /// Parse configuration text, JSON in the legacy layout or TOML.
    pub fn parse(content: &str, legacy_json: bool) -> crate::Result<Self> {
        if legacy_json {
            let legacy: LegacyConfig =
                serde_json::from_str(content).context("Failed to parse legacy JSON config")?;
            return Ok(legacy.into());
        }
        let config: TagshiftConfig =
            toml::from_str(content).context("Failed to parse TOML config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tagshift_core::SchemaVersion;

    #[test]
    fn test_load_toml() -> anyhow::Result<()> {
        let toml_content = r#"
[schema]
current = 3837
version_key = "Version"

[cache]
capacity = 16
ttl_secs = 0

[codec]
compression_level = 12

[logging]
level = "debug"
json = true
"#;
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join("tagshift.toml");
        std::fs::write(&file_path, toml_content)?;

        let config = TagshiftConfig::load(&file_path)?;
        let engine = config.engine_settings();
        assert_eq!(engine.current, SchemaVersion::COMPONENTS);
        assert_eq!(engine.version_key, "Version");
        assert_eq!(engine.max_depth, 16);

        let cache = config.cache_settings();
        assert_eq!(cache.capacity, 16);
        assert_eq!(cache.ttl, Duration::ZERO);

        assert_eq!(config.codec_options().compression_level, 9);
        assert_eq!(config.codec_options().max_depth, 512);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "debug");

        Ok(())
    }

    #[test]
    fn test_missing_sections_default() -> anyhow::Result<()> {
        let config = TagshiftConfig::parse("", false)?;
        assert_eq!(config, TagshiftConfig::default());
        assert_eq!(config.engine_settings().current, SchemaVersion::LATEST);
        assert_eq!(config.engine_settings().version_key, "DataVersion");
        assert_eq!(config.cache_settings().ttl, Duration::from_secs(600));
        Ok(())
    }

    #[test]
    fn test_load_legacy_json() -> anyhow::Result<()> {
        let json_content = r#"{
    "dataVersion": 1519,
    "logLevel": "warn"
}"#;
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join("tagshift.json");
        std::fs::write(&file_path, json_content)?;

        let config = TagshiftConfig::load(&file_path)?;
        assert_eq!(config.schema.current, SchemaVersion::FLATTENING);
        assert_eq!(config.schema.version_key, "DataVersion");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.cache, CacheSection::default());

        Ok(())
    }

    #[test]
    fn test_bad_toml_reports_context() {
        let err = TagshiftConfig::parse("[schema]\ncurrent = \"soon\"", false).unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TagshiftConfig::load(&dir.path().join("absent.toml")).is_err());
    }
}
