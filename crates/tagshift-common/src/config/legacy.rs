use serde::{Deserialize, Serialize};
use tagshift_core::SchemaVersion;

use super::model::{
    LoggingConfig, SchemaSection, TagshiftConfig, default_current, default_version_key,
};

/// Legacy `tagshift.json` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyConfig {
    #[serde(default = "default_current")]
    pub data_version: SchemaVersion,
    #[serde(default = "default_version_key")]
    pub version_key: String,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl From<LegacyConfig> for TagshiftConfig {
    fn from(legacy: LegacyConfig) -> Self {
        let schema = SchemaSection {
            current: legacy.data_version,
            version_key: legacy.version_key,
            ..Default::default()
        };
        let mut logging = LoggingConfig::default();
        if let Some(level) = legacy.log_level {
            logging.level = level;
        }

        TagshiftConfig {
            schema,
            logging,
            ..Default::default()
        }
    }
}
