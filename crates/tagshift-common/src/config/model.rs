use serde::{Deserialize, Serialize};
use std::time::Duration;

use tagshift_core::version::DEFAULT_VERSION_KEY;
use tagshift_core::{CodecOptions, SchemaVersion};
use tagshift_migrate::builtins::BuiltinOptions;
use tagshift_migrate::{CacheSettings, EngineSettings};

/// Root configuration from tagshift.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TagshiftConfig {
    #[serde(default)]
    pub schema: SchemaSection,

    /// Item id memo settings
    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub codec: CodecSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TagshiftConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            current: self.schema.current,
            version_key: self.schema.version_key.clone(),
            max_depth: self.schema.max_nesting,
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            capacity: self.cache.capacity,
            ttl: Duration::from_secs(self.cache.ttl_secs),
        }
    }

    pub fn builtin_options(&self) -> BuiltinOptions {
        BuiltinOptions {
            cache: self.cache_settings(),
        }
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            compression_level: self.codec.compression_level.min(9),
            max_depth: self.codec.max_depth,
        }
    }
}

/// [schema] section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSection {
    /// Ordinal trees are migrated to by default
    #[serde(default = "default_current")]
    pub current: SchemaVersion,
    /// Reserved compound key holding the embedded version
    #[serde(default = "default_version_key")]
    pub version_key: String,
    /// Deepest chain of nested item trees followed during migration
    #[serde(default = "default_max_nesting")]
    pub max_nesting: usize,
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            current: default_current(),
            version_key: default_version_key(),
            max_nesting: default_max_nesting(),
        }
    }
}

pub(crate) fn default_current() -> SchemaVersion {
    SchemaVersion::LATEST
}

pub(crate) fn default_version_key() -> String {
    DEFAULT_VERSION_KEY.to_string()
}

fn default_max_nesting() -> usize {
    EngineSettings::default().max_depth
}

/// [cache] section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSection {
    /// Maximum entries, 0 for unbounded
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Entry lifetime in seconds, 0 to never expire
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_capacity() -> usize {
    CacheSettings::default().capacity
}

fn default_ttl_secs() -> u64 {
    CacheSettings::default().ttl.as_secs()
}

/// [codec] section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecSection {
    /// gzip level, clamped to 0..=9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    #[serde(default = "default_codec_depth")]
    pub max_depth: usize,
}

impl Default for CodecSection {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
            max_depth: default_codec_depth(),
        }
    }
}

fn default_compression_level() -> u32 {
    CodecOptions::default().compression_level
}

fn default_codec_depth() -> usize {
    CodecOptions::default().max_depth
}

/// [logging] section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `TAGSHIFT_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
