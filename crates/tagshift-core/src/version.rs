//! Schema versions.
//!
//! A [`SchemaVersion`] is an ordinal: later layouts compare greater. Trees
//! carry the version they were produced under in a reserved compound key;
//! a tree without that key is taken to be current.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tag::TagValue;

/// Default reserved key holding the producing schema version.
pub const DEFAULT_VERSION_KEY: &str = "DataVersion";

/// Ordinal identifying a field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(pub u32);

impl SchemaVersion {
    /// Layout of trees written before any version was recorded.
    pub const LEGACY: SchemaVersion = SchemaVersion(0);
    /// Player heads store their owner as a profile compound instead of a name.
    pub const SKULL_PROFILES: SchemaVersion = SchemaVersion(169);
    /// Item and enchantment ids become namespaced strings; damage-encoded
    /// variants become distinct ids.
    pub const FLATTENING: SchemaVersion = SchemaVersion(1519);
    /// Item data moves from the legacy tag layout to namespaced components.
    pub const COMPONENTS: SchemaVersion = SchemaVersion(3837);
    /// Newest layout this crate knows about.
    pub const LATEST: SchemaVersion = SchemaVersion(3953);
    /// Open upper bound for applicability ranges.
    pub const MAX: SchemaVersion = SchemaVersion(u32::MAX);

    pub const fn new(ordinal: u32) -> Self {
        SchemaVersion(ordinal)
    }

    pub const fn ordinal(self) -> u32 {
        self.0
    }

    /// Read a version from a tag. Integral, floating and numeric string
    /// tags are accepted; negative or non-numeric values are not.
    pub fn from_tag(tag: &TagValue) -> Option<SchemaVersion> {
        let ordinal = match tag {
            TagValue::Float(_) | TagValue::Double(_) => {
                let value = tag.as_f64()?;
                if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
                    return None;
                }
                value.trunc() as u32
            }
            TagValue::String(s) => s.trim().parse::<u32>().ok()?,
            other => u32::try_from(other.as_i64()?).ok()?,
        };
        Some(SchemaVersion(ordinal))
    }

    /// Tag written back into trees. Ordinals above `i32::MAX` saturate.
    pub fn to_tag(self) -> TagValue {
        TagValue::Int(i32::try_from(self.0).unwrap_or(i32::MAX))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for SchemaVersion {
    fn from(ordinal: u32) -> Self {
        SchemaVersion(ordinal)
    }
}

/// Read the embedded version of a compound tree.
pub fn embedded_version(tree: &TagValue, key: &str) -> Option<SchemaVersion> {
    tree.get(key).and_then(SchemaVersion::from_tag)
}

/// Write `version` under `key`. Returns `false` if the tree is not a compound.
pub fn stamp_version(tree: &mut TagValue, key: &str, version: SchemaVersion) -> bool {
    match tree.as_compound_mut() {
        Some(map) => {
            map.insert(key.to_string(), version.to_tag());
            true
        }
        None => false,
    }
}
