use tagshift_core::navigator::compound_of;
use tagshift_core::{Path, SchemaVersion, TagValue, path};
use tracing::debug;

use crate::error::Result;
use crate::migrator::{MigrationContext, Migrator};

/// Ids a player head has gone by.
const PLAYER_HEAD_IDS: &[&str] = &["minecraft:player_head", "minecraft:skull", "skull", "397"];

/// Player heads name their owner with a plain string before
/// [`SchemaVersion::SKULL_PROFILES`] and with a `{Name, Id, Properties}`
/// profile compound afterwards.
pub struct SkullProfile {
    owner: Path,
}

impl SkullProfile {
    pub fn new() -> Self {
        Self {
            owner: path!["SkullOwner"],
        }
    }
}

impl Default for SkullProfile {
    fn default() -> Self {
        Self::new()
    }
}

fn is_player_head(object_id: &str) -> bool {
    PLAYER_HEAD_IDS.contains(&object_id)
}

impl Migrator for SkullProfile {
    fn name(&self) -> &str {
        "skull-profile"
    }

    fn max_version(&self) -> SchemaVersion {
        SchemaVersion::SKULL_PROFILES
    }

    fn feature_path(&self) -> Option<&Path> {
        Some(&self.owner)
    }

    fn upgrade_feature(&self, owner: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if !ctx.crosses(SchemaVersion::SKULL_PROFILES) || !is_player_head(ctx.object_id) {
            return Ok(());
        }
        if let TagValue::String(name) = owner {
            let name = std::mem::take(name);
            *owner = compound_of([("Name", TagValue::String(name))]);
        }
        Ok(())
    }

    fn downgrade_feature(&self, owner: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if !ctx.crosses(SchemaVersion::SKULL_PROFILES) || !is_player_head(ctx.object_id) {
            return Ok(());
        }
        if !owner.is_compound() {
            return Ok(());
        }
        let name = owner.get("Name").and_then(TagValue::as_str).map(str::to_string);
        match name {
            Some(name) => *owner = TagValue::String(name),
            None => debug!(object_id = ctx.object_id, "skull profile has no name, left as is"),
        }
        Ok(())
    }
}
