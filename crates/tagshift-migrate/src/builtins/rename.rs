use tagshift_core::navigator;
use tagshift_core::{Path, SchemaVersion, TagValue};
use tracing::warn;

use crate::error::Result;
use crate::migrator::{MigrationContext, Migrator};

/// Moves one field from `legacy` to `current` when a migration crosses
/// `boundary`, and back again on the way down.
///
/// ```
/// use tagshift_core::SchemaVersion;
/// use tagshift_migrate::builtins::FieldRename;
///
/// let rename = FieldRename::new("hide-flags", SchemaVersion(2000), "HideFlags", "display.hidden");
/// ```
pub struct FieldRename {
    name: String,
    boundary: SchemaVersion,
    legacy: Path,
    current: Path,
}

impl FieldRename {
    pub fn new(
        name: impl Into<String>,
        boundary: SchemaVersion,
        legacy: impl Into<Path>,
        current: impl Into<Path>,
    ) -> Self {
        Self {
            name: name.into(),
            boundary,
            legacy: legacy.into(),
            current: current.into(),
        }
    }

    fn relocate(&self, tree: &mut TagValue, from: &Path, to: &Path) {
        let Some(value) = navigator::take(tree, from.as_slice()) else {
            return;
        };
        if navigator::set(tree, value.clone(), to.as_slice()) {
            navigator::prune_empty(tree, from.as_slice());
        } else {
            warn!(migrator = %self.name, from = %from, to = %to, "rename target is blocked");
            navigator::set(tree, value, from.as_slice());
        }
    }
}

impl Migrator for FieldRename {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_version(&self) -> SchemaVersion {
        self.boundary
    }

    fn upgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if ctx.crosses(self.boundary) {
            self.relocate(tree, &self.legacy, &self.current);
        }
        Ok(())
    }

    fn downgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if ctx.crosses(self.boundary) {
            self.relocate(tree, &self.current, &self.legacy);
        }
        Ok(())
    }
}
