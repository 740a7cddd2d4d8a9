//! The migrator interface.
//!
//! A [`Migrator`] adapts one aspect of a tree between schema versions. It
//! declares a half-open applicability range `[min_version, max_version)`;
//! the engine skips it when that range does not intersect the span being
//! migrated. By convention `max_version` is the version at which the
//! layout change the migrator handles takes effect, and hooks use
//! [`MigrationContext::crosses`] to test whether that change is part of
//! the current step.

use tagshift_core::{Path, SchemaVersion, TagValue};

use crate::engine::{MigrationEngine, MigrationReport};
use crate::error::Result;

/// Everything a hook knows about the migration in progress.
#[derive(Clone, Copy)]
pub struct MigrationContext<'a> {
    pub object_id: &'a str,
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    /// 0 for the tree handed to the engine, +1 per nested tree.
    pub depth: usize,
    engine: &'a MigrationEngine,
}

impl<'a> MigrationContext<'a> {
    pub(crate) fn new(
        engine: &'a MigrationEngine,
        object_id: &'a str,
        from: SchemaVersion,
        to: SchemaVersion,
        depth: usize,
    ) -> Self {
        Self {
            object_id,
            from,
            to,
            depth,
            engine,
        }
    }

    pub fn engine(&self) -> &'a MigrationEngine {
        self.engine
    }

    pub fn is_upgrade(&self) -> bool {
        self.from < self.to
    }

    /// Lower end of the migrated span.
    pub fn low(&self) -> SchemaVersion {
        self.from.min(self.to)
    }

    /// Upper end of the migrated span.
    pub fn high(&self) -> SchemaVersion {
        self.from.max(self.to)
    }

    /// Whether the layout change introduced at `boundary` lies inside this
    /// migration, i.e. one side is older than `boundary` and the other is
    /// at or past it.
    pub fn crosses(&self, boundary: SchemaVersion) -> bool {
        self.low() < boundary && boundary <= self.high()
    }

    /// Whether the tree is in the layout introduced at `boundary` before
    /// this migration runs.
    pub fn source_at_least(&self, boundary: SchemaVersion) -> bool {
        self.from >= boundary
    }

    /// Whether the tree must end up in the layout introduced at `boundary`.
    pub fn target_at_least(&self, boundary: SchemaVersion) -> bool {
        self.to >= boundary
    }

    /// Migrate a tree embedded in the current one. See
    /// [`MigrationEngine::migrate_nested`].
    pub fn migrate_nested(&self, tree: &mut TagValue, object_id: &str) -> Result<MigrationReport> {
        self.engine.migrate_nested(tree, object_id, self)
    }
}

/// A unit of version adaptation.
///
/// Every hook is optional. The plain hooks receive the whole tree. The
/// feature hooks receive only the node at [`Migrator::feature_path`] and
/// run after the plain hook, when that node exists; they cannot see the
/// rest of the tree while they hold it.
pub trait Migrator: Send + Sync {
    fn name(&self) -> &str;

    /// Inclusive lower bound of the applicability range.
    fn min_version(&self) -> SchemaVersion {
        SchemaVersion::LEGACY
    }

    /// Exclusive upper bound of the applicability range.
    fn max_version(&self) -> SchemaVersion {
        SchemaVersion::MAX
    }

    /// Sub-tree handed to the feature hooks.
    fn feature_path(&self) -> Option<&Path> {
        None
    }

    fn upgrade(&self, _tree: &mut TagValue, _ctx: &MigrationContext<'_>) -> Result<()> {
        Ok(())
    }

    fn upgrade_feature(&self, _feature: &mut TagValue, _ctx: &MigrationContext<'_>) -> Result<()> {
        Ok(())
    }

    fn downgrade(&self, _tree: &mut TagValue, _ctx: &MigrationContext<'_>) -> Result<()> {
        Ok(())
    }

    fn downgrade_feature(
        &self,
        _feature: &mut TagValue,
        _ctx: &MigrationContext<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// Whether `[min_version, max_version)` intersects `[low, high)`.
    fn applies_between(&self, low: SchemaVersion, high: SchemaVersion) -> bool {
        self.min_version() < high && low < self.max_version()
    }
}
