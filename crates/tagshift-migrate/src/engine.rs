//! Migration engine.
//!
//! The engine reads the schema version embedded in a tree, decides which
//! way to move, runs every applicable migrator and stamps the target
//! version back into the tree. Trees are mutated in place; a failure part
//! way through leaves the tree partially migrated.

use std::fmt;

use tagshift_core::navigator;
use tagshift_core::version::{DEFAULT_VERSION_KEY, embedded_version, stamp_version};
use tagshift_core::{SchemaVersion, TagValue};
use tracing::{debug, trace};

use crate::error::{MigrationError, Result};
use crate::migrator::{MigrationContext, Migrator};
use crate::registry::MigrationRegistry;

/// Engine tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Version trees are brought to by [`MigrationEngine::migrate_to_current`].
    pub current: SchemaVersion,
    /// Compound key holding the embedded version.
    pub version_key: String,
    /// Deepest chain of nested trees migrated through
    /// [`MigrationEngine::migrate_nested`].
    pub max_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            current: SchemaVersion::LATEST,
            version_key: DEFAULT_VERSION_KEY.to_string(),
            max_depth: 16,
        }
    }
}

/// Where a tree stands relative to a target version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// No embedded version. The tree is taken to be current.
    Unversioned,
    NeedsUpgrade,
    NeedsDowngrade,
    Current,
}

impl MigrationState {
    pub fn classify(from: Option<SchemaVersion>, to: SchemaVersion) -> Self {
        match from {
            None => MigrationState::Unversioned,
            Some(from) if from < to => MigrationState::NeedsUpgrade,
            Some(from) if from > to => MigrationState::NeedsDowngrade,
            Some(_) => MigrationState::Current,
        }
    }

    pub fn is_noop(self) -> bool {
        matches!(self, MigrationState::Unversioned | MigrationState::Current)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Unversioned => write!(f, "unversioned"),
            MigrationState::NeedsUpgrade => write!(f, "upgrade"),
            MigrationState::NeedsDowngrade => write!(f, "downgrade"),
            MigrationState::Current => write!(f, "current"),
        }
    }
}

/// What a migration call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub state: MigrationState,
    pub from: Option<SchemaVersion>,
    pub to: SchemaVersion,
    /// Names of the migrators that ran, in execution order.
    pub applied: Vec<String>,
}

impl MigrationReport {
    fn noop(state: MigrationState, from: Option<SchemaVersion>, to: SchemaVersion) -> Self {
        Self {
            state,
            from,
            to,
            applied: Vec::new(),
        }
    }

    pub fn changed(&self) -> bool {
        !self.state.is_noop()
    }
}

/// Runs registered migrators over trees.
#[derive(Default)]
pub struct MigrationEngine {
    registry: MigrationRegistry,
    settings: EngineSettings,
}

impl MigrationEngine {
    pub fn new(registry: MigrationRegistry) -> Self {
        Self::with_settings(registry, EngineSettings::default())
    }

    pub fn with_settings(registry: MigrationRegistry, settings: EngineSettings) -> Self {
        Self { registry, settings }
    }

    /// Engine over the built-in item migrators.
    pub fn with_builtins() -> Self {
        Self::new(MigrationRegistry::with_builtins())
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn current_version(&self) -> SchemaVersion {
        self.settings.current
    }

    /// Version embedded in `tree`, if any.
    pub fn version_of(&self, tree: &TagValue) -> Option<SchemaVersion> {
        embedded_version(tree, &self.settings.version_key)
    }

    pub fn state_of(&self, tree: &TagValue, to: SchemaVersion) -> MigrationState {
        MigrationState::classify(self.version_of(tree), to)
    }

    /// Names of the migrators a move from `from` to `to` would run, in order.
    pub fn plan(&self, from: SchemaVersion, to: SchemaVersion) -> Vec<&str> {
        self.registry
            .applicable(from, to)
            .into_iter()
            .map(|m| m.name())
            .collect()
    }

    /// Migrate `tree` from its embedded version to `to`.
    ///
    /// A tree without an embedded version, or already at `to`, is left
    /// alone, so calling this twice is the same as calling it once.
    pub fn migrate(
        &self,
        tree: &mut TagValue,
        object_id: &str,
        to: SchemaVersion,
    ) -> Result<MigrationReport> {
        require_compound(tree)?;
        let from = self.read_version(tree)?;
        let state = MigrationState::classify(from, to);
        match from {
            Some(from) if !state.is_noop() => self.run(tree, object_id, from, to, 0, true),
            _ => {
                trace!(object_id, %state, "nothing to migrate");
                Ok(MigrationReport::noop(state, from, to))
            }
        }
    }

    pub fn migrate_to_current(
        &self,
        tree: &mut TagValue,
        object_id: &str,
    ) -> Result<MigrationReport> {
        self.migrate(tree, object_id, self.settings.current)
    }

    /// Migrate `tree` from a version known by the caller, ignoring any
    /// embedded version. The target version is stamped afterwards.
    pub fn migrate_from(
        &self,
        tree: &mut TagValue,
        object_id: &str,
        from: SchemaVersion,
        to: SchemaVersion,
    ) -> Result<MigrationReport> {
        require_compound(tree)?;
        self.run(tree, object_id, from, to, 0, true)
    }

    /// Migrate a tree embedded inside the tree `parent` is migrating.
    ///
    /// The nested tree moves from its own embedded version, or from
    /// `parent.from` when it has none, to `parent.to`. The version key is
    /// rewritten only when the nested tree carried one.
    pub fn migrate_nested(
        &self,
        tree: &mut TagValue,
        object_id: &str,
        parent: &MigrationContext<'_>,
    ) -> Result<MigrationReport> {
        require_compound(tree)?;
        let depth = parent.depth + 1;
        if depth > self.settings.max_depth {
            return Err(MigrationError::DepthLimitExceeded(self.settings.max_depth));
        }
        let embedded = self.read_version(tree)?;
        let from = embedded.unwrap_or(parent.from);
        self.run(tree, object_id, from, parent.to, depth, embedded.is_some())
    }

    /// Like [`Self::version_of`], but a version key holding something that
    /// is not an ordinal is an error rather than "unversioned".
    fn read_version(&self, tree: &TagValue) -> Result<Option<SchemaVersion>> {
        let Some(tag) = tree.get(&self.settings.version_key) else {
            return Ok(None);
        };
        SchemaVersion::from_tag(tag)
            .map(Some)
            .ok_or_else(|| MigrationError::InvalidVersion(tag.to_string()))
    }

    fn run(
        &self,
        tree: &mut TagValue,
        object_id: &str,
        from: SchemaVersion,
        to: SchemaVersion,
        depth: usize,
        stamp: bool,
    ) -> Result<MigrationReport> {
        let state = MigrationState::classify(Some(from), to);
        if state.is_noop() {
            return Ok(MigrationReport::noop(state, Some(from), to));
        }

        let ctx = MigrationContext::new(self, object_id, from, to, depth);
        let upgrade = ctx.is_upgrade();
        let mut applied = Vec::new();
        for migrator in self.registry.applicable(from, to) {
            trace!(migrator = migrator.name(), object_id, %from, %to, depth, "running migrator");
            apply(migrator, tree, &ctx, upgrade)?;
            applied.push(migrator.name().to_string());
        }

        if stamp {
            stamp_version(tree, &self.settings.version_key, to);
        }
        debug!(object_id, %from, %to, %state, depth, applied = applied.len(), "migrated tree");
        Ok(MigrationReport {
            state,
            from: Some(from),
            to,
            applied,
        })
    }
}

fn apply(
    migrator: &dyn Migrator,
    tree: &mut TagValue,
    ctx: &MigrationContext<'_>,
    upgrade: bool,
) -> Result<()> {
    if upgrade {
        migrator.upgrade(tree, ctx)?;
    } else {
        migrator.downgrade(tree, ctx)?;
    }
    let Some(path) = migrator.feature_path() else {
        return Ok(());
    };
    match navigator::get_mut(tree, path.as_slice()) {
        Some(feature) if upgrade => migrator.upgrade_feature(feature, ctx),
        Some(feature) => migrator.downgrade_feature(feature, ctx),
        None => Ok(()),
    }
}

fn require_compound(tree: &TagValue) -> Result<()> {
    if tree.is_compound() {
        Ok(())
    } else {
        Err(MigrationError::NotACompound {
            found: tree.tag_type().name(),
        })
    }
}
