//! Ordered migrator registry.
//!
//! Registration order is part of the contract: upgrades run migrators
//! first to last, downgrades last to first, so a migrator can rely on
//! the renames made by the ones registered before it.

use tagshift_core::SchemaVersion;
use tracing::debug;

use crate::builtins::{self, BuiltinOptions};
use crate::migrator::Migrator;

/// Ordered list of migrators.
#[derive(Default)]
pub struct MigrationRegistry {
    migrators: Vec<Box<dyn Migrator>>,
}

impl MigrationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in item migrators with default
    /// options.
    pub fn with_builtins() -> Self {
        Self::with_builtin_options(&BuiltinOptions::default())
    }

    pub fn with_builtin_options(options: &BuiltinOptions) -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry, options);
        registry
    }

    /// Append a migrator. It runs after every migrator already registered
    /// on upgrade, and before them on downgrade.
    pub fn register(&mut self, migrator: impl Migrator + 'static) -> &mut Self {
        self.register_boxed(Box::new(migrator))
    }

    pub fn register_boxed(&mut self, migrator: Box<dyn Migrator>) -> &mut Self {
        debug!(migrator = migrator.name(), position = self.migrators.len(), "registered migrator");
        self.migrators.push(migrator);
        self
    }

    /// Get a migrator by name.
    pub fn get(&self, name: &str) -> Option<&dyn Migrator> {
        self.migrators
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.migrators.iter().map(|m| m.name()).collect()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &dyn Migrator> {
        self.migrators.iter().map(|m| m.as_ref())
    }

    /// Migrators to run, in execution order, when moving from `from` to `to`.
    pub fn applicable(&self, from: SchemaVersion, to: SchemaVersion) -> Vec<&dyn Migrator> {
        let (low, high) = (from.min(to), from.max(to));
        if from < to {
            self.iter().filter(|m| m.applies_between(low, high)).collect()
        } else if from > to {
            self.iter().rev().filter(|m| m.applies_between(low, high)).collect()
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.migrators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, u32, u32);

    impl Migrator for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn min_version(&self) -> SchemaVersion {
            SchemaVersion(self.1)
        }
        fn max_version(&self) -> SchemaVersion {
            SchemaVersion(self.2)
        }
    }

    fn registry() -> MigrationRegistry {
        let mut registry = MigrationRegistry::new();
        registry
            .register(Named("first", 0, 100))
            .register(Named("second", 50, 200))
            .register(Named("third", 150, 300));
        registry
    }

    fn names(migrators: Vec<&dyn Migrator>) -> Vec<&str> {
        migrators.into_iter().map(|m| m.name()).collect()
    }

    #[test]
    fn test_upgrade_runs_in_registration_order() {
        let registry = registry();
        let plan = registry.applicable(SchemaVersion(10), SchemaVersion(160));
        assert_eq!(names(plan), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_downgrade_runs_in_reverse_order() {
        let registry = registry();
        let plan = registry.applicable(SchemaVersion(160), SchemaVersion(60));
        assert_eq!(names(plan), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_range_filtering() {
        let registry = registry();
        assert_eq!(
            names(registry.applicable(SchemaVersion(200), SchemaVersion(250))),
            vec!["third"]
        );
        assert!(registry.applicable(SchemaVersion(7), SchemaVersion(7)).is_empty());
    }

    #[test]
    fn test_lookup() {
        let registry = registry();
        assert!(registry.contains("second"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["first", "second", "third"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_builtins_are_registered_in_order() {
        let registry = MigrationRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["skull-profile", "enchantment-ids", "container-items", "component-paths"]
        );
    }
}
