//! Built-in item migrators.
//!
//! Trees handled here are item data compounds (the legacy `tag` compound,
//! or the component map once items moved to components). The object id
//! is the item id.
//!
//! Registration order matters. Upgrades run:
//!
//! 1. [`SkullProfile`]: owner name string → profile compound
//! 2. [`EnchantmentIds`]: numeric enchantment ids → namespaced ids
//! 3. [`ContainerItems`]: nested item stacks, recursing through the engine
//! 4. [`ComponentPaths`]: legacy paths → component paths via a [`PathMap`]
//!
//! and downgrades run the same list backwards. [`FieldRename`] is not
//! registered by default; it is a building block for callers' own tables.
//!
//! [`PathMap`]: tagshift_core::PathMap

mod components;
mod containers;
mod enchantments;
mod items;
mod rename;
mod skull;

pub use components::{ComponentPaths, ITEM_PATHS};
pub use containers::ContainerItems;
pub use enchantments::{EnchantmentIds, LEGACY_ENCHANTMENTS};
pub use items::{Downgraded, Flattened, ItemIds, LEGACY_ITEMS, LegacyId, LegacyItem};
pub use rename::FieldRename;
pub use skull::SkullProfile;

use crate::cache::CacheSettings;
use crate::registry::MigrationRegistry;

/// Key under which a downgraded item keeps an id the older layout cannot
/// express.
pub const ORIGINAL_ID_KEY: &str = "tagshift:original-id";

/// Key under which enchantments without a numeric id are kept on downgrade.
pub const STASHED_ENCHANTMENTS_KEY: &str = "tagshift:enchantments";

/// Id substituted for items the older layout cannot express.
pub const PLACEHOLDER_ITEM_ID: &str = "minecraft:stone";

#[derive(Debug, Clone, Default)]
pub struct BuiltinOptions {
    /// Retention of the item id memo used by [`ContainerItems`].
    pub cache: CacheSettings,
}

/// Register the built-in migrators in their required order.
pub fn register_all(registry: &mut MigrationRegistry, options: &BuiltinOptions) {
    registry
        .register(SkullProfile::new())
        .register(EnchantmentIds::default())
        .register(ContainerItems::new(options.cache))
        .register(ComponentPaths::item_paths());
}
