use tagshift_core::navigator;
use tagshift_core::{Alias, Path, PathMap, PathMapEntry, SchemaVersion, TagValue};
use tracing::{debug, warn};

use crate::error::Result;
use crate::migrator::{MigrationContext, Migrator};

/// Item fields that moved from the legacy tag layout to components.
pub const ITEM_PATHS: &[PathMapEntry] = &[
    PathMapEntry::new(&["minecraft:custom_name"], &["display", "Name"]),
    PathMapEntry::new(&["minecraft:lore"], &["display", "Lore"]),
    PathMapEntry::new(&["minecraft:dyed_color", "rgb"], &["display", "color"]),
    PathMapEntry::new(&["minecraft:unbreakable"], &["Unbreakable"]),
    PathMapEntry::new(&["minecraft:custom_model_data"], &["CustomModelData"]),
    PathMapEntry::new(&["minecraft:repair_cost"], &["RepairCost"]),
    PathMapEntry::new(&["minecraft:enchantments"], &["Enchantments"]).with_aliases(&[Alias {
        legacy: "lvl",
        structured: "level",
    }]),
    PathMapEntry::new(&["minecraft:stored_enchantments"], &["StoredEnchantments"]).with_aliases(&[
        Alias {
            legacy: "lvl",
            structured: "level",
        },
    ]),
    PathMapEntry::new(&["minecraft:profile"], &["SkullOwner"]).with_aliases(&[
        Alias {
            legacy: "Name",
            structured: "name",
        },
        Alias {
            legacy: "Id",
            structured: "id",
        },
        Alias {
            legacy: "Properties",
            structured: "properties",
        },
    ]),
    PathMapEntry::new(&["minecraft:block_entity_data"], &["BlockEntityTag"]),
    PathMapEntry::new(&["minecraft:lock"], &["BlockEntityTag", "Lock"]),
];

/// Moves every field a [`PathMap`] knows about between its legacy path and
/// its component path when a migration crosses
/// [`SchemaVersion::COMPONENTS`]. Unmapped fields stay where they are.
pub struct ComponentPaths {
    map: PathMap,
}

struct Move {
    /// Legacy or structured prefix matched by the map.
    prefix: Path,
    target: Path,
    value: TagValue,
}

impl ComponentPaths {
    pub fn new(map: PathMap) -> Self {
        Self { map }
    }

    pub fn item_paths() -> Self {
        Self::new(PathMap::from_table(ITEM_PATHS))
    }

    pub fn map(&self) -> &PathMap {
        &self.map
    }

    fn relocate(
        &self,
        tree: &mut TagValue,
        to_structured: bool,
        ctx: &MigrationContext<'_>,
    ) -> Result<()> {
        let mut moves = Vec::new();
        for leaf in navigator::leaf_paths(tree) {
            // Trees are item data without the top-level marker, and the
            // output must not gain one.
            let translation = if to_structured {
                self.map.match_structured(0, 1, leaf.as_slice())?
            } else {
                self.map.match_legacy(0, 1, leaf.as_slice())?
            };
            let Some(translation) = translation else {
                continue;
            };
            let Some(value) = navigator::get(tree, leaf.as_slice()).cloned() else {
                continue;
            };
            moves.push(Move {
                prefix: Path::from_segments(leaf.as_slice()[..translation.consumed].to_vec()),
                target: translation.path,
                value,
            });
        }
        if moves.is_empty() {
            return Ok(());
        }

        for m in &moves {
            navigator::remove(tree, m.prefix.as_slice());
        }
        for m in &moves {
            navigator::prune_empty(tree, m.prefix.as_slice());
        }
        let moved = moves.len();
        for m in moves {
            if !navigator::set(tree, m.value, m.target.as_slice()) {
                warn!(
                    object_id = ctx.object_id,
                    path = %m.target,
                    "could not place relocated field"
                );
            }
        }
        debug!(object_id = ctx.object_id, moved, to_structured, "relocated fields");
        Ok(())
    }
}

impl Migrator for ComponentPaths {
    fn name(&self) -> &str {
        "component-paths"
    }

    fn max_version(&self) -> SchemaVersion {
        SchemaVersion::COMPONENTS
    }

    fn upgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if ctx.crosses(SchemaVersion::COMPONENTS) {
            self.relocate(tree, true, ctx)?;
        }
        Ok(())
    }

    fn downgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if ctx.crosses(SchemaVersion::COMPONENTS) {
            self.relocate(tree, false, ctx)?;
        }
        Ok(())
    }
}
