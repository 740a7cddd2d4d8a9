//! Item id translation across the flattening.
//!
//! Before [`SchemaVersion::FLATTENING`] an item was identified by a legacy
//! id (numeric, or a name such as `minecraft:wool`) plus a damage value
//! that selected a variant. Afterwards each variant has its own id.
//!
//! [`SchemaVersion::FLATTENING`]: tagshift_core::SchemaVersion::FLATTENING

use crate::cache::{CacheSettings, IdCache};

/// One legacy item variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyItem {
    pub numeric: u16,
    pub name: &'static str,
    /// Variant selected by the damage value; `None` when damage is
    /// durability and any value maps to the same item.
    pub damage: Option<i16>,
    pub flattened: &'static str,
}

const fn variant(
    numeric: u16,
    name: &'static str,
    damage: i16,
    flattened: &'static str,
) -> LegacyItem {
    LegacyItem {
        numeric,
        name,
        damage: Some(damage),
        flattened,
    }
}

const fn plain(numeric: u16, name: &'static str, flattened: &'static str) -> LegacyItem {
    LegacyItem {
        numeric,
        name,
        damage: None,
        flattened,
    }
}

pub const LEGACY_ITEMS: &[LegacyItem] = &[
    variant(1, "minecraft:stone", 0, "minecraft:stone"),
    variant(1, "minecraft:stone", 1, "minecraft:granite"),
    variant(1, "minecraft:stone", 2, "minecraft:polished_granite"),
    variant(1, "minecraft:stone", 3, "minecraft:diorite"),
    variant(1, "minecraft:stone", 4, "minecraft:polished_diorite"),
    variant(1, "minecraft:stone", 5, "minecraft:andesite"),
    variant(1, "minecraft:stone", 6, "minecraft:polished_andesite"),
    plain(2, "minecraft:grass", "minecraft:grass_block"),
    variant(3, "minecraft:dirt", 0, "minecraft:dirt"),
    variant(3, "minecraft:dirt", 1, "minecraft:coarse_dirt"),
    variant(3, "minecraft:dirt", 2, "minecraft:podzol"),
    plain(4, "minecraft:cobblestone", "minecraft:cobblestone"),
    variant(5, "minecraft:planks", 0, "minecraft:oak_planks"),
    variant(5, "minecraft:planks", 1, "minecraft:spruce_planks"),
    variant(5, "minecraft:planks", 2, "minecraft:birch_planks"),
    variant(5, "minecraft:planks", 3, "minecraft:jungle_planks"),
    variant(5, "minecraft:planks", 4, "minecraft:acacia_planks"),
    variant(5, "minecraft:planks", 5, "minecraft:dark_oak_planks"),
    variant(17, "minecraft:log", 0, "minecraft:oak_log"),
    variant(17, "minecraft:log", 1, "minecraft:spruce_log"),
    variant(17, "minecraft:log", 2, "minecraft:birch_log"),
    variant(17, "minecraft:log", 3, "minecraft:jungle_log"),
    plain(23, "minecraft:dispenser", "minecraft:dispenser"),
    variant(35, "minecraft:wool", 0, "minecraft:white_wool"),
    variant(35, "minecraft:wool", 1, "minecraft:orange_wool"),
    variant(35, "minecraft:wool", 2, "minecraft:magenta_wool"),
    variant(35, "minecraft:wool", 3, "minecraft:light_blue_wool"),
    variant(35, "minecraft:wool", 4, "minecraft:yellow_wool"),
    variant(35, "minecraft:wool", 5, "minecraft:lime_wool"),
    variant(35, "minecraft:wool", 6, "minecraft:pink_wool"),
    variant(35, "minecraft:wool", 7, "minecraft:gray_wool"),
    variant(35, "minecraft:wool", 8, "minecraft:light_gray_wool"),
    variant(35, "minecraft:wool", 9, "minecraft:cyan_wool"),
    variant(35, "minecraft:wool", 10, "minecraft:purple_wool"),
    variant(35, "minecraft:wool", 11, "minecraft:blue_wool"),
    variant(35, "minecraft:wool", 12, "minecraft:brown_wool"),
    variant(35, "minecraft:wool", 13, "minecraft:green_wool"),
    variant(35, "minecraft:wool", 14, "minecraft:red_wool"),
    variant(35, "minecraft:wool", 15, "minecraft:black_wool"),
    plain(54, "minecraft:chest", "minecraft:chest"),
    plain(146, "minecraft:trapped_chest", "minecraft:trapped_chest"),
    plain(154, "minecraft:hopper", "minecraft:hopper"),
    plain(158, "minecraft:dropper", "minecraft:dropper"),
    plain(261, "minecraft:bow", "minecraft:bow"),
    plain(264, "minecraft:diamond", "minecraft:diamond"),
    plain(265, "minecraft:iron_ingot", "minecraft:iron_ingot"),
    plain(266, "minecraft:gold_ingot", "minecraft:gold_ingot"),
    plain(267, "minecraft:iron_sword", "minecraft:iron_sword"),
    plain(276, "minecraft:diamond_sword", "minecraft:diamond_sword"),
    plain(278, "minecraft:diamond_pickaxe", "minecraft:diamond_pickaxe"),
    plain(280, "minecraft:stick", "minecraft:stick"),
    variant(397, "minecraft:skull", 0, "minecraft:skeleton_skull"),
    variant(397, "minecraft:skull", 1, "minecraft:wither_skeleton_skull"),
    variant(397, "minecraft:skull", 2, "minecraft:zombie_head"),
    variant(397, "minecraft:skull", 3, "minecraft:player_head"),
    variant(397, "minecraft:skull", 4, "minecraft:creeper_head"),
    variant(397, "minecraft:skull", 5, "minecraft:dragon_head"),
    plain(403, "minecraft:enchanted_book", "minecraft:enchanted_book"),
];

/// Items that first appeared at or after the flattening and have no
/// legacy id.
const POST_FLATTENING_ITEMS: &[&str] = &[
    "minecraft:trident",
    "minecraft:crossbow",
    "minecraft:honey_bottle",
    "minecraft:netherite_ingot",
    "minecraft:netherite_sword",
    "minecraft:netherite_pickaxe",
    "minecraft:copper_ingot",
    "minecraft:amethyst_shard",
    "minecraft:spyglass",
];

/// How an item was identified before the flattening.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LegacyId {
    Numeric(i64),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    pub id: String,
    /// The damage value selected the variant and is now part of the id.
    pub consumed_damage: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Downgraded {
    Legacy {
        name: &'static str,
        damage: Option<i16>,
    },
    /// Same id on both sides of the flattening.
    Unchanged,
    /// No legacy id can express this item.
    Unrepresentable,
}

/// Memoised translation between legacy and flattened item ids.
pub struct ItemIds {
    up: IdCache<(LegacyId, i16), Option<Flattened>>,
    down: IdCache<String, Downgraded>,
}

impl ItemIds {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            up: IdCache::new(settings),
            down: IdCache::new(settings),
        }
    }

    /// Flattened id for a legacy id and damage, `None` for unknown numeric
    /// ids. Unknown names are already namespaced and pass through.
    pub fn flatten(&self, id: &LegacyId, damage: i16) -> Option<Flattened> {
        self.up
            .get_or_compute((id.clone(), damage), |(id, damage)| flatten_uncached(id, *damage))
    }

    pub fn downgrade(&self, id: &str) -> Downgraded {
        self.down.get_or_compute(id.to_string(), |id| downgrade_uncached(id))
    }

    pub fn flatten_cache(&self) -> &IdCache<(LegacyId, i16), Option<Flattened>> {
        &self.up
    }
}

impl Default for ItemIds {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

fn flatten_uncached(id: &LegacyId, damage: i16) -> Option<Flattened> {
    let name = match id {
        LegacyId::Numeric(numeric) => {
            LEGACY_ITEMS
                .iter()
                .find(|item| i64::from(item.numeric) == *numeric)?
                .name
        }
        LegacyId::Named(name) => name.as_str(),
    };
    let rows = || LEGACY_ITEMS.iter().filter(move |item| item.name == name);
    let row = rows()
        .find(|item| item.damage == Some(damage))
        .or_else(|| rows().find(|item| item.damage.is_none()))
        .or_else(|| rows().find(|item| item.damage == Some(0)));
    match row {
        Some(item) => Some(Flattened {
            id: item.flattened.to_string(),
            consumed_damage: item.damage.is_some(),
        }),
        None => match id {
            LegacyId::Named(name) => Some(Flattened {
                id: name.clone(),
                consumed_damage: false,
            }),
            LegacyId::Numeric(_) => None,
        },
    }
}

fn downgrade_uncached(id: &str) -> Downgraded {
    if let Some(item) = LEGACY_ITEMS.iter().find(|item| item.flattened == id) {
        return Downgraded::Legacy {
            name: item.name,
            damage: item.damage,
        };
    }
    if POST_FLATTENING_ITEMS.contains(&id) {
        Downgraded::Unrepresentable
    } else {
        Downgraded::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LegacyId::Numeric(35), 14, "minecraft:red_wool", true)]
    #[case(LegacyId::Named("minecraft:wool".into()), 14, "minecraft:red_wool", true)]
    #[case(LegacyId::Numeric(276), 12, "minecraft:diamond_sword", false)]
    #[case(LegacyId::Named("minecraft:stone".into()), 6, "minecraft:polished_andesite", true)]
    #[case(LegacyId::Named("minecraft:wool".into()), 99, "minecraft:white_wool", true)]
    #[case(LegacyId::Named("minecraft:apple".into()), 0, "minecraft:apple", false)]
    fn test_flatten(
        #[case] id: LegacyId,
        #[case] damage: i16,
        #[case] expected: &str,
        #[case] consumed: bool,
    ) {
        let ids = ItemIds::default();
        assert_eq!(
            ids.flatten(&id, damage),
            Some(Flattened {
                id: expected.to_string(),
                consumed_damage: consumed,
            })
        );
    }

    #[test]
    fn test_unknown_numeric_id() {
        assert_eq!(ItemIds::default().flatten(&LegacyId::Numeric(9999), 0), None);
    }

    #[test]
    fn test_downgrade() {
        let ids = ItemIds::default();
        assert_eq!(
            ids.downgrade("minecraft:player_head"),
            Downgraded::Legacy {
                name: "minecraft:skull",
                damage: Some(3)
            }
        );
        assert_eq!(ids.downgrade("minecraft:apple"), Downgraded::Unchanged);
        assert_eq!(ids.downgrade("minecraft:netherite_ingot"), Downgraded::Unrepresentable);
    }

    #[test]
    fn test_lookups_are_memoised() {
        let ids = ItemIds::default();
        for _ in 0..3 {
            ids.flatten(&LegacyId::Numeric(35), 1);
        }
        let stats = ids.flatten_cache().stats();
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }
}
