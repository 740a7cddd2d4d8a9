use tagshift_core::navigator;
use tagshift_core::{Compound, SchemaVersion, TagList, TagType, TagValue, path};
use tracing::debug;

use super::STASHED_ENCHANTMENTS_KEY;
use crate::error::Result;
use crate::migrator::{MigrationContext, Migrator};

/// Numeric enchantment ids used before the flattening.
pub const LEGACY_ENCHANTMENTS: &[(i16, &str)] = &[
    (0, "minecraft:protection"),
    (1, "minecraft:fire_protection"),
    (2, "minecraft:feather_falling"),
    (3, "minecraft:blast_protection"),
    (4, "minecraft:projectile_protection"),
    (5, "minecraft:respiration"),
    (6, "minecraft:aqua_affinity"),
    (7, "minecraft:thorns"),
    (8, "minecraft:depth_strider"),
    (9, "minecraft:frost_walker"),
    (10, "minecraft:binding_curse"),
    (16, "minecraft:sharpness"),
    (17, "minecraft:smite"),
    (18, "minecraft:bane_of_arthropods"),
    (19, "minecraft:knockback"),
    (20, "minecraft:fire_aspect"),
    (21, "minecraft:looting"),
    (22, "minecraft:sweeping"),
    (32, "minecraft:efficiency"),
    (33, "minecraft:silk_touch"),
    (34, "minecraft:unbreaking"),
    (35, "minecraft:fortune"),
    (48, "minecraft:power"),
    (49, "minecraft:punch"),
    (50, "minecraft:flame"),
    (51, "minecraft:infinity"),
    (61, "minecraft:luck_of_the_sea"),
    (62, "minecraft:lure"),
    (70, "minecraft:mending"),
    (71, "minecraft:vanishing_curse"),
];

/// (legacy key, key after the flattening)
const ENCHANTMENT_LISTS: &[(&str, &str)] = &[
    ("ench", "Enchantments"),
    ("StoredEnchantments", "StoredEnchantments"),
];

/// Enchantment lists switch from numeric ids under `ench` to namespaced
/// ids under `Enchantments` at [`SchemaVersion::FLATTENING`]. Stored
/// enchantments on books keep their key but change id form.
///
/// Enchantments with no numeric id are moved to a recovery compound on
/// downgrade and put back on the next upgrade.
pub struct EnchantmentIds {
    table: Vec<(i16, String)>,
}

impl EnchantmentIds {
    pub fn with_table(table: &[(i16, &str)]) -> Self {
        Self {
            table: table
                .iter()
                .map(|(id, name)| (*id, (*name).to_string()))
                .collect(),
        }
    }

    fn name_of(&self, id: i64) -> Option<&str> {
        self.table
            .iter()
            .find(|(numeric, _)| i64::from(*numeric) == id)
            .map(|(_, name)| name.as_str())
    }

    fn id_of(&self, name: &str) -> Option<i16> {
        self.table
            .iter()
            .find(|(_, known)| known == name)
            .map(|(numeric, _)| *numeric)
    }

    fn upgrade_list(&self, tree: &mut TagValue, legacy_key: &str, modern_key: &str) {
        let source = take_list(tree, legacy_key);
        let found = source.is_some();
        let mut converted = source.unwrap_or_default();
        for entry in converted.iter_mut() {
            let Some(id) = entry.get("id").and_then(TagValue::as_i64) else {
                continue;
            };
            match self.name_of(id) {
                Some(name) => {
                    let name = TagValue::String(name.to_string());
                    navigator::set(entry, name, path!["id"].as_slice());
                }
                None => debug!(id, "unknown enchantment id, left numeric"),
            }
        }

        let stash_path = path![STASHED_ENCHANTMENTS_KEY, legacy_key];
        if let Some(TagValue::List(stashed)) = navigator::take(tree, stash_path.as_slice()) {
            let mut leftover = TagList::new();
            for entry in stashed.into_values() {
                if let Err(entry) = push_or_return(&mut converted, entry) {
                    leftover.push(entry);
                }
            }
            if leftover.is_empty() {
                navigator::prune_empty(tree, stash_path.as_slice());
            } else {
                navigator::set(tree, TagValue::List(leftover), stash_path.as_slice());
            }
        }

        if found || !converted.is_empty() {
            navigator::set(tree, TagValue::List(converted), path![modern_key].as_slice());
        }
    }

    fn downgrade_list(&self, tree: &mut TagValue, legacy_key: &str, modern_key: &str) {
        let Some(mut list) = take_list(tree, modern_key) else {
            return;
        };
        let mut stashed = Vec::new();
        for entry in list.iter_mut() {
            let name = entry.get("id").and_then(TagValue::as_str).map(str::to_string);
            let Some(name) = name else {
                continue;
            };
            match self.id_of(&name) {
                Some(id) => {
                    navigator::set(entry, TagValue::Short(id), path!["id"].as_slice());
                }
                None => {
                    debug!(enchantment = %name, "no numeric id, stashing");
                    stashed.push(entry.clone());
                }
            }
        }
        list.retain(|entry| !stashed.contains(entry));
        navigator::set(tree, TagValue::List(list), path![legacy_key].as_slice());
        for entry in stashed {
            navigator::add(tree, entry, path![STASHED_ENCHANTMENTS_KEY, legacy_key].as_slice());
        }
    }
}

/// Appends `entry`, handing it back when the list holds another type.
fn push_or_return(list: &mut TagList, entry: TagValue) -> std::result::Result<(), TagValue> {
    if list.accepts(entry.tag_type()) {
        list.push(entry);
        Ok(())
    } else {
        Err(entry)
    }
}

impl Default for EnchantmentIds {
    fn default() -> Self {
        Self::with_table(LEGACY_ENCHANTMENTS)
    }
}

/// Remove and return the list of compounds at `key`. Anything else,
/// including lists of other element types, is left in place.
fn take_list(tree: &mut TagValue, key: &str) -> Option<TagList> {
    let holds_entries = match tree.get(key) {
        Some(TagValue::List(list)) => {
            list.element_type().is_none_or(|ty| ty == TagType::Compound)
        }
        _ => false,
    };
    if !holds_entries {
        return None;
    }
    match tree.as_compound_mut().and_then(|map: &mut Compound| map.shift_remove(key)) {
        Some(TagValue::List(list)) => Some(list),
        _ => None,
    }
}

impl Migrator for EnchantmentIds {
    fn name(&self) -> &str {
        "enchantment-ids"
    }

    fn max_version(&self) -> SchemaVersion {
        SchemaVersion::FLATTENING
    }

    fn upgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if ctx.crosses(SchemaVersion::FLATTENING) {
            for (legacy_key, modern_key) in ENCHANTMENT_LISTS {
                self.upgrade_list(tree, legacy_key, modern_key);
            }
        }
        Ok(())
    }

    fn downgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        if ctx.crosses(SchemaVersion::FLATTENING) {
            for (legacy_key, modern_key) in ENCHANTMENT_LISTS {
                self.downgrade_list(tree, legacy_key, modern_key);
            }
        }
        Ok(())
    }
}
