//! Item stacks stored inside other items (shulker boxes, chests with
//! block entity data).
//!
//! Two layouts exist. Before [`SchemaVersion::COMPONENTS`]:
//!
//! ```text
//! BlockEntityTag.Items: [{Slot: 0b, id: "minecraft:stone", Count: 1b, Damage: 0s, tag: {..}}]
//! ```
//!
//! and from it on:
//!
//! ```text
//! minecraft:container: [{slot: 0, item: {id: "minecraft:stone", count: 1, components: {..}}}]
//! ```
//!
//! Each stack's data compound is migrated as a nested tree through the
//! engine, so stacks inside stacks follow along.

use tagshift_core::navigator;
use tagshift_core::{Compound, Path, SchemaVersion, TagType, TagValue, path};
use tracing::{debug, warn};

use super::items::{Downgraded, ItemIds, LegacyId};
use super::{ORIGINAL_ID_KEY, PLACEHOLDER_ITEM_ID};
use crate::cache::CacheSettings;
use crate::error::Result;
use crate::migrator::{MigrationContext, Migrator};

const DAMAGE_COMPONENT: &str = "minecraft:damage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Legacy,
    Components,
}

impl Layout {
    fn of(version: SchemaVersion) -> Self {
        if version >= SchemaVersion::COMPONENTS {
            Layout::Components
        } else {
            Layout::Legacy
        }
    }

    fn items_path(self) -> Path {
        match self {
            Layout::Legacy => path!["BlockEntityTag", "Items"],
            Layout::Components => path!["minecraft:container"],
        }
    }
}

/// One item stack, independent of layout.
#[derive(Debug)]
struct Stack {
    slot: Option<i64>,
    /// String id, or a numeric id from before names were stored.
    id: TagValue,
    count: i64,
    damage: Option<i64>,
    data: Compound,
    /// Keys next to the stack fields that no layout knows about.
    extra: Compound,
}

impl Stack {
    /// Split `entry` into its fields. Entries that are not stacks are
    /// handed back untouched.
    fn parse(entry: TagValue, layout: Layout) -> std::result::Result<Stack, TagValue> {
        let TagValue::Compound(mut map) = entry else {
            return Err(entry);
        };
        match layout {
            Layout::Legacy => {
                if !map.contains_key("id") {
                    return Err(TagValue::Compound(map));
                }
                let slot = map.shift_remove("Slot").and_then(|v| v.as_i64());
                let id = map.shift_remove("id").unwrap_or_default();
                let count = map.shift_remove("Count").and_then(|v| v.as_i64()).unwrap_or(1);
                let damage = map.shift_remove("Damage").and_then(|v| v.as_i64());
                let data = take_compound(&mut map, "tag");
                Ok(Stack {
                    slot,
                    id,
                    count,
                    damage,
                    data,
                    extra: map,
                })
            }
            Layout::Components => {
                let has_item = map
                    .get("item")
                    .is_some_and(|item| item.get("id").is_some());
                if !has_item {
                    return Err(TagValue::Compound(map));
                }
                let slot = map.shift_remove("slot").and_then(|v| v.as_i64());
                let mut item = take_compound(&mut map, "item");
                let id = item.shift_remove("id").unwrap_or_default();
                let count = item.shift_remove("count").and_then(|v| v.as_i64()).unwrap_or(1);
                let mut data = take_compound(&mut item, "components");
                let damage = data.shift_remove(DAMAGE_COMPONENT).and_then(|v| v.as_i64());
                Ok(Stack {
                    slot,
                    id,
                    count,
                    damage,
                    data,
                    extra: map,
                })
            }
        }
    }

    fn id_string(&self) -> String {
        id_string(&self.id)
    }

    fn emit(self, layout: Layout) -> TagValue {
        let mut map = Compound::new();
        match layout {
            Layout::Legacy => {
                if let Some(slot) = self.slot {
                    map.insert("Slot".into(), TagValue::Byte(to_byte(slot)));
                }
                map.insert("id".into(), self.id);
                map.insert("Count".into(), TagValue::Byte(to_byte(self.count)));
                if let Some(damage) = self.damage {
                    map.insert("Damage".into(), TagValue::Short(to_short(damage)));
                }
                if !self.data.is_empty() {
                    map.insert("tag".into(), TagValue::Compound(self.data));
                }
            }
            Layout::Components => {
                if let Some(slot) = self.slot {
                    map.insert("slot".into(), TagValue::Int(to_int(slot)));
                }
                let mut item = Compound::new();
                item.insert("id".into(), self.id);
                item.insert("count".into(), TagValue::Int(to_int(self.count)));
                let mut components = self.data;
                if let Some(damage) = self.damage.filter(|d| *d != 0) {
                    components.insert(DAMAGE_COMPONENT.into(), TagValue::Int(to_int(damage)));
                }
                if !components.is_empty() {
                    item.insert("components".into(), TagValue::Compound(components));
                }
                map.insert("item".into(), TagValue::Compound(item));
            }
        }
        map.extend(self.extra);
        TagValue::Compound(map)
    }
}

/// String id, or the decimal form of a numeric one.
fn id_string(id: &TagValue) -> String {
    match id {
        TagValue::String(id) => id.clone(),
        other => other.as_i64().map(|n| n.to_string()).unwrap_or_default(),
    }
}

fn take_compound(map: &mut Compound, key: &str) -> Compound {
    match map.shift_remove(key) {
        Some(TagValue::Compound(inner)) => inner,
        Some(other) => {
            // Not a compound: keep it where it was.
            map.insert(key.to_string(), other);
            Compound::new()
        }
        None => Compound::new(),
    }
}

fn to_byte(value: i64) -> i8 {
    value.clamp(i64::from(i8::MIN), i64::from(i8::MAX)) as i8
}

fn to_short(value: i64) -> i16 {
    value.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

fn to_int(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Migrates item stacks held in container items, moving them between the
/// legacy and component layouts and flattening their ids.
pub struct ContainerItems {
    ids: ItemIds,
}

impl ContainerItems {
    pub fn new(cache: CacheSettings) -> Self {
        Self {
            ids: ItemIds::new(cache),
        }
    }

    pub fn ids(&self) -> &ItemIds {
        &self.ids
    }

    fn migrate_items(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        let source = Layout::of(ctx.from);
        let target = Layout::of(ctx.to);
        let source_path = source.items_path();
        let holds_stacks = match navigator::get(tree, source_path.as_slice()) {
            Some(TagValue::List(list)) => {
                list.element_type().is_none_or(|ty| ty == TagType::Compound)
            }
            _ => false,
        };
        if !holds_stacks {
            return Ok(());
        }
        if source == target && !ctx.crosses(SchemaVersion::FLATTENING) {
            return self.migrate_data_in_place(tree, &source_path, source, ctx);
        }
        let Some(TagValue::List(mut list)) = navigator::take(tree, source_path.as_slice()) else {
            return Ok(());
        };

        for entry in list.iter_mut() {
            match Stack::parse(std::mem::take(entry), source) {
                Ok(mut stack) => {
                    self.migrate_stack(&mut stack, ctx)?;
                    *entry = stack.emit(target);
                }
                Err(other) => *entry = other,
            }
        }

        let target_path = target.items_path();
        if !navigator::set(tree, TagValue::List(list), target_path.as_slice()) {
            warn!(
                object_id = ctx.object_id,
                path = %target_path,
                "could not store migrated items"
            );
        }
        if source != target {
            navigator::prune_empty(tree, source_path.as_slice());
        }
        Ok(())
    }

    /// Nothing about the stacks themselves changes, so only their data
    /// compounds are migrated and every other field keeps its exact form.
    fn migrate_data_in_place(
        &self,
        tree: &mut TagValue,
        items_path: &Path,
        layout: Layout,
        ctx: &MigrationContext<'_>,
    ) -> Result<()> {
        let Some(TagValue::List(list)) = navigator::get_mut(tree, items_path.as_slice()) else {
            return Ok(());
        };
        for entry in list.iter_mut() {
            let (id, data_path) = match layout {
                Layout::Legacy => (entry.get("id"), path!["tag"]),
                Layout::Components => (
                    entry.get("item").and_then(|item| item.get("id")),
                    path!["item", "components"],
                ),
            };
            let Some(id) = id.map(id_string) else {
                continue;
            };
            let data = navigator::get_mut(entry, data_path.as_slice()).filter(|d| d.is_compound());
            if let Some(data) = data {
                ctx.migrate_nested(data, &id)?;
            }
        }
        Ok(())
    }

    fn migrate_stack(&self, stack: &mut Stack, ctx: &MigrationContext<'_>) -> Result<()> {
        if ctx.is_upgrade() {
            if ctx.crosses(SchemaVersion::FLATTENING) {
                self.flatten(stack);
            }
            self.migrate_data(stack, ctx)
        } else {
            self.migrate_data(stack, ctx)?;
            if ctx.crosses(SchemaVersion::FLATTENING) {
                self.unflatten(stack);
            }
            Ok(())
        }
    }

    fn migrate_data(&self, stack: &mut Stack, ctx: &MigrationContext<'_>) -> Result<()> {
        let id = stack.id_string();
        let mut data = TagValue::Compound(std::mem::take(&mut stack.data));
        let result = ctx.migrate_nested(&mut data, &id);
        if let TagValue::Compound(map) = data {
            stack.data = map;
        }
        result.map(|_| ())
    }

    fn flatten(&self, stack: &mut Stack) {
        if let Some(TagValue::String(original)) = stack.data.shift_remove(ORIGINAL_ID_KEY) {
            debug!(id = %original, "restored stashed item id");
            stack.id = TagValue::String(original);
            stack.damage = None;
            return;
        }
        let legacy = match &stack.id {
            TagValue::String(name) => LegacyId::Named(name.clone()),
            other => match other.as_i64() {
                Some(numeric) => LegacyId::Numeric(numeric),
                None => return,
            },
        };
        let damage = stack.damage.map(to_short).unwrap_or(0);
        match self.ids.flatten(&legacy, damage) {
            Some(flattened) => {
                stack.id = TagValue::String(flattened.id);
                if flattened.consumed_damage {
                    stack.damage = None;
                }
            }
            None => warn!(id = ?legacy, "unknown legacy item id, left unchanged"),
        }
    }

    fn unflatten(&self, stack: &mut Stack) {
        let Some(id) = stack.id.as_str().map(str::to_string) else {
            return;
        };
        match self.ids.downgrade(&id) {
            Downgraded::Legacy { name, damage } => {
                stack.id = TagValue::String(name.to_string());
                if let Some(damage) = damage {
                    stack.damage = Some(i64::from(damage));
                }
            }
            Downgraded::Unchanged => {}
            Downgraded::Unrepresentable => {
                debug!(
                    id = %id,
                    placeholder = PLACEHOLDER_ITEM_ID,
                    "item has no legacy id, stashing"
                );
                stack.data.insert(ORIGINAL_ID_KEY.to_string(), TagValue::String(id));
                stack.id = TagValue::String(PLACEHOLDER_ITEM_ID.to_string());
                stack.damage = Some(0);
            }
        }
    }
}

impl Default for ContainerItems {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl Migrator for ContainerItems {
    fn name(&self) -> &str {
        "container-items"
    }

    fn upgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        self.migrate_items(tree, ctx)
    }

    fn downgrade(&self, tree: &mut TagValue, ctx: &MigrationContext<'_>) -> Result<()> {
        self.migrate_items(tree, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::SkullProfile;
    use crate::engine::{EngineSettings, MigrationEngine};
    use crate::error::MigrationError;
    use crate::registry::MigrationRegistry;
    use tagshift_core::navigator::{compound_of, get, get_as, list_of};

    fn engine() -> MigrationEngine {
        let mut registry = MigrationRegistry::new();
        registry
            .register(SkullProfile::new())
            .register(ContainerItems::default());
        MigrationEngine::new(registry)
    }

    fn legacy_stack(slot: i8, id: TagValue, damage: i16, tag: Option<TagValue>) -> TagValue {
        let mut entries = vec![
            ("Slot", TagValue::Byte(slot)),
            ("id", id),
            ("Count", TagValue::Byte(1)),
            ("Damage", TagValue::Short(damage)),
        ];
        if let Some(tag) = tag {
            entries.push(("tag", tag));
        }
        compound_of(entries)
    }

    fn shulker(items: Vec<TagValue>) -> TagValue {
        compound_of([(
            "BlockEntityTag",
            compound_of([("Items", list_of(items).unwrap())]),
        )])
    }

    #[test]
    fn test_nested_ids_flatten() {
        let engine = engine();
        let mut tree = shulker(vec![
            legacy_stack(0, TagValue::Short(35), 14, None),
            legacy_stack(1, TagValue::String("minecraft:diamond_sword".into()), 7, None),
        ]);
        engine
            .migrate_from(
                &mut tree,
                "minecraft:shulker_box",
                SchemaVersion::LEGACY,
                SchemaVersion::FLATTENING,
            )
            .unwrap();

        let first = path!["BlockEntityTag", "Items", 0usize];
        assert_eq!(
            get(&tree, first.child("id").as_slice()),
            Some(&TagValue::String("minecraft:red_wool".into()))
        );
        assert!(get(&tree, first.child("Damage").as_slice()).is_none());
        let second = path!["BlockEntityTag", "Items", 1usize];
        assert_eq!(get_as::<i16>(&tree, second.child("Damage").as_slice()), Some(7));
    }

    #[test]
    fn test_recursion_reaches_nested_skulls() {
        let engine = engine();
        let head_tag = compound_of([("SkullOwner", TagValue::String("Notch".into()))]);
        let mut tree = shulker(vec![legacy_stack(
            0,
            TagValue::String("minecraft:skull".into()),
            3,
            Some(head_tag),
        )]);
        engine
            .migrate_from(
                &mut tree,
                "minecraft:shulker_box",
                SchemaVersion(100),
                SchemaVersion(200),
            )
            .unwrap();
        let owner = path!["BlockEntityTag", "Items", 0usize, "tag", "SkullOwner", "Name"];
        assert_eq!(
            get(&tree, owner.as_slice()),
            Some(&TagValue::String("Notch".into()))
        );
    }

    #[test]
    fn test_components_layout_round_trip() {
        let engine = engine();
        let original = shulker(vec![legacy_stack(
            3,
            TagValue::String("minecraft:diamond_sword".into()),
            9,
            Some(compound_of([("RepairCost", TagValue::Int(1))])),
        )]);
        let mut tree = original.clone();
        engine
            .migrate_from(
                &mut tree,
                "minecraft:shulker_box",
                SchemaVersion::FLATTENING,
                SchemaVersion::LATEST,
            )
            .unwrap();

        assert!(get(&tree, path!["BlockEntityTag"].as_slice()).is_none());
        let stack = path!["minecraft:container", 0usize];
        assert_eq!(get(&tree, stack.child("slot").as_slice()), Some(&TagValue::Int(3)));
        let components = stack.child("item").child("components");
        assert_eq!(
            get(&tree, components.child(DAMAGE_COMPONENT).as_slice()),
            Some(&TagValue::Int(9))
        );

        engine
            .migrate(&mut tree, "minecraft:shulker_box", SchemaVersion::FLATTENING)
            .unwrap();
        tree.as_compound_mut().unwrap().shift_remove("DataVersion");
        assert_eq!(tree, original);
    }

    #[test]
    fn test_unrepresentable_item_is_stashed_and_restored() {
        let engine = engine();
        let mut tree = shulker(vec![legacy_stack(
            0,
            TagValue::String("minecraft:netherite_ingot".into()),
            0,
            None,
        )]);
        engine
            .migrate_from(
                &mut tree,
                "minecraft:shulker_box",
                SchemaVersion::FLATTENING,
                SchemaVersion::LEGACY,
            )
            .unwrap();
        let stack = path!["BlockEntityTag", "Items", 0usize];
        assert_eq!(
            get(&tree, stack.child("id").as_slice()),
            Some(&TagValue::String(PLACEHOLDER_ITEM_ID.into()))
        );
        assert_eq!(
            get(&tree, stack.child("tag").child(ORIGINAL_ID_KEY).as_slice()),
            Some(&TagValue::String("minecraft:netherite_ingot".into()))
        );

        engine
            .migrate(&mut tree, "minecraft:shulker_box", SchemaVersion::FLATTENING)
            .unwrap();
        assert_eq!(
            get(&tree, stack.child("id").as_slice()),
            Some(&TagValue::String("minecraft:netherite_ingot".into()))
        );
        assert!(get(&tree, stack.child("tag").as_slice()).is_none());
    }

    fn versioned(mut tree: TagValue, version: SchemaVersion) -> TagValue {
        tree.as_compound_mut()
            .unwrap()
            .insert("DataVersion".into(), version.to_tag());
        tree
    }

    #[test]
    fn test_items_that_are_not_stacks_are_kept() {
        let numbers = list_of(vec![TagValue::Int(1), TagValue::Int(2)]).unwrap();
        let items = compound_of([("Items", numbers.clone())]);
        let original = versioned(compound_of([("BlockEntityTag", items)]), SchemaVersion(2000));
        let items_path = path!["BlockEntityTag", "Items"];

        let mut tree = original.clone();
        MigrationEngine::with_builtins()
            .migrate(&mut tree, "minecraft:shulker_box", SchemaVersion(2100))
            .unwrap();
        assert_eq!(get(&tree, items_path.as_slice()), Some(&numbers));

        // A layout change must not empty the list either.
        let mut tree = original;
        engine()
            .migrate(&mut tree, "minecraft:shulker_box", SchemaVersion::LATEST)
            .unwrap();
        assert_eq!(get(&tree, items_path.as_slice()), Some(&numbers));
        assert!(get(&tree, path!["minecraft:container"].as_slice()).is_none());
    }

    #[test]
    fn test_stack_fields_survive_a_span_without_layout_change() {
        let engine = MigrationEngine::with_builtins();
        let stack = compound_of([
            ("Slot", TagValue::Byte(0)),
            ("id", TagValue::String("minecraft:stone".into())),
            ("Count", TagValue::Int(5)),
        ]);
        let original = versioned(shulker(vec![stack]), SchemaVersion(2000));
        let mut tree = original.clone();
        engine
            .migrate(&mut tree, "minecraft:shulker_box", SchemaVersion(2100))
            .unwrap();
        assert_eq!(tree, versioned(original, SchemaVersion(2100)));
    }

    #[test]
    fn test_nesting_past_the_limit_fails() {
        let mut registry = MigrationRegistry::new();
        registry.register(ContainerItems::default());
        let settings = EngineSettings {
            max_depth: 2,
            ..Default::default()
        };
        let engine = MigrationEngine::with_settings(registry, settings);

        let innermost = compound_of([("RepairCost", TagValue::Int(1))]);
        let mut tree = innermost;
        for _ in 0..3 {
            let id = TagValue::String("minecraft:shulker_box".into());
            let stack = legacy_stack(0, id, 0, Some(tree));
            tree = shulker(vec![stack]);
        }

        let result = engine.migrate_from(
            &mut tree,
            "minecraft:shulker_box",
            SchemaVersion(100),
            SchemaVersion(200),
        );
        assert!(matches!(result, Err(MigrationError::DepthLimitExceeded(2))));
    }
}
