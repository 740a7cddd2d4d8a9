use cucumber::{given, then, when, World};
use std::path::PathBuf;
use tagshift_common::config::TagshiftConfig;
use tagshift_core::navigator;
use tagshift_core::{Path, SchemaVersion, TagCodec, TagValue};
use tagshift_migrate::builtins::{ComponentPaths, EnchantmentIds};
use tagshift_migrate::{MigrationEngine, MigrationRegistry, MigrationState};

#[derive(Debug, World)]
pub struct TestWorld {
    tree: TagValue,
    remembered: Option<TagValue>,
    decoded: Option<TagValue>,
    batch: Vec<TagValue>,
    last_ok: Option<bool>,
    last_state: Option<MigrationState>,
    enchantments: Vec<(i16, String)>,
    input_path: PathBuf,
    temp_dir: Option<tempfile::TempDir>,
    loaded_config: Option<TagshiftConfig>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            tree: TagValue::compound(),
            remembered: None,
            decoded: None,
            batch: Vec::new(),
            last_ok: None,
            last_state: None,
            enchantments: Vec::new(),
            input_path: PathBuf::new(),
            temp_dir: None,
            loaded_config: None,
        }
    }
}

impl TestWorld {
    fn engine(&self) -> MigrationEngine {
        let table: Vec<(i16, &str)> = self
            .enchantments
            .iter()
            .map(|(id, name)| (*id, name.as_str()))
            .collect();
        let mut registry = MigrationRegistry::new();
        registry
            .register(EnchantmentIds::with_table(&table))
            .register(ComponentPaths::item_paths());
        MigrationEngine::new(registry)
    }
}

fn parse_ints(list: &str) -> Vec<i32> {
    list.split(',')
        .map(|part| part.trim().parse().expect("integer list"))
        .collect()
}

// Tree setup

#[given(expr = "an empty compound")]
async fn an_empty_compound(w: &mut TestWorld) {
    w.tree = TagValue::compound();
}

#[given(expr = "the int {int} at {string}")]
async fn the_int_at(w: &mut TestWorld, value: i32, path: String) {
    assert!(navigator::set(&mut w.tree, TagValue::Int(value), Path::parse(&path).as_slice()));
}

#[given(expr = "the string {string} at {string}")]
async fn the_string_at(w: &mut TestWorld, value: String, path: String) {
    assert!(navigator::set(&mut w.tree, TagValue::String(value), Path::parse(&path).as_slice()));
}

#[given(regex = r#"^the ints ([\d, ]+) appended to "([^"]*)"$"#)]
async fn the_ints_appended_to(w: &mut TestWorld, values: String, path: String) {
    let path = Path::parse(&path);
    for value in parse_ints(&values) {
        assert!(navigator::add(&mut w.tree, TagValue::Int(value), path.as_slice()));
    }
}

#[given(expr = "a legacy enchantment with id {int}")]
async fn a_legacy_enchantment(w: &mut TestWorld, id: i16) {
    let entry = navigator::compound_of([("id", TagValue::Short(id))]);
    assert!(navigator::add(&mut w.tree, entry, Path::parse("ench").as_slice()));
}

#[given(expr = "the enchantment table maps {int} to {string}")]
async fn the_enchantment_table_maps(w: &mut TestWorld, id: i16, name: String) {
    w.enchantments.push((id, name));
}

// Path operations

#[when(expr = "I set the int {int} at {string}")]
async fn i_set_the_int(w: &mut TestWorld, value: i32, path: String) {
    let path = Path::parse(&path);
    w.last_ok = Some(navigator::set(&mut w.tree, TagValue::Int(value), path.as_slice()));
}

#[when(expr = "I add the string {string} to {string}")]
async fn i_add_the_string(w: &mut TestWorld, value: String, path: String) {
    let path = Path::parse(&path);
    w.last_ok = Some(navigator::add(&mut w.tree, TagValue::String(value), path.as_slice()));
}

#[then(expr = "the operation should succeed")]
async fn the_operation_should_succeed(w: &mut TestWorld) {
    assert_eq!(w.last_ok, Some(true));
}

#[then(expr = "the operation should fail")]
async fn the_operation_should_fail(w: &mut TestWorld) {
    assert_eq!(w.last_ok, Some(false));
}

#[then(expr = "the type at {string} should be {string}")]
async fn the_type_at(w: &mut TestWorld, path: String, expected: String) {
    let found = navigator::type_at(&w.tree, Path::parse(&path).as_slice()).expect("node exists");
    assert_eq!(found.to_string(), expected);
}

#[then(expr = "there should be nothing at {string}")]
async fn nothing_at(w: &mut TestWorld, path: String) {
    assert!(navigator::get(&w.tree, Path::parse(&path).as_slice()).is_none());
}

#[then(expr = "the int at {string} should be {int}")]
async fn the_int_at_should_be(w: &mut TestWorld, path: String, expected: i32) {
    let found: Option<i32> = navigator::get_as(&w.tree, Path::parse(&path).as_slice());
    assert_eq!(found, Some(expected));
}

#[then(expr = "the string at {string} should be {string}")]
async fn the_string_at_should_be(w: &mut TestWorld, path: String, expected: String) {
    let found: Option<String> = navigator::get_exact(&w.tree, Path::parse(&path).as_slice());
    assert_eq!(found, Some(expected));
}

#[then(expr = "the tree should render as {string}")]
async fn the_tree_should_render_as(w: &mut TestWorld, expected: String) {
    assert_eq!(w.tree.to_string(), expected);
}

// Codec

#[when(expr = "I encode and decode the tree")]
async fn i_encode_and_decode(w: &mut TestWorld) {
    let codec = TagCodec::default();
    let bytes = codec.to_bytes(&w.tree).expect("encode");
    w.decoded = Some(codec.from_bytes(&bytes).expect("decode"));
}

#[then(expr = "the decoded tree should equal the original")]
async fn the_decoded_tree_should_equal(w: &mut TestWorld) {
    assert_eq!(w.decoded.as_ref(), Some(&w.tree));
}

#[then(expr = "the decoded tree should render as {string}")]
async fn the_decoded_tree_should_render_as(w: &mut TestWorld, expected: String) {
    let decoded = w.decoded.as_ref().expect("tree decoded");
    assert_eq!(decoded.to_string(), expected);
}

#[when(expr = "I send {int} copies of the tree through a Base64 batch")]
async fn i_send_copies_through_batch(w: &mut TestWorld, copies: usize) {
    let codec = TagCodec::default();
    let trees = vec![w.tree.clone(); copies];
    let text = codec.encode_batch_base64(&trees).expect("encode batch");
    w.batch = codec.decode_batch_base64(&text).expect("decode batch");
}

#[when(expr = "I decode the batch string {string}")]
async fn i_decode_the_batch_string(w: &mut TestWorld, text: String) {
    w.batch = TagCodec::default().decode_batch_base64(&text).expect("decode batch");
}

#[then(expr = "the batch should hold {int} trees equal to the original")]
async fn the_batch_should_hold(w: &mut TestWorld, count: usize) {
    assert_eq!(w.batch.len(), count);
    assert!(w.batch.iter().all(|tree| *tree == w.tree));
}

// Migration

#[when(expr = "I migrate the tree from version {int} to version {int}")]
async fn i_migrate_from_to(w: &mut TestWorld, from: u32, to: u32) {
    let engine = w.engine();
    let report = engine
        .migrate_from(
            &mut w.tree,
            "minecraft:diamond_sword",
            SchemaVersion(from),
            SchemaVersion(to),
        )
        .expect("migration");
    w.last_state = Some(report.state);
}

#[when(expr = "I migrate the tree to version {int}")]
async fn i_migrate_to(w: &mut TestWorld, to: u32) {
    let engine = w.engine();
    let report = engine
        .migrate(&mut w.tree, "minecraft:diamond_sword", SchemaVersion(to))
        .expect("migration");
    w.last_state = Some(report.state);
}

#[when(expr = "I remember the tree")]
async fn i_remember_the_tree(w: &mut TestWorld) {
    w.remembered = Some(w.tree.clone());
}

#[then(expr = "the tree should equal the remembered tree")]
async fn the_tree_should_equal_remembered(w: &mut TestWorld) {
    assert_eq!(w.remembered.as_ref(), Some(&w.tree));
}

#[then(expr = "the last migration should be {string}")]
async fn the_last_migration_should_be(w: &mut TestWorld, expected: String) {
    let state = w.last_state.expect("a migration ran");
    assert_eq!(format!("{state:?}"), expected);
}

#[then(expr = "the tree version should be {int}")]
async fn the_tree_version_should_be(w: &mut TestWorld, expected: u32) {
    let engine = w.engine();
    assert_eq!(engine.version_of(&w.tree), Some(SchemaVersion(expected)));
}

// Configuration

#[given(expr = "a {string} file with:")]
async fn a_config_file_with(w: &mut TestWorld, filename: String, step: &cucumber::gherkin::Step) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join(&filename);
    let content = step.docstring.as_ref().expect("Docstring required").clone();
    std::fs::write(&file_path, content).expect("Failed to write config file");
    w.input_path = file_path;
    w.temp_dir = Some(dir);
}

#[when(expr = "I load the configuration")]
async fn i_load_configuration(w: &mut TestWorld) {
    let config = TagshiftConfig::load(&w.input_path).expect("config loads");
    w.loaded_config = Some(config);
}

#[then(expr = "the current schema version should be {int}")]
async fn the_current_schema_version(w: &mut TestWorld, expected: u32) {
    let config = w.loaded_config.as_ref().expect("Config not loaded");
    let engine = MigrationEngine::with_settings(
        MigrationRegistry::with_builtin_options(&config.builtin_options()),
        config.engine_settings(),
    );
    assert_eq!(engine.current_version(), SchemaVersion(expected));
}

#[tokio::main]
async fn main() {
    TestWorld::run("tests/features").await;
}
