//! Boundary between tag trees and the objects of a host application.
//!
//! The host supplies a [`HostBridge`] that can pull a tree out of one of
//! its objects and build a new object from a tree. Everything else
//! (reading the embedded version, running migrators, stamping) happens on
//! the tree.

use anyhow::Context;
use tagshift_core::{SchemaVersion, TagCodec, TagType, TagValue};
use tagshift_migrate::{MigrationEngine, MigrationReport};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("host object data must be a compound, found {found}")]
    NotACompound { found: TagType },

    #[error("host rejected tree: {0}")]
    Rejected(String),
}

pub trait HostBridge {
    type Object;

    /// Identifier migrators use to decide whether they apply, e.g. an item id.
    fn object_id(&self, object: &Self::Object) -> String;

    /// The tree carried by `object`, or `None` when it carries no data.
    fn extract(&self, object: &Self::Object) -> Result<Option<TagValue>, BridgeError>;

    /// A copy of `template` carrying `tree` as its data.
    fn build(&self, template: &Self::Object, tree: TagValue) -> Result<Self::Object, BridgeError>;

    /// Version the running host expects.
    fn current_schema_version(&self) -> SchemaVersion;
}

/// Migrates the data of a host object to the host's current version.
///
/// Returns `None` when the object carries no data, otherwise the rebuilt
/// object and what the engine did.
pub fn migrate_host_object<B: HostBridge>(
    bridge: &B,
    engine: &MigrationEngine,
    object: &B::Object,
) -> crate::Result<Option<(B::Object, MigrationReport)>> {
    let Some(mut tree) = bridge.extract(object)? else {
        return Ok(None);
    };
    let id = bridge.object_id(object);
    let report = engine
        .migrate(&mut tree, &id, bridge.current_schema_version())
        .with_context(|| format!("Failed to migrate host object {id}"))?;
    debug!(
        object_id = %id,
        state = %report.state,
        applied = report.applied.len(),
        "migrated host object"
    );
    let rebuilt = bridge.build(object, tree)?;
    Ok(Some((rebuilt, report)))
}

/// Packs the data of host objects into a Base64 batch string. Objects
/// without data are skipped.
pub fn export_batch<B: HostBridge>(
    bridge: &B,
    codec: &TagCodec,
    objects: &[B::Object],
) -> crate::Result<String> {
    let mut trees = Vec::with_capacity(objects.len());
    for object in objects {
        if let Some(tree) = bridge.extract(object)? {
            trees.push(tree);
        }
    }
    let encoded = codec.encode_batch_base64(&trees)?;
    Ok(encoded)
}

/// Decodes a Base64 batch, migrates each tree to the host's version and
/// builds one object per tree from `template`.
pub fn import_batch<B: HostBridge>(
    bridge: &B,
    engine: &MigrationEngine,
    codec: &TagCodec,
    template: &B::Object,
    text: &str,
) -> crate::Result<Vec<B::Object>> {
    let id = bridge.object_id(template);
    let target = bridge.current_schema_version();
    let trees = codec.decode_batch_base64(text).context("Failed to decode batch")?;
    let mut objects = Vec::with_capacity(trees.len());
    for mut tree in trees {
        engine.migrate(&mut tree, &id, target)?;
        objects.push(bridge.build(template, tree)?);
    }
    Ok(objects)
}

/// A host object held by [`MemoryBridge`].
#[derive(Debug, Clone, PartialEq)]
pub struct HostItem {
    pub id: String,
    pub data: Option<TagValue>,
}

impl HostItem {
    pub fn new(id: impl Into<String>, data: Option<TagValue>) -> Self {
        Self { id: id.into(), data }
    }
}

/// Bridge over plain [`HostItem`]s, for tests and tools that have no real
/// host.
#[derive(Debug, Clone, Copy)]
pub struct MemoryBridge {
    current: SchemaVersion,
}

impl MemoryBridge {
    pub fn new(current: SchemaVersion) -> Self {
        Self { current }
    }
}

impl Default for MemoryBridge {
    fn default() -> Self {
        Self::new(SchemaVersion::LATEST)
    }
}

impl HostBridge for MemoryBridge {
    type Object = HostItem;

    fn object_id(&self, object: &HostItem) -> String {
        object.id.clone()
    }

    fn extract(&self, object: &HostItem) -> Result<Option<TagValue>, BridgeError> {
        match &object.data {
            None => Ok(None),
            Some(tree @ TagValue::Compound(_)) => Ok(Some(tree.clone())),
            Some(other) => Err(BridgeError::NotACompound {
                found: other.tag_type(),
            }),
        }
    }

    fn build(&self, template: &HostItem, tree: TagValue) -> Result<HostItem, BridgeError> {
        if !tree.is_compound() {
            let found = tree.tag_type();
            return Err(BridgeError::Rejected(format!("expected a compound, got {found}")));
        }
        Ok(HostItem::new(template.id.clone(), Some(tree)))
    }

    fn current_schema_version(&self) -> SchemaVersion {
        self.current
    }
}
