//! Tagshift migrations
//!
//! Moves tag trees between schema versions. A [`MigrationEngine`] owns an
//! ordered [`MigrationRegistry`] of [`Migrator`]s; calling
//! [`MigrationEngine::migrate`] reads the version embedded in a tree and
//! runs every applicable migrator up or down to the requested version.
//!
//! # Usage
//!
//! ```rust
//! use tagshift_core::navigator::{compound_of, list_of};
//! use tagshift_core::{SchemaVersion, TagValue};
//! use tagshift_migrate::MigrationEngine;
//!
//! let engine = MigrationEngine::with_builtins();
//! let mut tree = compound_of([
//!     ("ench", list_of(vec![compound_of([("id", TagValue::Short(34))])]).unwrap()),
//!     ("DataVersion", TagValue::Int(0)),
//! ]);
//! engine.migrate_to_current(&mut tree, "minecraft:diamond_sword").unwrap();
//! assert!(tree.get("minecraft:enchantments").is_some());
//! ```

pub mod builtins;
pub mod cache;
pub mod engine;
pub mod error;
pub mod migrator;
pub mod registry;

pub use cache::{CacheSettings, IdCache};
pub use engine::{EngineSettings, MigrationEngine, MigrationReport, MigrationState};
pub use error::{MigrationError, Result};
pub use migrator::{MigrationContext, Migrator};
pub use registry::MigrationRegistry;
