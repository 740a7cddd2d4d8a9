//! Tagshift core: typed tag trees and the machinery migrators are built on.
//!
//! - [`tag`]: the [`TagValue`] tree model (compounds, homogeneous lists, scalars, arrays)
//! - [`path`]: mixed key/index paths and the [`path!`] macro
//! - [`navigator`]: get/set/add/remove over trees with auto-vivification
//! - [`codec`]: type-prefixed binary encoding, gzip framing and batch transport
//! - [`pathmap`]: bidirectional legacy path ⇄ structured path dictionary
//! - [`version`]: ordinal schema versions embedded in trees

pub mod codec;
pub mod error;
pub mod navigator;
pub mod path;
pub mod pathmap;
pub mod tag;
pub mod version;

pub use codec::{CodecOptions, TagCodec};
pub use error::{Result, TagError};
pub use path::{Path, PathSegment};
pub use pathmap::{Alias, PathMap, PathMapEntry, Translation};
pub use tag::{Compound, FromTag, TagList, TagType, TagValue};
pub use version::SchemaVersion;
