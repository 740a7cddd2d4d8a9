//! Tag tree model.
//!
//! A [`TagValue`] is one node of a typed tree: fixed-width scalars, strings,
//! primitive arrays, homogeneous [`TagList`]s and keyed [`Compound`]s.
//! Numeric variants never widen into each other, so `Int(1)` and `Long(1)`
//! compare unequal.

mod convert;
mod list;
mod snbt;

use indexmap::IndexMap;

pub use convert::FromTag;
pub use list::TagList;

/// Keyed node of a tag tree. Insertion order is kept so that encoding and
/// display are deterministic.
pub type Compound = IndexMap<String, TagValue>;

/// Variant discriminant of a tag, with the stable wire id of each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TagType {
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagType {
    /// Wire id written before every payload. `0` is reserved for the end marker.
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<TagType> {
        Some(match id {
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            TagType::Byte => "Byte",
            TagType::Short => "Short",
            TagType::Int => "Int",
            TagType::Long => "Long",
            TagType::Float => "Float",
            TagType::Double => "Double",
            TagType::ByteArray => "ByteArray",
            TagType::String => "String",
            TagType::List => "List",
            TagType::Compound => "Compound",
            TagType::IntArray => "IntArray",
            TagType::LongArray => "LongArray",
        }
    }

    /// Whether values of this type can hold further tags.
    pub const fn is_container(self) -> bool {
        matches!(self, TagType::List | TagType::Compound)
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of a tag tree.
///
/// Trees are single-owner: cloning is always a deep copy and equality is
/// structural.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    List(TagList),
    Compound(Compound),
}

impl TagValue {
    /// An empty compound, the usual root of a tree.
    pub fn compound() -> Self {
        TagValue::Compound(Compound::new())
    }

    /// An empty, untyped list.
    pub fn list() -> Self {
        TagValue::List(TagList::new())
    }

    pub fn tag_type(&self) -> TagType {
        match self {
            TagValue::Byte(_) => TagType::Byte,
            TagValue::Short(_) => TagType::Short,
            TagValue::Int(_) => TagType::Int,
            TagValue::Long(_) => TagType::Long,
            TagValue::Float(_) => TagType::Float,
            TagValue::Double(_) => TagType::Double,
            TagValue::String(_) => TagType::String,
            TagValue::ByteArray(_) => TagType::ByteArray,
            TagValue::IntArray(_) => TagType::IntArray,
            TagValue::LongArray(_) => TagType::LongArray,
            TagValue::List(_) => TagType::List,
            TagValue::Compound(_) => TagType::Compound,
        }
    }

    /// Stable small integer identifying the variant.
    pub fn type_id(&self) -> u8 {
        self.tag_type().id()
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, TagValue::Compound(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TagValue::List(_))
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            TagValue::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            TagValue::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&TagList> {
        match self {
            TagValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut TagList> {
        match self {
            TagValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of any integral scalar, without widening the stored tag.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TagValue::Byte(v) => Some(i64::from(*v)),
            TagValue::Short(v) => Some(i64::from(*v)),
            TagValue::Int(v) => Some(i64::from(*v)),
            TagValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating view of any numeric scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Float(v) => Some(f64::from(*v)),
            TagValue::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Child lookup on a compound; `None` for any other variant.
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.as_compound().and_then(|map| map.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TagValue> {
        self.as_compound_mut().and_then(|map| map.get_mut(key))
    }

    /// Whether this node is an empty compound or list.
    pub fn is_empty_container(&self) -> bool {
        match self {
            TagValue::Compound(map) => map.is_empty(),
            TagValue::List(list) => list.is_empty(),
            _ => false,
        }
    }
}

impl Default for TagValue {
    fn default() -> Self {
        TagValue::compound()
    }
}
