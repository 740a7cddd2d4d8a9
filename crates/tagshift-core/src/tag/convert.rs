//! Conversions between native Rust values and tags.
//!
//! Construction is type-exact: every native type maps to exactly one
//! variant. `bool` is stored as a `Byte` of 0 or 1.

use std::any::Any;

use super::{Compound, TagList, TagValue};
use crate::error::{Result, TagError};

macro_rules! impl_from_native {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for TagValue {
                fn from(value: $native) -> Self {
                    TagValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_native! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<i8> => ByteArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    TagList => List,
    Compound => Compound,
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Byte(i8::from(value))
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_string())
    }
}

impl TagValue {
    /// Build a tag from a value whose type is only known at runtime.
    ///
    /// Host bridges hand over loosely typed values; anything without an exact
    /// tag representation fails with [`TagError::UnsupportedValueType`].
    pub fn from_any<T: Any>(value: &T) -> Result<TagValue> {
        let any = value as &dyn Any;

        macro_rules! try_downcast {
            ($($native:ty),*) => {
                $(
                    if let Some(v) = any.downcast_ref::<$native>() {
                        return Ok(TagValue::from(v.clone()));
                    }
                )*
            };
        }

        try_downcast!(
            i8, i16, i32, i64, f32, f64, bool, String, Vec<i8>, Vec<i32>, Vec<i64>, TagList,
            Compound
        );
        if let Some(v) = any.downcast_ref::<&str>() {
            return Ok(TagValue::from(*v));
        }
        if let Some(v) = any.downcast_ref::<TagValue>() {
            return Ok(v.clone());
        }

        Err(TagError::UnsupportedValueType {
            type_name: std::any::type_name::<T>(),
        })
    }
}

/// Extraction of native values from tags.
///
/// `from_tag_exact` only accepts the variant the native type maps to;
/// `from_tag` may convert between numeric variants when the value fits.
pub trait FromTag: Sized {
    fn from_tag_exact(tag: &TagValue) -> Option<Self>;

    fn from_tag(tag: &TagValue) -> Option<Self> {
        Self::from_tag_exact(tag)
    }
}

macro_rules! impl_from_tag_integer {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromTag for $native {
                fn from_tag_exact(tag: &TagValue) -> Option<Self> {
                    match tag {
                        TagValue::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                fn from_tag(tag: &TagValue) -> Option<Self> {
                    tag.as_i64().and_then(|v| <$native>::try_from(v).ok())
                }
            }
        )*
    };
}

impl_from_tag_integer! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
}

impl FromTag for f32 {
    fn from_tag_exact(tag: &TagValue) -> Option<Self> {
        match tag {
            TagValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn from_tag(tag: &TagValue) -> Option<Self> {
        tag.as_f64().map(|v| v as f32)
    }
}

impl FromTag for f64 {
    fn from_tag_exact(tag: &TagValue) -> Option<Self> {
        match tag {
            TagValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    fn from_tag(tag: &TagValue) -> Option<Self> {
        tag.as_f64()
    }
}

impl FromTag for bool {
    fn from_tag_exact(tag: &TagValue) -> Option<Self> {
        match tag {
            TagValue::Byte(v) => Some(*v != 0),
            _ => None,
        }
    }

    fn from_tag(tag: &TagValue) -> Option<Self> {
        tag.as_i64().map(|v| v != 0)
    }
}

impl FromTag for String {
    fn from_tag_exact(tag: &TagValue) -> Option<Self> {
        tag.as_str().map(str::to_string)
    }
}

macro_rules! impl_from_tag_owned {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromTag for $native {
                fn from_tag_exact(tag: &TagValue) -> Option<Self> {
                    match tag {
                        TagValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_tag_owned! {
    Vec<i8> => ByteArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    TagList => List,
    Compound => Compound,
}

impl FromTag for TagValue {
    fn from_tag_exact(tag: &TagValue) -> Option<Self> {
        Some(tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_is_type_exact() {
        assert_eq!(TagValue::from(1i8), TagValue::Byte(1));
        assert_eq!(TagValue::from(1i16), TagValue::Short(1));
        assert_eq!(TagValue::from(1i32), TagValue::Int(1));
        assert_eq!(TagValue::from(1i64), TagValue::Long(1));
        assert_eq!(TagValue::from(true), TagValue::Byte(1));
        assert_eq!(TagValue::from("a"), TagValue::String("a".into()));
    }

    #[test]
    fn test_from_any_accepts_known_types() {
        assert_eq!(TagValue::from_any(&7i64).unwrap(), TagValue::Long(7));
        assert_eq!(TagValue::from_any(&vec![1i32, 2]).unwrap(), TagValue::IntArray(vec![1, 2]));
        assert_eq!(TagValue::from_any(&"x").unwrap(), TagValue::String("x".into()));
    }

    #[test]
    fn test_from_any_rejects_unknown_types() {
        let err = TagValue::from_any(&7u64).unwrap_err();
        assert!(matches!(err, TagError::UnsupportedValueType { type_name } if type_name == "u64"));
        assert!(TagValue::from_any(&vec!["a"]).is_err());
    }

    #[test]
    fn test_exact_extraction_does_not_convert() {
        let tag = TagValue::Short(12);
        assert_eq!(i16::from_tag_exact(&tag), Some(12));
        assert_eq!(i32::from_tag_exact(&tag), None);
        assert_eq!(i32::from_tag(&tag), Some(12));
        assert_eq!(i8::from_tag(&TagValue::Int(300)), None);
        assert_eq!(f64::from_tag(&TagValue::Int(3)), Some(3.0));
        assert_eq!(bool::from_tag_exact(&TagValue::Byte(1)), Some(true));
        assert_eq!(bool::from_tag_exact(&TagValue::Int(1)), None);
    }
}
