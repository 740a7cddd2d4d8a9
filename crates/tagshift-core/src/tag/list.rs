//! Homogeneous tag lists.

use super::{TagType, TagValue};

/// An ordered list whose elements all share one [`TagType`].
///
/// The element type is fixed by the first inserted element and kept even
/// after the list is emptied. A list that never held anything is untyped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagList {
    element: Option<TagType>,
    items: Vec<TagValue>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list that already records its element type.
    pub fn typed(element: TagType) -> Self {
        Self {
            element: Some(element),
            items: Vec::new(),
        }
    }

    /// Build a list from values, failing if they are not all of one type.
    pub fn from_values(values: Vec<TagValue>) -> Option<Self> {
        let mut list = Self::new();
        for value in values {
            if !list.push(value) {
                return None;
            }
        }
        Some(list)
    }

    /// Element type, or `None` for an untyped empty list.
    pub fn element_type(&self) -> Option<TagType> {
        self.element
    }

    /// Whether `ty` may be stored in this list.
    pub fn accepts(&self, ty: TagType) -> bool {
        self.element.is_none_or(|element| element == ty)
    }

    /// Append a value. Returns `false` and leaves the list unchanged when the
    /// value's type differs from the established element type.
    pub fn push(&mut self, value: TagValue) -> bool {
        let ty = value.tag_type();
        if !self.accepts(ty) {
            return false;
        }
        self.element = Some(ty);
        self.items.push(value);
        true
    }

    /// Replace the element at `index`. Fails on type mismatch or when the
    /// index is out of bounds.
    pub fn replace(&mut self, index: usize, value: TagValue) -> bool {
        if index >= self.items.len() || !self.accepts(value.tag_type()) {
            return false;
        }
        self.items[index] = value;
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<TagValue> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&TagValue> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TagValue> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TagValue> {
        self.items.iter()
    }

    /// Mutable access to the elements. The slice cannot change the list's
    /// length, and callers must keep element types unchanged.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TagValue> {
        self.items.iter_mut()
    }

    pub fn last_mut(&mut self) -> Option<&mut TagValue> {
        self.items.last_mut()
    }

    /// Keep only the elements matching `keep`. The element type is retained.
    pub fn retain(&mut self, keep: impl FnMut(&TagValue) -> bool) {
        self.items.retain(keep);
    }

    pub fn into_values(self) -> Vec<TagValue> {
        self.items
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a TagValue;
    type IntoIter = std::slice::Iter<'a, TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for TagList {
    type Item = TagValue;
    type IntoIter = std::vec::IntoIter<TagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
