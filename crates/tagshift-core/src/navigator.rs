//! Path-addressed access to tag trees.
//!
//! Reads never fail: a missing key, a wrong container kind or an index out
//! of bounds all yield `None`. Writes report success as a `bool` and leave
//! the tree untouched when they cannot be applied.
//!
//! `set` and `add` auto-vivify missing intermediate containers. The kind of
//! container created for segment `i` is chosen by segment `i + 1`: an index
//! creates a list, a key creates a compound.

use crate::path::{Path, PathSegment};
use crate::tag::{Compound, FromTag, TagList, TagType, TagValue};

/// Container kind to create when a segment is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vivify {
    List,
    Compound,
}

impl Vivify {
    fn for_next(segment: &PathSegment) -> Self {
        if segment.is_index() {
            Vivify::List
        } else {
            Vivify::Compound
        }
    }

    fn empty(self) -> TagValue {
        match self {
            Vivify::List => TagValue::list(),
            Vivify::Compound => TagValue::compound(),
        }
    }

    fn tag_type(self) -> TagType {
        match self {
            Vivify::List => TagType::List,
            Vivify::Compound => TagType::Compound,
        }
    }
}

/// Look up the node at `path`.
pub fn get<'a>(tree: &'a TagValue, path: &[PathSegment]) -> Option<&'a TagValue> {
    let mut current = tree;
    for segment in path {
        current = match (segment, current) {
            (PathSegment::Key(key), TagValue::Compound(map)) => map.get(key)?,
            (PathSegment::Index(index), TagValue::List(list)) => list.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable lookup of the node at `path`, without creating anything.
pub fn get_mut<'a>(tree: &'a mut TagValue, path: &[PathSegment]) -> Option<&'a mut TagValue> {
    let mut current = tree;
    for segment in path {
        current = step(current, segment, None)?;
    }
    Some(current)
}

/// Look up a value and convert it, allowing numeric conversions that fit.
pub fn get_as<T: FromTag>(tree: &TagValue, path: &[PathSegment]) -> Option<T> {
    get(tree, path).and_then(T::from_tag)
}

/// Look up a value only if it is stored as exactly the variant `T` maps to.
pub fn get_exact<T: FromTag>(tree: &TagValue, path: &[PathSegment]) -> Option<T> {
    get(tree, path).and_then(T::from_tag_exact)
}

pub fn has(tree: &TagValue, path: &[PathSegment]) -> bool {
    get(tree, path).is_some()
}

/// Variant of the node at `path`.
pub fn type_at(tree: &TagValue, path: &[PathSegment]) -> Option<TagType> {
    get(tree, path).map(TagValue::tag_type)
}

/// Store `value` at `path`, or remove the entry when `value` is `None`.
///
/// Missing intermediate containers are created. An index equal to the
/// current list length appends; any larger index fails. Returns `false`
/// without mutating when the root is not a compound, an existing node has
/// the wrong container kind, a list would become heterogeneous, or there
/// is nothing to remove.
pub fn set(tree: &mut TagValue, value: impl Into<Option<TagValue>>, path: &[PathSegment]) -> bool {
    let value = value.into();
    let Some((last, parents)) = path.split_last() else {
        return false;
    };
    if !tree.is_compound() {
        return false;
    }
    // Removal never creates containers.
    let Some(value) = value else {
        return match get_mut(tree, parents) {
            Some(parent) => remove_child(parent, last),
            None => false,
        };
    };
    if !can_walk(tree, parents, Vivify::for_next(last))
        || !can_store(tree, parents, last, value.tag_type())
    {
        return false;
    }
    match walk_vivify(tree, parents, Vivify::for_next(last)) {
        Some(parent) => store_child(parent, last, value),
        None => false,
    }
}

/// Remove the entry at `path`. Returns whether anything was removed.
pub fn remove(tree: &mut TagValue, path: &[PathSegment]) -> bool {
    set(tree, None, path)
}

/// Remove the entry at `path` and hand it back.
pub fn take(tree: &mut TagValue, path: &[PathSegment]) -> Option<TagValue> {
    let (last, parents) = path.split_last()?;
    match (last, get_mut(tree, parents)?) {
        (PathSegment::Key(key), TagValue::Compound(map)) => map.shift_remove(key),
        (PathSegment::Index(index), TagValue::List(list)) => list.remove(*index),
        _ => None,
    }
}

/// Append `value` to the list at `path`, creating the list and any missing
/// parents. Fails when the target exists but is not a list, or when the
/// value's type differs from the list's element type.
pub fn add(tree: &mut TagValue, value: TagValue, path: &[PathSegment]) -> bool {
    if !tree.is_compound() || path.is_empty() {
        return false;
    }
    if !can_walk(tree, path, Vivify::List) {
        return false;
    }
    match get(tree, path) {
        Some(TagValue::List(list)) if !list.accepts(value.tag_type()) => return false,
        Some(TagValue::List(_)) | None => {}
        Some(_) => return false,
    }
    match walk_vivify(tree, path, Vivify::List) {
        Some(TagValue::List(list)) => list.push(value),
        _ => false,
    }
}

/// Paths of every leaf in the tree.
///
/// Leaves are scalars, arrays, empty containers, and lists whose elements
/// are not containers (those are treated as one value).
pub fn leaf_paths(tree: &TagValue) -> Vec<Path> {
    let mut out = Vec::new();
    collect_leaves(tree, &mut Path::new(), &mut out);
    out
}

fn collect_leaves(node: &TagValue, prefix: &mut Path, out: &mut Vec<Path>) {
    match node {
        TagValue::Compound(map) if !map.is_empty() => {
            for (key, child) in map {
                prefix.push(key.as_str());
                collect_leaves(child, prefix, out);
                prefix.segments.pop();
            }
        }
        TagValue::List(list)
            if !list.is_empty() && list.element_type().is_some_and(TagType::is_container) =>
        {
            for (index, child) in list.iter().enumerate() {
                prefix.push(index);
                collect_leaves(child, prefix, out);
                prefix.segments.pop();
            }
        }
        _ => out.push(prefix.clone()),
    }
}

/// Remove empty compounds and lists along `path`, deepest first, stopping
/// at the first non-empty one. The root itself is never removed.
pub fn prune_empty(tree: &mut TagValue, path: &[PathSegment]) {
    for end in (1..=path.len()).rev() {
        let prefix = &path[..end];
        match get(tree, prefix) {
            Some(node) if node.is_empty_container() => {
                remove(tree, prefix);
            }
            Some(_) => return,
            None => {}
        }
    }
}

/// Check, without mutating, that `path` can be walked with vivification and
/// every existing node on it has the container kind the walk expects.
fn can_walk(tree: &TagValue, path: &[PathSegment], last_kind: Vivify) -> bool {
    let mut current = Some(tree);
    for (i, segment) in path.iter().enumerate() {
        let kind = path.get(i + 1).map(Vivify::for_next).unwrap_or(last_kind);
        let Some(node) = current else {
            // Below a vivified container everything is new and empty.
            if segment.as_index().is_some_and(|index| index != 0) {
                return false;
            }
            continue;
        };
        current = match (segment, node) {
            (PathSegment::Key(key), TagValue::Compound(map)) => map.get(key),
            (PathSegment::Index(index), TagValue::List(list)) => {
                if *index < list.len() {
                    list.get(*index)
                } else if *index == list.len() && list.accepts(kind.tag_type()) {
                    None
                } else {
                    return false;
                }
            }
            _ => return false,
        };
        if current.is_some_and(|next| next.tag_type() != kind.tag_type()) {
            return false;
        }
    }
    true
}

/// Check that `value_type` can be stored under `last` once `parents` exist.
fn can_store(
    tree: &TagValue,
    parents: &[PathSegment],
    last: &PathSegment,
    value_type: TagType,
) -> bool {
    match (get(tree, parents), last) {
        (Some(TagValue::Compound(_)), PathSegment::Key(_)) => true,
        (Some(TagValue::List(list)), PathSegment::Index(index)) => {
            *index <= list.len() && list.accepts(value_type)
        }
        (Some(_), _) => false,
        (None, PathSegment::Key(_)) => true,
        (None, PathSegment::Index(index)) => *index == 0,
    }
}

fn walk_vivify<'a>(
    tree: &'a mut TagValue,
    path: &[PathSegment],
    last_kind: Vivify,
) -> Option<&'a mut TagValue> {
    let mut current = tree;
    for (i, segment) in path.iter().enumerate() {
        let kind = path.get(i + 1).map(Vivify::for_next).unwrap_or(last_kind);
        current = step(current, segment, Some(kind))?;
    }
    Some(current)
}

/// Descend one segment, creating the child as `create` when it is missing.
fn step<'a>(
    node: &'a mut TagValue,
    segment: &PathSegment,
    create: Option<Vivify>,
) -> Option<&'a mut TagValue> {
    match (segment, node) {
        (PathSegment::Key(key), TagValue::Compound(map)) => {
            if map.contains_key(key) {
                map.get_mut(key)
            } else {
                let kind = create?;
                Some(map.entry(key.clone()).or_insert_with(|| kind.empty()))
            }
        }
        (PathSegment::Index(index), TagValue::List(list)) => {
            if *index < list.len() {
                list.get_mut(*index)
            } else if *index == list.len() {
                let kind = create?;
                if list.push(kind.empty()) {
                    list.last_mut()
                } else {
                    None
                }
            } else {
                None
            }
        }
        _ => None,
    }
}

fn store_child(parent: &mut TagValue, segment: &PathSegment, value: TagValue) -> bool {
    match (segment, parent) {
        (PathSegment::Key(key), TagValue::Compound(map)) => {
            map.insert(key.clone(), value);
            true
        }
        (PathSegment::Index(index), TagValue::List(list)) => {
            if *index == list.len() {
                list.push(value)
            } else {
                list.replace(*index, value)
            }
        }
        _ => false,
    }
}

fn remove_child(parent: &mut TagValue, segment: &PathSegment) -> bool {
    match (segment, parent) {
        (PathSegment::Key(key), TagValue::Compound(map)) => map.shift_remove(key).is_some(),
        (PathSegment::Index(index), TagValue::List(list)) => list.remove(*index).is_some(),
        _ => false,
    }
}

/// Convenience constructor for a compound root holding `entries`.
pub fn compound_of<K: Into<String>>(entries: impl IntoIterator<Item = (K, TagValue)>) -> TagValue {
    TagValue::Compound(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<Compound>(),
    )
}

/// Convenience constructor for a list; `None` when the values are mixed.
pub fn list_of(values: Vec<TagValue>) -> Option<TagValue> {
    TagList::from_values(values).map(TagValue::List)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn sample() -> TagValue {
        compound_of([
            ("a", list_of(vec![TagValue::Int(1), TagValue::Int(2), TagValue::Int(3)]).unwrap()),
            ("name", TagValue::String("x".into())),
        ])
    }

    #[test]
    fn test_get_out_of_bounds_is_none() {
        let tree = sample();
        assert_eq!(get(&tree, path!["a", 5usize].as_slice()), None);
        assert_eq!(get(&tree, path!["a", 2usize].as_slice()), Some(&TagValue::Int(3)));
    }

    #[test]
    fn test_get_wrong_container_is_none() {
        let tree = sample();
        assert_eq!(get(&tree, path!["name", "x"].as_slice()), None);
        assert_eq!(get(&tree, path!["a", "x"].as_slice()), None);
        assert_eq!(get(&tree, path!["missing"].as_slice()), None);
    }

    #[test]
    fn test_set_vivifies_by_next_segment() {
        let mut tree = TagValue::compound();
        assert!(set(&mut tree, TagValue::Int(7), path!["a", 0usize, "b"].as_slice()));

        let a = get(&tree, path!["a"].as_slice()).unwrap();
        assert!(a.is_list());
        let first = get(&tree, path!["a", 0usize].as_slice()).unwrap();
        assert!(first.is_compound());
        assert_eq!(get(&tree, path!["a", 0usize, "b"].as_slice()), Some(&TagValue::Int(7)));
    }

    #[test]
    fn test_set_overwrites() {
        let mut tree = sample();
        assert!(set(&mut tree, TagValue::String("y".into()), path!["name"].as_slice()));
        assert_eq!(get_exact::<String>(&tree, path!["name"].as_slice()), Some("y".into()));
    }

    #[test]
    fn test_set_wrong_intermediate_type_fails_without_mutation() {
        let mut tree = sample();
        let before = tree.clone();
        assert!(!set(&mut tree, TagValue::Int(1), path!["name", "inner"].as_slice()));
        assert!(!set(&mut tree, TagValue::Int(1), path!["a", 9usize].as_slice()));
        assert!(!set(&mut tree, TagValue::Int(1), path!["x", 3usize, "y"].as_slice()));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_set_list_index_checks_homogeneity() {
        let mut tree = sample();
        assert!(set(&mut tree, TagValue::Int(9), path!["a", 0usize].as_slice()));
        assert!(!set(&mut tree, TagValue::Long(9), path!["a", 1usize].as_slice()));
        assert!(set(&mut tree, TagValue::Int(4), path!["a", 3usize].as_slice()));
        let list = get(&tree, path!["a"].as_slice()).and_then(TagValue::as_list);
        assert_eq!(list.map(TagList::len), Some(4));
    }

    #[test]
    fn test_set_none_removes() {
        let mut tree = sample();
        assert!(set(&mut tree, None, path!["name"].as_slice()));
        assert!(!has(&tree, path!["name"].as_slice()));
        assert!(remove(&mut tree, path!["a", 0usize].as_slice()));
        assert_eq!(get(&tree, path!["a", 0usize].as_slice()), Some(&TagValue::Int(2)));
        assert!(!remove(&mut tree, path!["nothing", "here"].as_slice()));
        assert!(!has(&tree, path!["nothing"].as_slice()));
    }

    #[test]
    fn test_set_requires_compound_root() {
        let mut tree = TagValue::Int(1);
        assert!(!set(&mut tree, TagValue::Int(2), path!["a"].as_slice()));
        assert!(!set(&mut TagValue::compound(), TagValue::Int(2), &[]));
    }

    #[test]
    fn test_add_appends_and_vivifies() {
        let mut tree = TagValue::compound();
        let lore_path = path!["display", "Lore"];
        assert!(add(&mut tree, TagValue::String("one".into()), lore_path.as_slice()));
        assert!(add(&mut tree, TagValue::String("two".into()), lore_path.as_slice()));
        let lore = get(&tree, lore_path.as_slice()).and_then(TagValue::as_list).unwrap();
        assert_eq!(lore.len(), 2);
        assert_eq!(lore.element_type(), Some(TagType::String));
    }

    #[test]
    fn test_add_rejects_mismatched_type() {
        let mut tree = sample();
        let before = tree.clone();
        assert!(!add(&mut tree, TagValue::Byte(1), path!["a"].as_slice()));
        assert!(!add(&mut tree, TagValue::Int(1), path!["name"].as_slice()));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_get_as_converts_but_get_exact_does_not() {
        let tree = compound_of([("count", TagValue::Byte(3))]);
        assert_eq!(get_as::<i32>(&tree, path!["count"].as_slice()), Some(3));
        assert_eq!(get_exact::<i32>(&tree, path!["count"].as_slice()), None);
        assert_eq!(get_exact::<i8>(&tree, path!["count"].as_slice()), Some(3));
    }

    #[test]
    fn test_take_returns_removed_value() {
        let mut tree = sample();
        assert_eq!(take(&mut tree, path!["name"].as_slice()), Some(TagValue::String("x".into())));
        assert_eq!(take(&mut tree, path!["a", 0usize].as_slice()), Some(TagValue::Int(1)));
        assert_eq!(take(&mut tree, path!["name"].as_slice()), None);
        assert_eq!(take(&mut tree, &[]), None);
    }

    #[test]
    fn test_leaf_paths_and_prune() {
        let mut tree = TagValue::compound();
        set(&mut tree, TagValue::String("n".into()), path!["display", "Name"].as_slice());
        add(&mut tree, TagValue::String("l".into()), path!["display", "Lore"].as_slice());
        set(&mut tree, TagValue::Short(1), path!["ench", 0usize, "id"].as_slice());

        let leaves: Vec<String> = leaf_paths(&tree).iter().map(Path::to_string).collect();
        assert_eq!(leaves, vec!["display.Name", "display.Lore", "ench.0.id"]);

        remove(&mut tree, path!["ench", 0usize, "id"].as_slice());
        prune_empty(&mut tree, path!["ench", 0usize, "id"].as_slice());
        assert!(!has(&tree, path!["ench"].as_slice()));
        assert!(has(&tree, path!["display"].as_slice()));
    }
}
