use crate::vfs::Vfs;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tagshift_core::{SchemaVersion, TagCodec, TagValue};
use tagshift_migrate::{MigrationEngine, MigrationReport};
use tracing::info;

/// Extensions of single-tree files, gzip framed or not.
pub const TREE_EXTENSIONS: &[&str] = &["nbt", "dat"];

/// Extension of Base64 batch files.
pub const BATCH_EXTENSION: &str = "b64";

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

pub fn load_tree(vfs: &impl Vfs, codec: &TagCodec, path: &Path) -> Result<TagValue> {
    let bytes = vfs.read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let tree = codec
        .from_bytes(&bytes)
        .with_context(|| format!("Failed to decode tree from {}", path.display()))?;
    Ok(tree)
}

/// Writes a gzip framed tree.
pub fn save_tree(vfs: &impl Vfs, codec: &TagCodec, path: &Path, tree: &TagValue) -> Result<()> {
    let bytes = codec.to_bytes(tree)?;
    vfs.write(path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Loads a batch: Base64 text for `.b64` files, the raw batch container
/// otherwise.
pub fn load_batch(vfs: &impl Vfs, codec: &TagCodec, path: &Path) -> Result<Vec<TagValue>> {
    let decoded = if has_extension(path, &[BATCH_EXTENSION]) {
        let text = vfs.read_to_string(path)?;
        codec.decode_batch_base64(&text)
    } else {
        let bytes = vfs.read(path)?;
        codec.read_batch(bytes.as_slice())
    };
    let trees = decoded.with_context(|| format!("Failed to decode batch from {}", path.display()))?;
    info!(path = %path.display(), trees = trees.len(), "loaded batch");
    Ok(trees)
}

pub fn save_batch(vfs: &impl Vfs, codec: &TagCodec, path: &Path, trees: &[TagValue]) -> Result<()> {
    let bytes = if has_extension(path, &[BATCH_EXTENSION]) {
        codec.encode_batch_base64(trees)?.into_bytes()
    } else {
        let mut bytes = Vec::new();
        codec.write_batch(trees, &mut bytes)?;
        bytes
    };
    vfs.write(path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Tree files directly inside `dir`.
pub fn tree_files(vfs: &impl Vfs, dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = vfs
        .list_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    Ok(entries
        .into_iter()
        .filter(|p| !vfs.is_dir(p) && has_extension(p, TREE_EXTENSIONS))
        .collect())
}

/// Loads the tree at `path`, migrates it to `target` and writes it back
/// when anything changed.
pub fn migrate_file(
    vfs: &impl Vfs,
    codec: &TagCodec,
    engine: &MigrationEngine,
    path: &Path,
    object_id: &str,
    target: SchemaVersion,
) -> Result<MigrationReport> {
    let mut tree = load_tree(vfs, codec, path)?;
    let report = engine
        .migrate(&mut tree, object_id, target)
        .with_context(|| format!("Failed to migrate {}", path.display()))?;
    if report.changed() {
        save_tree(vfs, codec, path, &tree)?;
    }
    info!(
        path = %path.display(),
        state = %report.state,
        applied = report.applied.len(),
        "migrated file"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{MemoryVfs, OsVfs};
    use tagshift_core::navigator::{compound_of, list_of};

    fn sample() -> TagValue {
        compound_of([
            ("Name", TagValue::String("chest".into())),
            ("Items", list_of(vec![TagValue::Int(1), TagValue::Int(2)]).unwrap()),
        ])
    }

    #[test]
    fn test_save_and_load_tree() -> Result<()> {
        let vfs = MemoryVfs::new();
        let codec = TagCodec::default();
        let path = Path::new("world/chest.dat");
        save_tree(&vfs, &codec, path, &sample())?;
        assert_eq!(load_tree(&vfs, &codec, path)?, sample());
        Ok(())
    }

    #[test]
    fn test_uncompressed_file_is_read() -> Result<()> {
        let vfs = MemoryVfs::new();
        let codec = TagCodec::default();
        let mut bytes = Vec::new();
        codec.write_uncompressed(&sample(), &mut bytes)?;
        vfs.write(Path::new("raw.nbt"), &bytes)?;
        assert_eq!(load_tree(&vfs, &codec, Path::new("raw.nbt"))?, sample());
        Ok(())
    }

    #[test]
    fn test_batch_files() -> Result<()> {
        let vfs = MemoryVfs::new();
        let codec = TagCodec::default();
        let trees = vec![sample(), TagValue::compound()];
        for name in ["items.b64", "items.bin"] {
            save_batch(&vfs, &codec, Path::new(name), &trees)?;
            assert_eq!(load_batch(&vfs, &codec, Path::new(name))?, trees);
        }
        assert!(vfs.read_to_string(Path::new("items.b64")).is_ok());
        Ok(())
    }

    #[test]
    fn test_tree_files_filters_extensions() -> Result<()> {
        let vfs = MemoryVfs::new();
        vfs.write(Path::new("world/level.dat"), b"")?;
        vfs.write(Path::new("world/a.nbt"), b"")?;
        vfs.write(Path::new("world/notes.txt"), b"")?;
        vfs.write(Path::new("world/players/p.dat"), b"")?;
        assert_eq!(
            tree_files(&vfs, Path::new("world"))?,
            vec![PathBuf::from("world/a.nbt"), PathBuf::from("world/level.dat")]
        );
        Ok(())
    }

    #[test]
    fn test_migrate_file_on_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sword.dat");
        let codec = TagCodec::default();
        let tree = compound_of([
            (
                "ench",
                list_of(vec![compound_of([("id", TagValue::Short(34))])]).unwrap(),
            ),
            ("DataVersion", TagValue::Int(0)),
        ]);
        save_tree(&OsVfs, &codec, &path, &tree)?;

        let engine = MigrationEngine::with_builtins();
        let sword = "minecraft:diamond_sword";
        let report = migrate_file(&OsVfs, &codec, &engine, &path, sword, SchemaVersion::LATEST)?;
        assert!(report.changed());

        let migrated = load_tree(&OsVfs, &codec, &path)?;
        assert!(migrated.get("minecraft:enchantments").is_some());

        let again = migrate_file(&OsVfs, &codec, &engine, &path, sword, SchemaVersion::LATEST)?;
        assert!(!again.changed());
        Ok(())
    }

    #[test]
    fn test_corrupt_file_reports_path() {
        let vfs = MemoryVfs::new();
        vfs.write(Path::new("bad.dat"), &[10, 0]).unwrap();
        let err = load_tree(&vfs, &TagCodec::default(), Path::new("bad.dat")).unwrap_err();
        assert!(err.to_string().contains("bad.dat"));
    }
}
