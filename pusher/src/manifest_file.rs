//! Reading and writing the link manifest on disk.
//!
//! The manifest is read, merged in memory and written back in one pass with no
//! locking; the last writer wins if two pushes race. Writes go through a
//! temporary file in the same directory so a crash never leaves a truncated
//! manifest behind.

use crate::error::{PusherError, Result};
use camino::Utf8Path;
use log::debug;
use std::io::Write;
use toitnups::{LinkManifest, parse_manifest_bytes};

/// Read and parse the manifest at `path`, or `None` when it does not exist.
///
/// # Errors
///
/// Returns [`PusherError::ManifestParseFailed`] when the file is not a valid
/// UTF-8 manifest, or [`PusherError::Io`] when it cannot be read.
pub fn load_manifest(path: &Utf8Path) -> Result<Option<LinkManifest>> {
    if !path.exists() {
        debug!("no link manifest at {path}");
        return Ok(None);
    }

    let bytes = std::fs::read(path)?;
    let manifest = parse_manifest_bytes(&bytes).map_err(|source| PusherError::ManifestParseFailed {
        path: path.to_owned(),
        source,
    })?;

    debug!("loaded link manifest {path} with {} entries", manifest.len());
    Ok(Some(manifest))
}

/// Serialise `manifest` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`PusherError::ManifestWriteFailed`] when the file cannot be
/// written.
pub fn save_manifest(path: &Utf8Path, manifest: &LinkManifest) -> Result<()> {
    let write_failed = |source: std::io::Error| PusherError::ManifestWriteFailed {
        path: path.to_owned(),
        source,
    };

    let dir = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    std::fs::create_dir_all(dir).map_err(write_failed)?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    file.write_all(manifest.to_xml().as_bytes())
        .map_err(write_failed)?;
    file.persist(path).map_err(|err| write_failed(err.error))?;

    debug!("wrote link manifest {path} with {} entries", manifest.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use toitnups::{AssemblyEntry, PreserveMode};

    struct ManifestDir {
        _dir: TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn manifest_dir() -> ManifestDir {
        let dir = tempfile::tempdir().expect("create tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("utf-8 tempdir");
        ManifestDir {
            _dir: dir,
            path: root.join("Assets/link.xml"),
        }
    }

    #[rstest]
    fn missing_manifest_loads_as_none(manifest_dir: ManifestDir) {
        assert!(load_manifest(&manifest_dir.path).expect("load").is_none());
    }

    #[rstest]
    fn save_then_load_round_trips(manifest_dir: ManifestDir) {
        let mut manifest = LinkManifest::new();
        manifest.insert(AssemblyEntry::new("Polly", Some(PreserveMode::Full)));

        save_manifest(&manifest_dir.path, &manifest).expect("save");
        let loaded = load_manifest(&manifest_dir.path)
            .expect("load")
            .expect("manifest present");

        assert_eq!(loaded, manifest);
        assert_eq!(
            std::fs::read_to_string(&manifest_dir.path).expect("read"),
            "<linker>\n\t<assembly fullname=\"Polly\" preserve=\"full\" />\n</linker>"
        );
    }

    #[rstest]
    fn byte_order_mark_is_ignored(manifest_dir: ManifestDir) {
        std::fs::create_dir_all(manifest_dir.path.parent().expect("parent")).expect("mkdir");
        std::fs::write(
            &manifest_dir.path,
            "\u{feff}<linker><assembly fullname=\"A\" /></linker>",
        )
        .expect("write manifest");

        let loaded = load_manifest(&manifest_dir.path)
            .expect("load")
            .expect("manifest present");
        assert!(loaded.contains("A"));
    }

    #[rstest]
    fn corrupt_manifest_names_the_file(manifest_dir: ManifestDir) {
        std::fs::create_dir_all(manifest_dir.path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&manifest_dir.path, "<linker><assembly /></linker>").expect("write");

        let err = load_manifest(&manifest_dir.path).expect_err("corrupt manifest");
        assert!(matches!(
            err,
            PusherError::ManifestParseFailed { path, .. } if path == manifest_dir.path
        ));
    }

    #[rstest]
    fn non_utf8_manifest_is_a_parse_failure(manifest_dir: ManifestDir) {
        std::fs::create_dir_all(manifest_dir.path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&manifest_dir.path, b"<linker>\xff\xfe</linker>").expect("write");

        let err = load_manifest(&manifest_dir.path).expect_err("non-UTF-8 manifest");
        assert!(matches!(
            err,
            PusherError::ManifestParseFailed {
                source: toitnups::ManifestParseError::Encoding(_),
                ..
            }
        ));
    }
}
