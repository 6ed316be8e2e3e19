//! Output file handling.
//!
//! Generated files are written only once everything rendered, each through
//! a temporary file in the destination directory. When an invocation fails,
//! all of its output paths are removed.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Base name of an output path as used in `#include` lines.
pub(crate) fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::BadOutputPath(path.to_path_buf()))
}

/// Atomically replace `path` with `contents`.
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    let io_error = |source: std::io::Error| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(contents.as_bytes()).map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

/// Run `f`; if it fails, remove every path in `outputs` so no stale or
/// partial output is left behind.
pub(crate) fn with_cleanup<T>(outputs: &[&PathBuf], f: impl FnOnce() -> Result<T>) -> Result<T> {
    let result = f();
    if result.is_err() {
        for path in outputs {
            match std::fs::remove_file(path) {
                Ok(()) => warn!(path = %path.display(), "removed output after failure"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), error = %err, "failed to remove output"),
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(Path::new("build/i915_perf_equations.h")).unwrap(),
            "i915_perf_equations.h"
        );
        assert!(matches!(
            file_name(Path::new("/")),
            Err(Error::BadOutputPath(_))
        ));
    }

    #[test]
    fn test_write_file_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.c");
        std::fs::write(&path, "old").unwrap();
        write_file(&path, "new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_cleanup_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.h");
        let missing = dir.path().join("missing.c");
        std::fs::write(&kept, "stale").unwrap();

        let result: Result<()> = with_cleanup(&[&kept, &missing], || {
            Err(Error::MissingInput(PathBuf::from("nope.xml")))
        });
        assert!(result.is_err());
        assert!(!kept.exists());

        std::fs::write(&kept, "fresh").unwrap();
        with_cleanup(&[&kept], || Ok(())).unwrap();
        assert!(kept.exists());
    }
}
