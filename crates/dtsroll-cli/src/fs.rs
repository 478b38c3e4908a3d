//! Disk-backed compiler host.

use dtsroll_binder::{CompilerHost, normalize_path};
use std::path::Path;

/// Reads source files from the local file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskHost;

impl CompilerHost for DiskHost {
    fn read_file(&self, path: &str) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::trace!(path, %err, "read failed");
                None
            }
        }
    }

    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }
}

/// Absolute, `/`-separated form of `path` as the compiler host expects it.
pub fn host_path(cwd: &Path, path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    normalize_path(&absolute.to_string_lossy())
}
