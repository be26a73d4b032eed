//! Atomic file replacement.

use std::fs::{self, File, Permissions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Writes `content` to `path` atomically.
///
/// The content goes to a temporary file next to the target, which is then
/// renamed over it. Readers never observe a partially written file. A
/// symlinked target is resolved so the link itself survives, and the
/// permissions of an existing file are carried over.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let target = if fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) {
        fs::canonicalize(path)?
    } else {
        path.to_path_buf()
    };
    let permissions = match fs::metadata(&target) {
        Ok(metadata) if metadata.is_file() => Some(metadata.permissions()),
        _ => None,
    };

    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_path = parent.join(format!(
        ".snippet-fmt-tmp-{}-{}",
        std::process::id(),
        counter,
    ));

    let result = write_temp(&temp_path, content, permissions)
        .and_then(|()| fs::rename(&temp_path, &target));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, content: &str, permissions: Option<Permissions>) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(content.as_bytes())?;
    if let Some(permissions) = permissions {
        file.set_permissions(permissions)?;
    }
    file.sync_all()
}
