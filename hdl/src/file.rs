use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes `contents` to `path` through a temporary file next to it, creating parent directories
/// as needed. A failed write leaves neither a partial file nor the temporary behind.
pub fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut temporary = path.as_os_str().to_owned();
    temporary.push(".tmp");
    let temporary = PathBuf::from(temporary);
    let result = fs::write(&temporary, contents).and_then(|()| fs::rename(&temporary, path));
    if result.is_err() {
        let _ = fs::remove_file(&temporary);
    }
    result
}
