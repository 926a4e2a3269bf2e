use crate::model::RejectionRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Move a file, falling back to copy + remove when `rename` cannot cross
/// filesystems.
fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            debug!(
                "rename {} failed ({}), copying instead",
                source.display(),
                rename_err
            );
            fs::copy(source, dest)?;
            fs::remove_file(source)
        }
    }
}

/// Relocate rejected files under `waste_dir`, keeping their layout relative
/// to the source root. Failures are logged and skipped. Returns the number
/// of files moved.
pub fn move_to_waste(records: &[RejectionRecord], waste_dir: &Path) -> usize {
    let mut moved = 0;

    for record in records {
        if !record.path.exists() {
            warn!("{} no longer exists, skipping", record.path.display());
            continue;
        }

        let dest: PathBuf = waste_dir.join(&record.relative_path);
        if let Some(parent) = dest.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Cannot create {}: {}", parent.display(), e);
                continue;
            }
        }

        match move_file(&record.path, &dest) {
            Ok(()) => {
                debug!("Moved {} -> {}", record.path.display(), dest.display());
                moved += 1;
            }
            Err(e) => warn!("Failed to move {}: {}", record.path.display(), e),
        }
    }

    moved
}
