use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Remove rendered `.docx` files older than `max_age` from `dir`.
///
/// A missing directory counts as empty, and files that vanish mid-sweep
/// (removed by a concurrent request) are skipped. Returns the number of
/// files this sweep removed.
pub async fn sweep_expired(dir: &Path, max_age: Duration) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("docx") {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();

        if age > max_age {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), age_secs = age.as_secs(), "Removed expired document");
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            }
        }
    }

    Ok(removed)
}

/// Best-effort removal of a file that has already been served.
/// Returns whether the file was actually removed.
pub async fn remove_served(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove served document");
            false
        }
    }
}
