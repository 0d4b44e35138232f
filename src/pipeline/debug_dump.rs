use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes stylized JPEGs to a directory for offline inspection.
///
/// Every dump gets its own file name, so concurrent requests never write to
/// the same path. Failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct DebugDump {
    dir: PathBuf,
}

impl DebugDump {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DebugDump { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path written, or `None` if the write failed.
    pub fn write(&self, jpeg: &[u8]) -> Option<PathBuf> {
        let path = self.dir.join(unique_file_name());
        let result = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, jpeg));
        match result {
            Ok(()) => {
                tracing::debug!(path = %path.display(), bytes = jpeg.len(), "wrote debug dump");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "debug dump failed");
                None
            }
        }
    }
}

fn unique_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("stylized_{}_{:016x}.jpg", millis, rand::random::<u64>())
}
