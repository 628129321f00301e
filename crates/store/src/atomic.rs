use crate::error::{Result, StoreError};
use std::path::Path;

/// Write `bytes` to `path` via a `.tmp` sibling and an atomic rename.
///
/// On any failure the temp file is best-effort removed and the error is
/// mapped to a typed store error (disk full / permission denied / io).
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::from_io(e, parent))?;
    }

    let tmp = tmp_sibling(path);
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::from_io(e, path));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::from_io(e, path));
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}

/// Read a JSON file into `T`. Missing files are `None`; unparsable or
/// structurally invalid content is logged as corrupt and also `None`.
/// Read paths never raise on bad data.
pub(crate) async fn read_validated<T>(path: &Path, validate: impl Fn(&T) -> bool) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(_) => return None,
    };
    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) if validate(&value) => Some(value),
        Ok(_) => {
            log::warn!("Corrupt store file (failed validation): {}", path.display());
            None
        }
        Err(e) => {
            log::warn!("Corrupt store file {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn atomic_write_replaces_content() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("doc.json");

        write_atomic(&target, b"{\"v\":1}").await.unwrap();
        write_atomic(&target, b"{\"v\":2}").await.unwrap();

        let content = tokio::fs::read_to_string(&target).await.unwrap();
        assert_eq!(content, "{\"v\":2}");
        // no tmp leftovers
        let mut entries = tokio::fs::read_dir(temp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            assert!(!entry.file_name().to_string_lossy().ends_with(".tmp"));
        }
    }

    #[tokio::test]
    async fn corrupt_json_reads_as_absent() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("bad.json");
        tokio::fs::write(&target, b"{nope").await.unwrap();

        let read: Option<serde_json::Value> = read_validated(&target, |_| true).await;
        assert!(read.is_none());

        let missing: Option<serde_json::Value> =
            read_validated(&temp.path().join("gone.json"), |_| true).await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn validation_failure_reads_as_absent() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("doc.json");
        tokio::fs::write(&target, b"{\"v\":1}").await.unwrap();

        let read: Option<serde_json::Value> = read_validated(&target, |_| false).await;
        assert!(read.is_none());
    }
}
