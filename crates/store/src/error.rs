use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Disk full while writing {0}")]
    DiskFull(String),

    #[error("Permission denied for {0}")]
    PermissionDenied(String),

    #[error("Workspace is read-only: {0}")]
    ReadOnly(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

const ENOSPC: i32 = 28;

impl StoreError {
    /// Map an I/O failure at `path` to a typed, user-readable error.
    pub(crate) fn from_io(err: std::io::Error, path: &std::path::Path) -> StoreError {
        let display = path.display().to_string();
        if err.raw_os_error() == Some(ENOSPC) {
            return StoreError::DiskFull(display);
        }
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => StoreError::PermissionDenied(display),
            _ => StoreError::IoError(err),
        }
    }
}
