//! Scan-metadata cache: a sha256 snapshot of the walked file set, used
//! to answer "did anything change since the last scan".

use crate::atomic::{read_validated, write_atomic};
use crate::error::Result;
use crate::store::{ArtifactStore, Backend};
use codescope_protocol::ScanMetadata;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

const METADATA_FILE: &str = "cache/scan-metadata.json";

/// Hash workspace-relative files under `root` into `path -> sha256 hex`.
/// Unreadable files are skipped rather than failing the snapshot.
pub fn hash_files(root: &Path, rel_paths: &[String]) -> BTreeMap<String, String> {
    let mut hashes = BTreeMap::new();
    for rel in rel_paths {
        let Ok(bytes) = std::fs::read(root.join(rel)) else {
            continue;
        };
        let digest = Sha256::digest(&bytes);
        hashes.insert(rel.clone(), format!("{digest:x}"));
    }
    hashes
}

impl ArtifactStore {
    pub async fn save_scan_metadata(&self, metadata: &ScanMetadata) -> Result<()> {
        match &self.backend {
            Backend::Disk { root } => {
                let bytes = serde_json::to_vec_pretty(metadata)?;
                write_atomic(&root.join(METADATA_FILE), &bytes).await?;
            }
            Backend::Memory { state } => {
                state.lock().expect("store mutex").scan_metadata = Some(metadata.clone());
            }
        }
        Ok(())
    }

    pub async fn load_scan_metadata(&self) -> Result<Option<ScanMetadata>> {
        match &self.backend {
            Backend::Disk { root } => {
                Ok(read_validated(&root.join(METADATA_FILE), |_: &ScanMetadata| true).await)
            }
            Backend::Memory { state } => {
                Ok(state.lock().expect("store mutex").scan_metadata.clone())
            }
        }
    }
}
