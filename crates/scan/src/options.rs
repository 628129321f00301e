use std::time::Duration;

/// Per-engine wall-clock limit before a stage is abandoned and replaced
/// by an incomplete placeholder.
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Files above this size are skipped by the parse session.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Progress callback: stage name, percent complete, optional detail.
pub type ProgressSink = Box<dyn Fn(&str, u8, Option<&str>) + Send + Sync>;

/// Cooperative cancellation probe, polled between stages only.
pub type CancelCheck = Box<dyn Fn() -> bool + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub engine_timeout: Duration,
    pub max_depth: usize,
    pub max_file_bytes: u64,
    pub generate_docs: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            engine_timeout: DEFAULT_ENGINE_TIMEOUT,
            max_depth: codescope_walker::DEFAULT_MAX_DEPTH,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            generate_docs: false,
        }
    }
}
