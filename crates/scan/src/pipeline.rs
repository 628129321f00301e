use crate::docgen::DocGenerator;
use crate::options::{CancelCheck, ProgressSink, ScanOptions};
use codescope_engines::{
    ArchitectureEngine, CodebaseSummaryEngine, DataModelEngine, DirectoryStructureEngine,
    WorkflowEngine,
};
use codescope_parsers::ParseSession;
use codescope_protocol::{ArtifactKind, ArtifactResult, CodebaseSummary, ScanMetadata};
use codescope_store::{hash_files, ArtifactStore, StoreError};
use codescope_walker::ProjectWalker;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to initialize workspace store: {0}")]
    StoreInit(#[from] StoreError),
}

/// A non-fatal failure recorded during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub stage: String,
    pub message: String,
}

impl StageError {
    fn new(stage: &str, message: impl Into<String>) -> Self {
        Self {
            stage: stage.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of one pipeline run. `artifacts` holds what was produced,
/// including incomplete placeholders for failed or timed-out stages.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub artifacts: BTreeMap<ArtifactKind, ArtifactResult>,
    pub duration_ms: u64,
    pub errors: Vec<StageError>,
    pub cancelled: bool,
}

/// Runs the five engines in fixed order against one workspace.
///
/// Stages fail independently: an engine error or timeout yields a stored
/// placeholder and the pipeline moves on. Synchronous engines run on the
/// blocking pool so the timeout can abandon them mid-run; cancellation
/// is polled between stages.
pub struct ScanPipeline {
    options: ScanOptions,
    progress: Option<ProgressSink>,
    cancel: Option<CancelCheck>,
    doc_generator: Option<Box<dyn DocGenerator>>,
}

/// Pipeline order is part of the store contract: later artifacts may
/// assume earlier ones exist.
const STAGES: [(&str, ArtifactKind); 5] = [
    ("directory-structure", ArtifactKind::DirectoryStructure),
    ("codebase-summary", ArtifactKind::CodebaseSummary),
    ("data-model", ArtifactKind::DataModel),
    ("architecture", ArtifactKind::Architecture),
    ("workflow", ArtifactKind::Workflow),
];

impl ScanPipeline {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            progress: None,
            cancel: None,
            doc_generator: None,
        }
    }

    pub fn with_progress(
        mut self,
        sink: impl Fn(&str, u8, Option<&str>) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn with_cancel_check(mut self, check: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.cancel = Some(Box::new(check));
        self
    }

    pub fn with_doc_generator(mut self, generator: Box<dyn DocGenerator>) -> Self {
        self.doc_generator = Some(generator);
        self
    }

    /// Open (or fall back past) the workspace store and run the scan.
    ///
    /// A read-only workspace degrades to an in-memory store; any other
    /// store-initialization failure is the one hard error of a scan.
    pub async fn run(&self, workspace_root: &Path) -> Result<ScanResult> {
        let store = match ArtifactStore::open(workspace_root).await {
            Ok(store) => store,
            Err(StoreError::ReadOnly(path)) => {
                log::warn!("Workspace {path} is read-only, artifacts will not persist");
                ArtifactStore::in_memory()
            }
            Err(e) => return Err(e.into()),
        };
        self.run_with_store(workspace_root, &store).await
    }

    pub async fn run_with_store(
        &self,
        workspace_root: &Path,
        store: &ArtifactStore,
    ) -> Result<ScanResult> {
        let started = Instant::now();
        let project_name = workspace_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workspace".to_string());

        let walker = ProjectWalker::new(workspace_root).with_max_depth(self.options.max_depth);
        let walk = Arc::new(walker.walk());
        let mut session: Option<ParseSession> = None;

        let mut result = ScanResult::default();
        let limit = self.options.engine_timeout;

        for (index, (stage, kind)) in STAGES.iter().enumerate() {
            if self.is_cancelled() {
                log::info!("Scan cancelled before stage '{stage}'");
                result.cancelled = true;
                break;
            }
            self.report(stage, (index * 20) as u8, None);

            let outcome = match *kind {
                ArtifactKind::DirectoryStructure => {
                    let walk = Arc::clone(&walk);
                    let name = project_name.clone();
                    run_blocking_bounded(limit, move || {
                        DirectoryStructureEngine.run(&name, &walk)
                    })
                    .await
                }
                ArtifactKind::CodebaseSummary => {
                    run_bounded(limit, CodebaseSummaryEngine.run(workspace_root, &walk)).await
                }
                _ => {
                    // an abandoned stage takes its session with it; the
                    // next stage starts from a fresh one
                    let mut sess = session.take().unwrap_or_else(|| {
                        ParseSession::new(workspace_root, self.options.max_file_bytes)
                    });
                    let walk = Arc::clone(&walk);
                    let kind = kind.clone();
                    let bounded = run_blocking_bounded(limit, move || {
                        let engine_result = match kind {
                            ArtifactKind::DataModel => DataModelEngine.run(&walk, &mut sess),
                            ArtifactKind::Architecture => {
                                ArchitectureEngine.run(&walk, &mut sess)
                            }
                            _ => WorkflowEngine.run(&walk, &mut sess),
                        };
                        (sess, engine_result)
                    })
                    .await;
                    match bounded {
                        Some((sess, engine_result)) => {
                            session = Some(sess);
                            Some(engine_result)
                        }
                        None => None,
                    }
                }
            };

            let artifact = match outcome {
                Some(Ok(artifact)) => artifact,
                Some(Err(e)) => {
                    log::warn!("Stage '{stage}' failed: {e}");
                    result.errors.push(StageError::new(stage, e.to_string()));
                    ArtifactResult::incomplete(kind.clone(), &e.to_string())
                }
                None => {
                    let reason = format!("timed out after {}s", limit.as_secs());
                    log::warn!("Stage '{stage}' {reason}");
                    result.errors.push(StageError::new(stage, reason.clone()));
                    ArtifactResult::incomplete(kind.clone(), &reason)
                }
            };
            if let Err(e) = store.store_artifact(&artifact).await {
                result
                    .errors
                    .push(StageError::new(stage, format!("store failed: {e}")));
            }
            result.artifacts.insert(kind.clone(), artifact);
            self.report(stage, ((index + 1) * 20) as u8, Some("done"));
        }

        if !result.cancelled {
            if self.options.generate_docs {
                self.documentation_pass(store, &project_name, &mut result)
                    .await;
            }

            let rel_paths: Vec<String> =
                walk.files.iter().map(|f| f.rel_path.clone()).collect();
            let metadata = ScanMetadata::new(hash_files(workspace_root, &rel_paths));
            if let Err(e) = store.save_scan_metadata(&metadata).await {
                result
                    .errors
                    .push(StageError::new("scan-metadata", e.to_string()));
            }
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        self.report(
            "complete",
            100,
            Some(&format!(
                "{} artifact(s), {} error(s)",
                result.artifacts.len(),
                result.errors.len()
            )),
        );
        Ok(result)
    }

    /// Generate documentation for every complete raw artifact. Skipped
    /// wholesale (with a recorded error) when the configured generator
    /// reports itself unavailable.
    async fn documentation_pass(
        &self,
        store: &ArtifactStore,
        fallback_name: &str,
        result: &mut ScanResult,
    ) {
        let Some(generator) = &self.doc_generator else {
            return;
        };
        if !generator.is_available().await {
            log::warn!("Documentation generator unavailable, skipping post-pass");
            result
                .errors
                .push(StageError::new("documentation", "generator unavailable"));
            return;
        }

        // the summary's manifest-derived name beats the directory name
        let project_name = result
            .artifacts
            .get(&ArtifactKind::CodebaseSummary)
            .filter(|a| !a.is_incomplete())
            .and_then(|a| serde_json::from_str::<CodebaseSummary>(&a.content).ok())
            .and_then(|summary| summary.project_name)
            .unwrap_or_else(|| fallback_name.to_string());

        let sources: Vec<(ArtifactKind, String, u64)> = result
            .artifacts
            .values()
            .filter(|a| !a.is_incomplete())
            .map(|a| (a.kind.clone(), a.content.clone(), a.file_count))
            .collect();

        for (kind, content, file_count) in sources {
            let doc_kind = ArtifactKind::Documentation(kind.as_str());
            match generator.generate(&kind, &content, &project_name).await {
                Ok(text) => {
                    let artifact = ArtifactResult::new(doc_kind.clone(), text, file_count, 0);
                    if let Err(e) = store.store_artifact(&artifact).await {
                        result
                            .errors
                            .push(StageError::new("documentation", e.to_string()));
                    }
                    result.artifacts.insert(doc_kind, artifact);
                }
                Err(e) => {
                    log::warn!("Documentation for '{kind}' failed: {e}");
                    result
                        .errors
                        .push(StageError::new("documentation", e.to_string()));
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|check| check()).unwrap_or(false)
    }

    fn report(&self, stage: &str, percent: u8, message: Option<&str>) {
        if let Some(sink) = &self.progress {
            sink(stage, percent, message);
        }
    }
}

/// Race an async stage against the engine timeout. The initial yield
/// guarantees at least one scheduling point before the engine starts, so
/// an already-elapsed deadline always wins.
async fn run_bounded<Fut>(limit: Duration, fut: Fut) -> Option<Fut::Output>
where
    Fut: Future,
{
    let guarded = async {
        tokio::task::yield_now().await;
        fut.await
    };
    tokio::time::timeout(limit, guarded).await.ok()
}

/// Race a synchronous engine, on the blocking pool, against the engine
/// timeout. On elapse the worker is abandoned: it keeps running on its
/// pool thread but its output is dropped.
async fn run_blocking_bounded<T, F>(limit: Duration, work: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            log::error!("Engine worker panicked: {e}");
            None
        }
        Err(_) => None,
    }
}
