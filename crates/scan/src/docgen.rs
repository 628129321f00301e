use async_trait::async_trait;
use codescope_protocol::ArtifactKind;

/// Collaborator that turns a raw artifact into narrative documentation.
///
/// The pipeline probes [`DocGenerator::is_available`] once per scan and
/// soft-skips the whole post-pass when the generator is down; individual
/// generation failures are recorded and do not stop the batch.
#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn is_available(&self) -> bool;

    /// Produce documentation text for one artifact. `content` is the
    /// artifact's stored content (rendered text or serialized JSON).
    async fn generate(
        &self,
        kind: &ArtifactKind,
        content: &str,
        project_name: &str,
    ) -> anyhow::Result<String>;
}
