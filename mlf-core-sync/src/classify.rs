//! Classifying a template update and gating it against the sync level.

use mlf_core_core::types::{ChangeSeverity, ProjectMetadata, SyncLevel};
use mlf_core_core::{version, ProjectError, TemplateRegistry};

/// The recorded and the published template version of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub recorded: String,
    pub published: String,
    pub severity: ChangeSeverity,
}

impl UpdateCheck {
    pub fn is_update(&self) -> bool {
        self.severity != ChangeSeverity::None
    }
}

/// Compare the template version recorded in `metadata` with the version
/// the registry publishes for its handle.
pub fn check(metadata: &ProjectMetadata, registry: &TemplateRegistry) -> Result<UpdateCheck, ProjectError> {
    let published = registry.version_of(&metadata.template_handle)?;
    let delta = version::compare(&metadata.template_version, published)?;
    Ok(UpdateCheck {
        recorded: metadata.template_version.clone(),
        published: published.to_string(),
        severity: delta.severity(),
    })
}

/// The single highest severity of the change between the recorded and the
/// published template version.
pub fn classify(
    metadata: &ProjectMetadata,
    registry: &TemplateRegistry,
) -> Result<ChangeSeverity, ProjectError> {
    check(metadata, registry).map(|c| c.severity)
}

/// Sync only when the change is at least as severe as the project's policy.
/// No change never syncs.
pub fn should_sync(severity: ChangeSeverity, level: SyncLevel) -> bool {
    severity.as_sync_level().is_some_and(|s| s >= level)
}
