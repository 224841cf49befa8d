//! Tera rendering engine: [`TemplateKind`] enum and [`Renderer`].
//!
//! # Path mapping
//!
//! | Kind                 | Files on top of the common set                          |
//! |----------------------|---------------------------------------------------------|
//! | `mlflow-*`           | `MLproject`, `environment.yml`, `<slug>/<slug>.py`,     |
//! |                      | `<slug>/mlf_core/mlf_core.py`, `.github/workflows/*.yml` |
//! | `package-prediction` | `setup.py`, `setup.cfg`, `MANIFEST.in`,                 |
//! |                      | `requirements.txt`, `<slug>/__init__.py`, `<slug>/cli.py` |
//!
//! `<slug>` is `project_slug_no_hyphen`. Every project additionally gets its
//! `.mlf_core.yml` identity file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tera::Tera;

use mlf_core_core::metadata::{self, METADATA_FILE};
use mlf_core_core::types::{ProjectMetadata, TemplateHandle};
use mlf_core_core::TemplateRegistry;

use crate::context::TemplateContext;
use crate::error::{io_err, RenderError};

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary with include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("common/README.rst.tera", include_str!("templates/common/README.rst.tera")),
    ("common/CHANGELOG.rst.tera", include_str!("templates/common/CHANGELOG.rst.tera")),
    ("common/LICENSE.tera", include_str!("templates/common/LICENSE.tera")),
    ("common/Dockerfile.tera", include_str!("templates/common/Dockerfile.tera")),
    ("common/mlf_core.cfg.tera", include_str!("templates/common/mlf_core.cfg.tera")),
    ("common/gitignore.tera", include_str!("templates/common/gitignore.tera")),
    ("common/docs/index.rst.tera", include_str!("templates/common/docs/index.rst.tera")),
    ("common/docs/readme.rst.tera", include_str!("templates/common/docs/readme.rst.tera")),
    (
        "common/docs/changelog.rst.tera",
        include_str!("templates/common/docs/changelog.rst.tera"),
    ),
    ("common/docs/usage.rst.tera", include_str!("templates/common/docs/usage.rst.tera")),
    (
        "common/github/bug_report.md.tera",
        include_str!("templates/common/github/bug_report.md.tera"),
    ),
    (
        "common/github/feature_request.md.tera",
        include_str!("templates/common/github/feature_request.md.tera"),
    ),
    (
        "common/github/general_question.md.tera",
        include_str!("templates/common/github/general_question.md.tera"),
    ),
    (
        "common/github/pull_request_template.md.tera",
        include_str!("templates/common/github/pull_request_template.md.tera"),
    ),
    ("mlflow/MLproject.tera", include_str!("templates/mlflow/MLproject.tera")),
    ("mlflow/environment.yml.tera", include_str!("templates/mlflow/environment.yml.tera")),
    ("mlflow/mlf_core.py.tera", include_str!("templates/mlflow/mlf_core.py.tera")),
    ("mlflow/entry_point.py.tera", include_str!("templates/mlflow/entry_point.py.tera")),
    (
        "mlflow/workflows/train_cpu.yml.tera",
        include_str!("templates/mlflow/workflows/train_cpu.yml.tera"),
    ),
    (
        "mlflow/workflows/run_flake8_linting.yml.tera",
        include_str!("templates/mlflow/workflows/run_flake8_linting.yml.tera"),
    ),
    (
        "mlflow/workflows/run_bandit.yml.tera",
        include_str!("templates/mlflow/workflows/run_bandit.yml.tera"),
    ),
    ("package/setup.py.tera", include_str!("templates/package/setup.py.tera")),
    ("package/setup.cfg.tera", include_str!("templates/package/setup.cfg.tera")),
    ("package/MANIFEST.in.tera", include_str!("templates/package/MANIFEST.in.tera")),
    (
        "package/requirements.txt.tera",
        include_str!("templates/package/requirements.txt.tera"),
    ),
    ("package/init.py.tera", include_str!("templates/package/init.py.tera")),
    ("package/cli.py.tera", include_str!("templates/package/cli.py.tera")),
];

/// Placeholder in output paths, replaced by `project_slug_no_hyphen`.
const SLUG: &str = "{slug}";

/// `(template name, output path relative to the project root)`.
type FileSpec = (&'static str, &'static str);

const COMMON_FILES: &[FileSpec] = &[
    ("common/README.rst.tera", "README.rst"),
    ("common/CHANGELOG.rst.tera", "CHANGELOG.rst"),
    ("common/LICENSE.tera", "LICENSE"),
    ("common/Dockerfile.tera", "Dockerfile"),
    ("common/mlf_core.cfg.tera", "mlf_core.cfg"),
    ("common/gitignore.tera", ".gitignore"),
    ("common/docs/index.rst.tera", "docs/index.rst"),
    ("common/docs/readme.rst.tera", "docs/readme.rst"),
    ("common/docs/changelog.rst.tera", "docs/changelog.rst"),
    ("common/docs/usage.rst.tera", "docs/usage.rst"),
    ("common/github/bug_report.md.tera", ".github/ISSUE_TEMPLATE/bug_report.md"),
    ("common/github/feature_request.md.tera", ".github/ISSUE_TEMPLATE/feature_request.md"),
    ("common/github/general_question.md.tera", ".github/ISSUE_TEMPLATE/general_question.md"),
    ("common/github/pull_request_template.md.tera", ".github/pull_request_template.md"),
];

const MLFLOW_FILES: &[FileSpec] = &[
    ("mlflow/MLproject.tera", "MLproject"),
    ("mlflow/environment.yml.tera", "environment.yml"),
    ("mlflow/entry_point.py.tera", "{slug}/{slug}.py"),
    ("mlflow/mlf_core.py.tera", "{slug}/mlf_core/mlf_core.py"),
    ("mlflow/workflows/train_cpu.yml.tera", ".github/workflows/train_cpu.yml"),
    ("mlflow/workflows/run_flake8_linting.yml.tera", ".github/workflows/run_flake8_linting.yml"),
    ("mlflow/workflows/run_bandit.yml.tera", ".github/workflows/run_bandit.yml"),
];

const PACKAGE_FILES: &[FileSpec] = &[
    ("package/setup.py.tera", "setup.py"),
    ("package/setup.cfg.tera", "setup.cfg"),
    ("package/MANIFEST.in.tera", "MANIFEST.in"),
    ("package/requirements.txt.tera", "requirements.txt"),
    ("package/init.py.tera", "{slug}/__init__.py"),
    ("package/cli.py.tera", "{slug}/cli.py"),
];

fn build_tera() -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TPLS.iter().copied())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// The closed set of templates shipped with mlf-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    MlflowPytorch,
    MlflowTensorflow,
    MlflowXgboost,
    MlflowXgboostDask,
    PackagePrediction,
}

impl TemplateKind {
    /// All template variants in registry order.
    pub fn all() -> &'static [TemplateKind] {
        &[
            TemplateKind::MlflowPytorch,
            TemplateKind::MlflowTensorflow,
            TemplateKind::MlflowXgboost,
            TemplateKind::MlflowXgboostDask,
            TemplateKind::PackagePrediction,
        ]
    }

    pub fn handle(self) -> &'static str {
        match self {
            TemplateKind::MlflowPytorch     => "mlflow-pytorch",
            TemplateKind::MlflowTensorflow  => "mlflow-tensorflow",
            TemplateKind::MlflowXgboost     => "mlflow-xgboost",
            TemplateKind::MlflowXgboostDask => "mlflow-xgboost_dask",
            TemplateKind::PackagePrediction => "package-prediction",
        }
    }

    /// Look up the kind for a handle.
    pub fn from_handle(handle: &TemplateHandle) -> Result<Self, RenderError> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.handle() == handle.0)
            .ok_or_else(|| RenderError::UnknownTemplate { handle: handle.0.clone() })
    }

    pub fn is_mlflow(self) -> bool {
        !matches!(self, TemplateKind::PackagePrediction)
    }

    /// Template files rendered for this kind, common set first.
    pub fn files(self) -> impl Iterator<Item = &'static FileSpec> {
        let specific = if self.is_mlflow() { MLFLOW_FILES } else { PACKAGE_FILES };
        COMMON_FILES.iter().chain(specific.iter())
    }
}

/// Check that the registry lists exactly the shipped templates.
pub fn validate_registry(registry: &TemplateRegistry) -> Result<(), RenderError> {
    let listed: HashSet<&str> = registry.entries().iter().map(|e| e.handle.0.as_str()).collect();
    let shipped: HashSet<&str> = TemplateKind::all().iter().map(|k| k.handle()).collect();

    let mut missing: Vec<&str> = shipped.difference(&listed).copied().collect();
    let mut unknown: Vec<&str> = listed.difference(&shipped).copied().collect();
    if missing.is_empty() && unknown.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    unknown.sort_unstable();
    Err(RenderError::RegistryMismatch {
        message: format!(
            "not in registry: [{}]; no template for: [{}]",
            missing.join(", "),
            unknown.join(", ")
        ),
    })
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Materializes a fresh project tree for an identity record.
///
/// Rendering always targets an explicit directory; the process working
/// directory is never touched.
pub trait TemplateRenderer {
    /// Render the project into `<out_dir>/<project_slug>` and return that path.
    fn render(&self, metadata: &ProjectMetadata, out_dir: &Path) -> Result<PathBuf, RenderError>;
}

/// Tera-based renderer over the embedded templates.
///
/// Create once with [`Renderer::new`] and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Construct a new [`Renderer`] with embedded templates.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { tera: build_tera()? })
    }

    /// Render every file of the project in memory.
    ///
    /// Returns `Vec<(relative_path, rendered_content)>`, identity file last.
    pub fn render_files(
        &self,
        metadata: &ProjectMetadata,
    ) -> Result<Vec<(PathBuf, String)>, RenderError> {
        let kind = TemplateKind::from_handle(&metadata.template_handle)?;
        let ctx = TemplateContext::from_metadata(metadata);
        let tera_ctx = ctx.to_tera_context()?;

        let mut results = Vec::new();
        for (name, output) in kind.files() {
            let content = self.tera.render(name, &tera_ctx)?;
            let rel = output.replace(SLUG, &metadata.project_slug_no_hyphen);
            results.push((PathBuf::from(rel), content));
        }
        results.push((PathBuf::from(METADATA_FILE), metadata::to_yaml(metadata)?));
        Ok(results)
    }
}

impl TemplateRenderer for Renderer {
    fn render(&self, metadata: &ProjectMetadata, out_dir: &Path) -> Result<PathBuf, RenderError> {
        let project_dir = out_dir.join(&metadata.project_slug);
        if project_dir.exists() {
            return Err(RenderError::TargetExists { path: project_dir });
        }
        let files = self.render_files(metadata)?;
        for (rel, content) in &files {
            let path = project_dir.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            std::fs::write(&path, content).map_err(|e| io_err(&path, e))?;
        }
        tracing::debug!(
            "rendered {} files of {} {} into {}",
            files.len(),
            metadata.template_handle,
            metadata.template_version,
            project_dir.display()
        );
        Ok(project_dir)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
