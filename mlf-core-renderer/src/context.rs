//! Template context: serializable rendering payload built from [`ProjectMetadata`].

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use mlf_core_core::types::ProjectMetadata;

use crate::error::RenderError;

/// Version recorded for brand-new projects when no answer was given.
pub const DEFAULT_PROJECT_VERSION: &str = "0.1.0-SNAPSHOT";

/// Flat rendering payload. Every template sees the same fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub template_handle: String,
    pub template_version: String,
    pub domain: String,
    pub language: String,

    pub project_name: String,
    pub project_slug: String,
    pub project_slug_no_hyphen: String,
    pub project_short_description: String,
    pub version: String,
    pub license: String,

    pub full_name: String,
    pub email: String,
    pub github_username: String,
    /// `github_orga` for organisation repos, `github_username` otherwise.
    pub repo_owner: String,

    pub mlf_core_version: String,
    /// `YYYY-MM-DD`.
    pub creation_date: String,
    pub year: i32,

    /// RST bars; Tera has no string repetition.
    pub rst_title_bar: String,
    pub rst_docs_bar: String,
    /// First changelog section header, `{version} ({creation_date})`.
    pub changelog_header: String,
    pub changelog_underline: String,
}

impl TemplateContext {
    /// Build a [`TemplateContext`] from an identity record.
    ///
    /// Missing free-form answers fall back to neutral defaults; the creation
    /// date falls back to today.
    pub fn from_metadata(meta: &ProjectMetadata) -> Self {
        let answer = |key: &str, default: &str| {
            meta.answer(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let today = Local::now().date_naive();
        let creation_date = meta
            .answer("creation_date")
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
            .unwrap_or(today);

        let project_name = answer("project_name", &meta.project_slug);
        let version = answer("version", DEFAULT_PROJECT_VERSION);
        let domain = meta.template_handle.domain().to_string();
        let language = meta.template_handle.language().unwrap_or_default().to_string();

        let mut ctx = TemplateContext {
            template_handle: meta.template_handle.0.clone(),
            template_version: meta.template_version.clone(),
            domain,
            language,
            project_short_description: answer(
                "project_short_description",
                &format!("{project_name}. A mlf-core based project."),
            ),
            project_name,
            project_slug: meta.project_slug.clone(),
            project_slug_no_hyphen: meta.project_slug_no_hyphen.clone(),
            version: String::new(),
            license: answer("license", "MIT"),
            full_name: answer("full_name", "Homer Simpson"),
            email: answer("email", "homer.simpson@example.com"),
            github_username: meta.github_username.clone(),
            repo_owner: meta.repo_owner().to_string(),
            mlf_core_version: env!("CARGO_PKG_VERSION").to_string(),
            creation_date: creation_date.format("%Y-%m-%d").to_string(),
            year: creation_date.year(),
            rst_title_bar: String::new(),
            rst_docs_bar: String::new(),
            changelog_header: String::new(),
            changelog_underline: String::new(),
        };
        ctx.set_version(&version);
        ctx.rst_title_bar = "=".repeat(ctx.project_name.chars().count());
        ctx
    }

    /// Override the project version (and everything derived from it).
    pub fn with_project_version(mut self, version: &str) -> Self {
        self.set_version(version);
        self
    }

    fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
        self.rst_docs_bar = "=".repeat(self.project_name.chars().count() + 1 + version.len());
        self.changelog_header = format!("{version} ({})", self.creation_date);
        self.changelog_underline = "-".repeat(self.changelog_header.len());
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
