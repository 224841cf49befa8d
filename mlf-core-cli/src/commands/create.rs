//! `mlf-core create`: render a new project from a template.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use inquire::{Confirm, Select, Text};

use mlf_core_core::git::{git_available, GitRepo};
use mlf_core_core::metadata::slugify;
use mlf_core_core::types::{ProjectMetadata, TemplateHandle};
use mlf_core_core::user_config::{self, UserConfig};
use mlf_core_core::{version, TemplateRegistry};
use mlf_core_renderer::context::DEFAULT_PROJECT_VERSION;
use mlf_core_renderer::{validate_registry, Renderer, TemplateRenderer};
use mlf_core_sync::engine::DEFAULT_REMOTE;
use mlf_core_sync::TEMPLATE_BRANCH;

use super::print_lint_report;

/// Branch holding the day-to-day work of a new project.
const DEVELOPMENT_BRANCH: &str = "development";

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Template domain, e.g. `mlflow` or `package`.
    #[arg(long)]
    pub domain: Option<String>,

    /// Framework or flavour within the domain, e.g. `pytorch`.
    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub project_name: Option<String>,

    /// One-line project description.
    #[arg(long)]
    pub description: Option<String>,

    /// Initial project version.
    #[arg(long)]
    pub version: Option<String>,

    #[arg(long)]
    pub license: Option<String>,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub github_username: Option<String>,

    /// The project lives in a GitHub repository (enables pull request syncs).
    #[arg(long)]
    pub github_repo: bool,

    /// The GitHub repository is private (implies `--github-repo`).
    #[arg(long)]
    pub private: bool,

    /// GitHub organisation owning the repository (implies `--github-repo`).
    #[arg(long, value_name = "NAME")]
    pub github_orga: Option<String>,

    /// Directory the project folder is created in.
    #[arg(long, short = 'o', default_value = ".")]
    pub output_dir: PathBuf,

    /// Never prompt; use flags, the user config and defaults.
    #[arg(long)]
    pub no_input: bool,
}

/// Every answer needed to render a project.
#[derive(Debug)]
struct Answers {
    handle: TemplateHandle,
    project_name: String,
    description: Option<String>,
    version: String,
    license: String,
    full_name: Option<String>,
    email: Option<String>,
    github_username: String,
    github: GithubLink,
}

/// Where the project's GitHub repository lives, if it has one.
#[derive(Debug, Default)]
struct GithubLink {
    is_github_repo: bool,
    is_repo_private: bool,
    orga: Option<String>,
}

impl CreateArgs {
    pub fn run(self) -> Result<()> {
        let registry = TemplateRegistry::load().context("failed to load the template registry")?;
        validate_registry(&registry).context("template registry does not match the shipped templates")?;
        let defaults = user_config::load().context("failed to load the user config")?;

        let output_dir = self.output_dir.clone();
        let answers = self.collect_answers(&registry, &defaults)?;
        let template_version = registry
            .version_of(&answers.handle)
            .with_context(|| format!("unknown template '{}'", answers.handle))?
            .to_string();

        let metadata = build_metadata(&answers, &template_version);
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("cannot create '{}'", output_dir.display()))?;
        let renderer = Renderer::new().context("failed to load the embedded templates")?;
        let project_dir = renderer
            .render(&metadata, &output_dir)
            .with_context(|| format!("failed to create {}", metadata.project_slug))?;

        println!(
            "{} created {} from {} {}",
            "✓".green(),
            project_dir.display().to_string().bold(),
            answers.handle,
            template_version
        );

        if git_available() {
            if let Err(err) = init_repository(&project_dir, &metadata, &template_version) {
                println!("{} could not initialise git: {err:#}", "!".yellow());
            }
        } else {
            println!("{} git not found; skipped repository setup", "!".yellow());
        }

        let report = mlf_core_lint::lint_project(&project_dir)
            .with_context(|| format!("failed to lint '{}'", project_dir.display()))?;
        print_lint_report(&report);
        Ok(())
    }

    fn collect_answers(self, registry: &TemplateRegistry, defaults: &UserConfig) -> Result<Answers> {
        let interactive = !self.no_input;

        let domains = unique(registry.entries().iter().map(|e| e.handle.domain().to_string()));
        let domain = match self.domain {
            Some(domain) => domain.to_ascii_lowercase(),
            None if interactive => Select::new("Choose a domain:", domains.clone())
                .prompt()
                .context("no domain chosen")?,
            None => bail!("--domain is required with --no-input (one of: {})", domains.join(", ")),
        };

        let languages = unique(
            registry
                .entries()
                .iter()
                .filter(|e| e.handle.domain() == domain)
                .filter_map(|e| e.handle.language().map(str::to_string)),
        );
        if languages.is_empty() {
            bail!("unknown domain '{domain}' (one of: {})", domains.join(", "));
        }
        let language = match self.language {
            Some(language) => language.to_ascii_lowercase(),
            None if languages.len() == 1 => languages[0].clone(),
            None if interactive => Select::new("Choose a template:", languages.clone())
                .prompt()
                .context("no template chosen")?,
            None => bail!(
                "--language is required with --no-input (one of: {})",
                languages.join(", ")
            ),
        };
        let handle = TemplateHandle::from(format!("{domain}-{language}"));

        let project_name = match self.project_name {
            Some(name) => name,
            None if interactive => ask("Project name", None)?,
            None => bail!("--project-name is required with --no-input"),
        };
        if slugify(&project_name).0.is_empty() {
            bail!("the project name must not be empty");
        }

        let description = match self.description {
            Some(d) => Some(d),
            None if interactive => {
                let default = format!("{project_name}. A mlf-core based project.");
                Some(ask("Short description", Some(&default))?)
            }
            None => None,
        };

        let version = match self.version {
            Some(v) => v,
            None if interactive => ask("Initial version", Some(DEFAULT_PROJECT_VERSION))?,
            None => DEFAULT_PROJECT_VERSION.to_string(),
        };
        if !version::is_valid(&version) {
            bail!("invalid version '{version}': expected the form 0.0.0 or 0.0.0-SNAPSHOT");
        }

        let license = match self.license {
            Some(l) => l,
            None if interactive => Select::new("License:", LICENSES.to_vec())
                .prompt()
                .context("no license chosen")?
                .to_string(),
            None => "MIT".to_string(),
        };

        let full_name =
            answer_or_default(self.full_name, &defaults.full_name, "Full name", interactive)?;
        let email = answer_or_default(self.email, &defaults.email, "Email", interactive)?;
        let github_username = answer_or_default(
            self.github_username,
            &defaults.github_username,
            "GitHub username",
            interactive,
        )?
        .unwrap_or_default();

        let github = if self.github_repo || self.private || self.github_orga.is_some() {
            GithubLink {
                is_github_repo: true,
                is_repo_private: self.private,
                orga: self.github_orga.filter(|o| !o.trim().is_empty()),
            }
        } else if interactive {
            ask_github_link()?
        } else {
            GithubLink::default()
        };

        Ok(Answers {
            handle,
            project_name,
            description,
            version,
            license,
            full_name,
            email,
            github_username,
            github,
        })
    }
}

fn ask_github_link() -> Result<GithubLink> {
    let yes_no = |question: &str| {
        Confirm::new(question)
            .with_default(false)
            .prompt()
            .with_context(|| format!("no answer to '{question}'"))
    };
    if !yes_no("Does the project live in a GitHub repository?")? {
        return Ok(GithubLink::default());
    }
    let is_repo_private = yes_no("Is the repository private?")?;
    let orga = if yes_no("Does the repository belong to an organisation?")? {
        Some(ask("Organisation name", None)?)
    } else {
        None
    };
    Ok(GithubLink { is_github_repo: true, is_repo_private, orga })
}

const LICENSES: [&str; 7] = [
    "MIT",
    "BSD",
    "ISCL",
    "GNUv3",
    "Apache Software License 2.0",
    "Boost Software License 1.0",
    "Not open source",
];

fn unique(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn ask(label: &str, default: Option<&str>) -> Result<String> {
    let mut text = Text::new(label);
    if let Some(default) = default {
        text = text.with_default(default);
    }
    text.prompt().with_context(|| format!("no answer for '{label}'"))
}

/// Flag, then user config, then a prompt when interactive.
fn answer_or_default(
    flag: Option<String>,
    configured: &Option<String>,
    label: &str,
    interactive: bool,
) -> Result<Option<String>> {
    match (flag, configured) {
        (Some(value), _) => Ok(Some(value)),
        (None, Some(value)) => Ok(Some(value.clone())),
        (None, None) if interactive => ask(label, None).map(Some),
        (None, None) => Ok(None),
    }
}

fn build_metadata(answers: &Answers, template_version: &str) -> ProjectMetadata {
    let (project_slug, project_slug_no_hyphen) = slugify(&answers.project_name);
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();

    let mut extra: BTreeMap<String, serde_yaml::Value> = BTreeMap::new();
    extra.insert("project_name".into(), answers.project_name.clone().into());
    extra.insert("version".into(), answers.version.clone().into());
    extra.insert("license".into(), answers.license.clone().into());
    extra.insert("creation_date".into(), today.into());
    if let Some(description) = &answers.description {
        extra.insert("project_short_description".into(), description.clone().into());
    }
    if let Some(full_name) = &answers.full_name {
        extra.insert("full_name".into(), full_name.clone().into());
    }
    if let Some(email) = &answers.email {
        extra.insert("email".into(), email.clone().into());
    }

    ProjectMetadata {
        template_handle: answers.handle.clone(),
        template_version: template_version.to_string(),
        project_slug,
        project_slug_no_hyphen,
        github_username: answers.github_username.clone(),
        is_github_repo: answers.github.is_github_repo,
        is_repo_private: answers.github.is_repo_private,
        is_github_orga: answers.github.orga.is_some(),
        github_orga: answers.github.orga.clone(),
        answers: extra,
    }
}

/// `development` with the initial commit, plus a `TEMPLATE` branch at the
/// same commit for later syncs.
fn init_repository(project_dir: &Path, metadata: &ProjectMetadata, template_version: &str) -> Result<()> {
    let repo = GitRepo::init(project_dir, DEVELOPMENT_BRANCH)?;
    repo.add_all()?;
    repo.commit(&format!(
        "Create {} with {} template version {template_version} using mlf-core {}",
        metadata.project_slug,
        metadata.template_handle,
        env!("CARGO_PKG_VERSION")
    ))?;
    repo.create_branch(TEMPLATE_BRANCH)?;
    if metadata.is_github_repo {
        let url = format!(
            "https://github.com/{}/{}.git",
            metadata.repo_owner(),
            metadata.project_slug
        );
        repo.run(&["remote", "add", DEFAULT_REMOTE, &url])?;
        tracing::info!("added remote {DEFAULT_REMOTE} -> {url}");
    }
    tracing::info!("initialised git repository on {DEVELOPMENT_BRANCH} with {TEMPLATE_BRANCH}");
    println!(
        "{} initialised git on {} with a {} branch",
        "✓".green(),
        DEVELOPMENT_BRANCH.cyan(),
        TEMPLATE_BRANCH.cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers() -> Answers {
        Answers {
            handle: TemplateHandle::from("mlflow-pytorch"),
            project_name: "Flower Net".into(),
            description: None,
            version: "0.1.0-SNAPSHOT".into(),
            license: "MIT".into(),
            full_name: Some("Ada Lovelace".into()),
            email: None,
            github_username: "ada".into(),
            github: GithubLink::default(),
        }
    }

    #[test]
    fn metadata_carries_slugs_and_answers() {
        let meta = build_metadata(&answers(), "1.0.0");
        assert_eq!(meta.project_slug, "flower-net");
        assert_eq!(meta.project_slug_no_hyphen, "flower_net");
        assert_eq!(meta.template_version, "1.0.0");
        assert_eq!(meta.answer("full_name").as_deref(), Some("Ada Lovelace"));
        assert_eq!(meta.answer("email"), None);
        assert!(meta.answer("creation_date").is_some());
    }

    #[test]
    fn organisation_owns_the_repository() {
        let in_orga = Answers {
            github: GithubLink {
                is_github_repo: true,
                is_repo_private: true,
                orga: Some("acme".into()),
            },
            ..answers()
        };
        let meta = build_metadata(&in_orga, "1.0.0");
        assert!(meta.is_github_repo && meta.is_repo_private && meta.is_github_orga);
        assert_eq!(meta.repo_owner(), "acme");

        let meta = build_metadata(&answers(), "1.0.0");
        assert!(!meta.is_github_repo && !meta.is_github_orga);
        assert_eq!(meta.github_orga, None);
    }

    #[test]
    fn flag_beats_user_config() {
        let configured = Some("config".to_string());
        let got = answer_or_default(Some("flag".into()), &configured, "x", false).unwrap();
        assert_eq!(got.as_deref(), Some("flag"));
        let got = answer_or_default(None, &configured, "x", false).unwrap();
        assert_eq!(got.as_deref(), Some("config"));
        assert_eq!(answer_or_default(None, &None, "x", false).unwrap(), None);
    }
}
