//! `mlf-core config general|pat|view`

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use inquire::{Password, PasswordDisplayMode, Text};

use mlf_core_core::user_config::{self, UserConfig};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Set the full name, email and GitHub username used for new projects.
    General(GeneralArgs),
    /// Store a GitHub personal access token for `mlf-core sync`.
    Pat(PatArgs),
    /// Print the current configuration.
    View,
}

#[derive(Args, Debug)]
pub struct GeneralArgs {
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub github_username: Option<String>,
}

#[derive(Args, Debug)]
pub struct PatArgs {
    /// Token to store. Prompted for when omitted.
    #[arg(long)]
    pub token: Option<String>,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::General(args) => set_general(args),
        ConfigCommand::Pat(args) => set_pat(args),
        ConfigCommand::View => view(),
    }
}

fn set_general(args: GeneralArgs) -> Result<()> {
    let mut config = user_config::load().context("failed to load the user config")?;
    let interactive =
        args.full_name.is_none() && args.email.is_none() && args.github_username.is_none();

    if interactive {
        config.full_name = Some(prompt("Full name", config.full_name.as_deref())?);
        config.email = Some(prompt("Email", config.email.as_deref())?);
        config.github_username =
            Some(prompt("GitHub username", config.github_username.as_deref())?);
    } else {
        config.full_name = args.full_name.or(config.full_name);
        config.email = args.email.or(config.email);
        config.github_username = args.github_username.or(config.github_username);
    }

    user_config::save(&config).context("failed to save the user config")?;
    println!("{} saved general settings", "✓".green());
    Ok(())
}

fn set_pat(args: PatArgs) -> Result<()> {
    let token = match args.token {
        Some(token) => token,
        None => Password::new("GitHub personal access token:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("no token entered (pass --token to skip the prompt)")?,
    };
    let token = token.trim();
    if token.is_empty() {
        bail!("the personal access token must not be empty");
    }
    user_config::set_token(token).context("failed to store the token")?;
    println!("{} stored personal access token", "✓".green());
    Ok(())
}

fn view() -> Result<()> {
    let path = user_config::user_config_path().context("failed to locate the user config")?;
    let config = user_config::load().context("failed to load the user config")?;
    if config == UserConfig::default() {
        println!("No user config at {}. Run `mlf-core config general`.", path.display());
        return Ok(());
    }

    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".dimmed().to_string());
    println!("{}", path.display().to_string().dimmed());
    println!("full_name:       {}", show(&config.full_name));
    println!("email:           {}", show(&config.email));
    println!("github_username: {}", show(&config.github_username));
    println!("pat:             {}", config.pat.as_deref().map(mask).unwrap_or_else(|| "-".to_string()));
    Ok(())
}

fn prompt(label: &str, current: Option<&str>) -> Result<String> {
    let mut text = Text::new(label);
    if let Some(current) = current {
        text = text.with_default(current);
    }
    text.prompt().with_context(|| format!("no answer for '{label}'"))
}

/// Keep the last four characters of a token.
pub(crate) fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::mask;

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask("ghp_abcdef1234"), "**********1234");
        assert_eq!(mask("abc"), "***");
    }
}
