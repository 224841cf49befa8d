//! `mlf-core info <handle>`

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use mlf_core_core::TemplateRegistry;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// A full handle such as `mlflow-pytorch`, or a domain such as `mlflow`.
    pub handle: String,
}

#[derive(Tabled)]
struct InfoRow {
    #[tabled(rename = "handle")]
    handle: String,
    #[tabled(rename = "version")]
    version: String,
    #[tabled(rename = "long description")]
    long_description: String,
    #[tabled(rename = "available libraries")]
    available_libraries: String,
}

impl InfoArgs {
    pub fn run(self) -> Result<()> {
        let registry = TemplateRegistry::load().context("failed to load the template registry")?;
        let handle = self.handle.trim().to_ascii_lowercase();
        let matches = registry.with_prefix(&handle);
        if matches.is_empty() {
            bail!(
                "no template matches '{handle}'; run `mlf-core list` to see the available handles"
            );
        }

        println!("{}", format!("Templates matching '{handle}'").bold());
        let rows: Vec<InfoRow> = matches
            .into_iter()
            .map(|entry| InfoRow {
                handle: entry.handle.to_string(),
                version: entry.version.clone(),
                long_description: entry.long_description.trim().to_string(),
                available_libraries: entry.available_libraries.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
