//! `mlf-core list`

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use mlf_core_core::TemplateRegistry;

#[derive(Args, Debug)]
pub struct ListArgs {}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "handle")]
    handle: String,
    #[tabled(rename = "version")]
    version: String,
    #[tabled(rename = "short description")]
    short_description: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let registry = TemplateRegistry::load().context("failed to load the template registry")?;
        let rows: Vec<TemplateRow> = registry
            .entries()
            .iter()
            .map(|entry| TemplateRow {
                name: entry.name.clone(),
                handle: entry.handle.to_string(),
                version: entry.version.clone(),
                short_description: entry.short_description.clone(),
            })
            .collect();

        println!("mlf-core v{} templates", env!("CARGO_PKG_VERSION"));
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
