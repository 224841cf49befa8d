//! # mlf-core-renderer
//!
//! Tera-based template engine that renders a complete project tree from an
//! mlf-core identity record.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use mlf_core_renderer::{Renderer, TemplateRenderer};
//! use mlf_core_core::metadata;
//!
//! fn rerender(project: &Path, scratch: &Path) {
//!     if let (Ok(renderer), Ok(meta)) = (Renderer::new(), metadata::load(project)) {
//!         if let Ok(dir) = renderer.render(&meta, scratch) {
//!             println!("rendered into {}", dir.display());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateContext;
pub use engine::{validate_registry, Renderer, TemplateKind, TemplateRenderer};
pub use error::RenderError;
