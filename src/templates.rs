//! Template loading and rendering using Tera.
//!
//! HTML pages are rendered from templates loaded out of a templates directory
//! on disk, with embedded copies as fallback for any template the directory
//! does not provide.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tera::{Context, Tera};

/// Default templates directory relative to the working directory.
const TEMPLATES_DIR: &str = "templates";

/// Template name suffixes rendered with HTML escaping.
const AUTOESCAPE_SUFFIXES: [&str; 1] = [".html.tera"];

/// Embedded default templates for fallback when files don't exist.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("base.html.tera", include_str!("../templates/base.html.tera"));
    m.insert("board.html.tera", include_str!("../templates/board.html.tera"));
    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

/// Initialize the template engine with templates from the specified directory.
///
/// If the directory doesn't exist, templates are loaded from embedded
/// defaults. Templates missing from the directory also fall back to the
/// embedded copies, so a directory may override just one page.
///
/// # Errors
///
/// Returns an error if the templates directory exists but contains invalid
/// templates.
pub fn init_templates(templates_dir: Option<&Path>) -> Result<()> {
    let dir = templates_dir.map_or_else(
        || std::env::current_dir().unwrap_or_default().join(TEMPLATES_DIR),
        Path::to_path_buf,
    );

    let mut tera = Tera::default();

    // Parse only: inheritance chains are built once the embedded parents are in.
    if dir.is_dir() {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        tera = Tera::parse(&glob_pattern).map_err(|e| {
            Error::Template(format!("Failed to load templates from {}: {e}", dir.display()))
        })?;
        tracing::debug!(dir = %dir.display(), "loaded templates from disk");
    }

    let missing: Vec<(&str, &str)> = EMBEDDED_TEMPLATES
        .iter()
        .filter(|(name, _)| !tera.get_template_names().any(|loaded| loaded == **name))
        .map(|(name, content)| (*name, *content))
        .collect();
    tera.add_raw_templates(missing)
        .map_err(|e| Error::Template(format!("Failed to build templates: {e}")))?;
    tera.autoescape_on(AUTOESCAPE_SUFFIXES.to_vec());

    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = Some(tera);

    Ok(())
}

/// Render a template with the given context.
///
/// Templates are lazy-loaded from the filesystem on first use, with embedded
/// defaults as fallback.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let needs_init = TERA.read().map_err(|e| Error::Template(e.to_string()))?.is_none();

    if needs_init {
        init_templates(None)?;
    }

    let guard = TERA.read().map_err(|e| Error::Template(e.to_string()))?;
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    let rendered = tera
        .render(name, context)
        .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))?;
    drop(guard);

    Ok(rendered)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = None;
    Ok(())
}

/// Get the list of all embedded template names.
#[must_use]
pub fn embedded_template_names() -> Vec<&'static str> {
    EMBEDDED_TEMPLATES.keys().copied().collect()
}

/// Load templates from `templates_dir` (embedded copies fill the gaps) and
/// render every page with sample data.
///
/// Replaces the cached engine.
///
/// # Errors
///
/// Returns an error if a template fails to parse or render.
pub fn verify_all_templates(templates_dir: Option<&Path>) -> Result<()> {
    reset_cache()?;
    init_templates(templates_dir)?;

    let ctx = sample_context();
    for name in embedded_template_names() {
        render(name, &ctx)
            .map_err(|e| Error::Template(format!("Template {name} failed to render: {e}")))?;
    }

    Ok(())
}

/// A context carrying every variable the embedded templates read.
fn sample_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("title", "Task Board");
    ctx.insert("filter", "active");
    ctx.insert("version", crate::VERSION);
    ctx.insert(
        "filters",
        &serde_json::json!([
            {"name": "active", "selected": true},
            {"name": "overdue", "selected": false},
        ]),
    );
    ctx.insert(
        "tasks",
        &serde_json::json!([
            {
                "id": "5b0e8c1e-3c57-4a4e-9d1c-2f7f3c1a9b10",
                "title": "Sample task",
                "is_completed": false,
                "is_archived": false,
                "created_ago": "just now",
                "due_date_formatted": "2025-12-31 13:01",
                "is_overdue": true,
            },
            {
                "id": "0a6f0d52-6a0c-4b0b-8d65-0c3c0f1d2e3f",
                "title": "Archived task",
                "is_completed": true,
                "is_archived": true,
                "created_ago": "3d ago",
                "due_date_formatted": null,
                "is_overdue": false,
            },
        ]),
    );
    ctx
}
