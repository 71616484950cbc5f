use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use deluxe_core::assemble::assemble_collection;
use deluxe_core::delivery::PageQuery;
use deluxe_core::templates::render_page_html;
use tracing::info;

use crate::client::EntrySource;

pub struct BuildOpts {
    pub out_dir: PathBuf,
    pub slug: String,
    pub stylesheet: Option<PathBuf>,
}

/// Fetches the page, renders `index.html` into the output dir and copies the
/// stylesheet beside it. Returns the path of the written page.
pub fn build_site(source: &dyn EntrySource, opts: &BuildOpts) -> Result<PathBuf> {
    let query = PageQuery::for_slug(Some(&opts.slug));
    let collection = source
        .fetch_entries(&query)
        .context("failed to fetch page data")?;
    info!(
        items = collection.items.len(),
        entries = collection.includes.entries.len(),
        assets = collection.includes.assets.len(),
        "loaded {} entries",
        query.content_type
    );
    let page = assemble_collection(&collection)
        .with_context(|| format!("no {} with slug '{}'", query.content_type, opts.slug))?;

    fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("failed to create {}", opts.out_dir.display()))?;
    let stylesheet_href = match &opts.stylesheet {
        Some(path) => Some(copy_stylesheet(path, &opts.out_dir)?),
        None => None,
    };

    let html = render_page_html(&page, stylesheet_href.as_deref())?;
    let index_path = opts.out_dir.join("index.html");
    fs::write(&index_path, html)
        .with_context(|| format!("failed to write {}", index_path.display()))?;
    info!(path = %index_path.display(), blocks = page.blocks.len(), "wrote page");
    Ok(index_path)
}

fn copy_stylesheet(path: &Path, out_dir: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid stylesheet path {}", path.display()))?
        .to_string();
    let target = out_dir.join(&file_name);
    fs::copy(path, &target).with_context(|| {
        format!(
            "failed to copy {} to {}",
            path.display(),
            target.display()
        )
    })?;
    Ok(file_name)
}
