//! Page assembly from a delivery result set

use thiserror::Error;
use tracing::debug;

use crate::blocks::transform_block;
use crate::delivery::EntryCollection;
use crate::link_index::LinkIndex;
use crate::model::{Block, Page, Record};

/// Block type reported for a page block reference that resolves to no record.
pub const UNRESOLVED_BLOCK_TYPE: &str = "unresolved";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("no page record in result set")]
    NotFound,
}

/// Builds the page from the first root result. The query upstream is expected
/// to have selected at most one page.
pub fn assemble_page(
    root: &[Record],
    entries: &[Record],
    assets: &[Record],
) -> Result<Page, AssembleError> {
    let page = root.first().ok_or(AssembleError::NotFound)?;
    let index = LinkIndex::build(root, entries, assets);

    let blocks = page
        .fields
        .links("pageBlocks")
        .iter()
        .map(|link| match index.resolve_link(link) {
            Some(record) => transform_block(record, &index),
            None => {
                debug!(page = %page.id, block = %link.id, "page block reference did not resolve");
                Block::Unknown {
                    id: link.id.clone(),
                    kind: UNRESOLVED_BLOCK_TYPE.to_string(),
                    title: None,
                }
            }
        })
        .collect();

    Ok(Page {
        id: page.id.clone(),
        title: page.fields.value("title"),
        slug: page.fields.text("slug"),
        blocks,
    })
}

pub fn assemble_collection(collection: &EntryCollection) -> Result<Page, AssembleError> {
    assemble_page(
        &collection.items,
        &collection.includes.entries,
        &collection.includes.assets,
    )
}
