//! Page block transformation

use tracing::debug;

use crate::image::resolve_image_url;
use crate::link_index::LinkIndex;
use crate::model::{Block, Record, Story};

/// Block content types with a dedicated shape. Every other tag becomes
/// [`Block::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    FullWidthText,
    TextImage,
    FullWidthImage,
    StoriesListing,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::FullWidthText,
        BlockKind::TextImage,
        BlockKind::FullWidthImage,
        BlockKind::StoriesListing,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::FullWidthText => "fullWidthTextBlock",
            BlockKind::TextImage => "textImageBlock",
            BlockKind::FullWidthImage => "fullWidthImageBlock",
            BlockKind::StoriesListing => "storiesListingBlock",
        }
    }
}

/// Fields tried in order for a story summary.
const STORY_SUMMARY_FIELDS: &[&str] = &["summary", "content"];

pub fn transform_block(record: &Record, index: &LinkIndex<'_>) -> Block {
    let id = record.id.clone();
    let title = record.fields.value("title");
    let tag = record.content_type.as_deref().unwrap_or_default();

    let Some(kind) = BlockKind::from_tag(tag) else {
        debug!(block = %record.id, tag, "unrecognized block type");
        return Block::Unknown {
            id,
            kind: tag.to_string(),
            title,
        };
    };

    match kind {
        BlockKind::FullWidthText => Block::FullWidthText {
            id,
            title,
            content: record.fields.get("content").cloned(),
        },
        BlockKind::TextImage => Block::TextImage {
            id,
            title,
            content: record.fields.get("content").cloned(),
            image: resolve_image_url(record.fields.link("image").as_ref(), index),
        },
        BlockKind::FullWidthImage => Block::FullWidthImage {
            id,
            title,
            image: resolve_image_url(record.fields.link("image").as_ref(), index),
        },
        BlockKind::StoriesListing => Block::StoriesListing {
            id,
            title,
            stories: collect_stories(record, index),
        },
    }
}

fn collect_stories(block: &Record, index: &LinkIndex<'_>) -> Vec<Story> {
    block
        .fields
        .links("selectStories")
        .iter()
        .filter_map(|link| match index.resolve_link(link) {
            Some(story) => Some(project_story(story, index)),
            None => {
                debug!(block = %block.id, story = %link.id, "dropping unresolved story link");
                None
            }
        })
        .collect()
}

fn project_story(story: &Record, index: &LinkIndex<'_>) -> Story {
    Story {
        id: story.id.clone(),
        title: story.fields.value("title"),
        summary: story.fields.first_truthy(STORY_SUMMARY_FIELDS),
        image: resolve_image_url(story.fields.link("image").as_ref(), index),
    }
}
