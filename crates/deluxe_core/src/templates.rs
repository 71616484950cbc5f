//! HTML page rendering

use anyhow::{Context, Result};
use minijinja::{AutoEscape, Environment, context};
use serde::Serialize;
use serde_json::Value;

use crate::model::{Block, Page, Story};
use crate::render::render_content_html;

const PAGE_TEMPLATE: &str = include_str!("../templates/page.html");
const BLOCK_TEMPLATE: &str = include_str!("../templates/partials/block.html");

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub blocks: Vec<BlockView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    pub id: String,
    pub kind: String,
    pub title: Option<String>,
    pub content_html: Option<String>,
    pub image: Option<String>,
    pub stories: Vec<StoryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryView {
    pub id: String,
    pub title: Option<String>,
    pub summary_html: Option<String>,
    pub image: Option<String>,
}

impl From<&Story> for StoryView {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id.clone(),
            title: display_text(story.title.as_ref()),
            summary_html: story.summary.as_ref().and_then(render_content_html),
            image: story.image.clone(),
        }
    }
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        let mut view = BlockView {
            id: block.id().to_string(),
            kind: block.type_name().to_string(),
            title: display_text(block.title()),
            content_html: None,
            image: None,
            stories: Vec::new(),
        };
        match block {
            Block::FullWidthText { content, .. } => {
                view.content_html = content.as_ref().and_then(render_content_html);
            }
            Block::TextImage { content, image, .. } => {
                view.content_html = content.as_ref().and_then(render_content_html);
                view.image = image.clone();
            }
            Block::FullWidthImage { image, .. } => {
                view.image = image.clone();
            }
            Block::StoriesListing { stories, .. } => {
                view.stories = stories.iter().map(StoryView::from).collect();
            }
            Block::Unknown { .. } => {}
        }
        view
    }
}

pub fn page_view(page: &Page) -> PageView {
    PageView {
        id: page.id.clone(),
        title: display_text(page.title.as_ref()),
        slug: page.slug.clone(),
        blocks: page.blocks.iter().map(BlockView::from).collect(),
    }
}

/// Only string values are shown; localized maps and other shapes render as absent.
fn display_text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

/// Renders a full HTML document. Without `stylesheet_href` no stylesheet link is emitted.
pub fn render_page_html(page: &Page, stylesheet_href: Option<&str>) -> Result<String> {
    let env = template_env().context("failed to initialize templates")?;
    let template = env
        .get_template("page.html")
        .context("missing page template")?;
    template
        .render(context! {
            page => page_view(page),
            stylesheet_href => stylesheet_href,
        })
        .with_context(|| format!("failed to render page {}", page.id))
}

fn template_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });
    env.add_template("page.html", PAGE_TEMPLATE)?;
    env.add_template("partials/block.html", BLOCK_TEMPLATE)?;
    Ok(env)
}
