use std::fs;
use std::path::PathBuf;

use deluxe_core::assemble::{AssembleError, assemble_collection, assemble_page};
use deluxe_core::delivery::EntryCollection;
use deluxe_core::model::{Block, Fields, Link, Record, Story};
use deluxe_core::templates::render_page_html;
use serde_json::json;

fn fixture_collection() -> EntryCollection {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("home.json");
    let raw = fs::read_to_string(&path).expect("read fixture");
    EntryCollection::from_json(&raw).expect("parse fixture")
}

#[test]
fn empty_result_set_is_not_found() {
    let collection = EntryCollection::from_json(r#"{"items":[]}"#).expect("parse");
    assert_eq!(assemble_collection(&collection), Err(AssembleError::NotFound));
}

#[test]
fn fixture_page_assembles_every_block() {
    let collection = fixture_collection();
    let page = assemble_collection(&collection).expect("assemble");
    assert_eq!(page.id, "page-home");
    assert_eq!(page.title, Some(json!("Welcome home")));
    assert_eq!(page.slug.as_deref(), Some("home"));

    let references = collection.items[0].fields.links("pageBlocks");
    assert_eq!(page.blocks.len(), references.len());
    let types: Vec<_> = page.blocks.iter().map(Block::type_name).collect();
    assert_eq!(
        types,
        vec![
            "fullWidthTextBlock",
            "textImageBlock",
            "fullWidthImageBlock",
            "storiesListingBlock",
            "customFutureBlock",
        ]
    );
}

#[test]
fn stories_listing_keeps_only_resolved_story() {
    let page = assemble_collection(&fixture_collection()).expect("assemble");
    let Block::StoriesListing { stories, title, .. } = &page.blocks[3] else {
        panic!("expected stories listing block");
    };
    assert_eq!(title, &Some(json!("Stories")));
    assert_eq!(
        stories,
        &vec![Story {
            id: "story-present".to_string(),
            title: Some(json!("Our first story")),
            summary: Some(json!("The whole story, told in full.")),
            image: Some(
                "https://images.ctfassets.net/space1/asset-story/def/story.png".to_string()
            ),
        }]
    );
}

#[test]
fn text_image_without_asset_serializes_null_image() {
    let page = assemble_collection(&fixture_collection()).expect("assemble");
    let value = serde_json::to_value(&page.blocks[1]).expect("serialize");
    assert_eq!(
        value,
        json!({
            "id": "block-side",
            "type": "textImageBlock",
            "title": "Side by side",
            "content": "Text next to a picture.",
            "image": null
        })
    );
}

#[test]
fn unknown_block_type_serializes_only_identity() {
    let page = assemble_collection(&fixture_collection()).expect("assemble");
    let value = serde_json::to_value(&page.blocks[4]).expect("serialize");
    assert_eq!(
        value,
        json!({ "id": "block-future", "type": "customFutureBlock", "title": "Coming soon" })
    );
}

#[test]
fn page_json_has_template_shape() {
    let page = assemble_collection(&fixture_collection()).expect("assemble");
    let value = serde_json::to_value(&page).expect("serialize");
    let keys: Vec<_> = value
        .as_object()
        .expect("object")
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys.len(), 4);
    for key in ["id", "title", "slug", "blocks"] {
        assert!(keys.iter().any(|k| k == key), "missing {key}");
    }
    assert_eq!(
        value["blocks"][2]["image"],
        json!("https://images.ctfassets.net/space1/asset-hero/abc/hero.jpg")
    );
    for block in value["blocks"].as_array().expect("blocks") {
        assert!(block.get("id").is_some());
        assert!(block.get("type").is_some());
        assert!(block.get("title").is_some());
    }
}

#[test]
fn duplicate_ids_resolve_to_the_included_copy() {
    let page = Record::entry(
        "page",
        "deluxePage",
        Fields::new().with("pageBlocks", json!([Link::new("page").to_value()])),
    );
    let root = vec![page];
    let entries = vec![Record::entry(
        "page",
        "fullWidthTextBlock",
        Fields::new().with("title", json!("shadowed")),
    )];
    let assembled = assemble_page(&root, &entries, &[]).expect("assemble");
    assert_eq!(assembled.blocks[0].type_name(), "fullWidthTextBlock");
    assert_eq!(assembled.blocks[0].title(), Some(&json!("shadowed")));
}

#[test]
fn fixture_page_renders_to_html() {
    let page = assemble_collection(&fixture_collection()).expect("assemble");
    let html = render_page_html(&page, None).expect("render");
    assert!(html.contains("<p>Hello from the intro.</p>"));
    assert!(html.contains("Our first story"));
    assert!(html.contains(
        "src=\"https:&#x2f;&#x2f;images.ctfassets.net&#x2f;space1&#x2f;asset-hero&#x2f;abc&#x2f;hero.jpg\""
    ));
    assert!(!html.contains("rel=\"stylesheet\""));
    assert!(!html.contains("should not leak"));
}
