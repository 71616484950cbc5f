//! Content records, links and the assembled page model

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::blocks::BlockKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Entry,
    Asset,
}

/// One CMS object as delivered, before any link resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub kind: RecordKind,
    pub content_type: Option<String>,
    pub fields: Fields,
}

impl Record {
    pub fn entry(id: impl Into<String>, content_type: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Entry,
            content_type: Some(content_type.into()),
            fields,
        }
    }

    pub fn asset(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Asset,
            content_type: None,
            fields,
        }
    }
}

/// Field data of a record. A JSON `null` reads the same as a missing key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    /// Raw value of `key`, copied verbatim.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }

    pub fn link(&self, key: &str) -> Option<Link> {
        self.get(key).and_then(Link::from_value)
    }

    /// Links of a list field in list order. Elements that are not links are
    /// skipped; a missing field is an empty list.
    pub fn links(&self, key: &str) -> Vec<Link> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Link::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// Value of the first key in `keys` holding a truthy value. When none
    /// does, the raw value of the last key, so `""` stays `""`.
    pub fn first_truthy(&self, keys: &[&str]) -> Option<Value> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| is_truthy(value))
            .or_else(|| keys.last().and_then(|key| self.get(key)))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Untyped reference to a record by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub id: String,
}

impl Link {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Reads `sys.id` from either a link object or an embedded record.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("sys")?.get("id")?.as_str()?;
        if id.is_empty() {
            return None;
        }
        Some(Self::new(id))
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "sys": { "type": "Link", "id": self.id }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub id: String,
    pub title: Option<Value>,
    pub summary: Option<Value>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    FullWidthText {
        id: String,
        title: Option<Value>,
        content: Option<Value>,
    },
    TextImage {
        id: String,
        title: Option<Value>,
        content: Option<Value>,
        image: Option<String>,
    },
    FullWidthImage {
        id: String,
        title: Option<Value>,
        image: Option<String>,
    },
    StoriesListing {
        id: String,
        title: Option<Value>,
        stories: Vec<Story>,
    },
    Unknown {
        id: String,
        kind: String,
        title: Option<Value>,
    },
}

impl Block {
    pub fn id(&self) -> &str {
        match self {
            Block::FullWidthText { id, .. }
            | Block::TextImage { id, .. }
            | Block::FullWidthImage { id, .. }
            | Block::StoriesListing { id, .. }
            | Block::Unknown { id, .. } => id,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Block::FullWidthText { .. } => BlockKind::FullWidthText.as_str(),
            Block::TextImage { .. } => BlockKind::TextImage.as_str(),
            Block::FullWidthImage { .. } => BlockKind::FullWidthImage.as_str(),
            Block::StoriesListing { .. } => BlockKind::StoriesListing.as_str(),
            Block::Unknown { kind, .. } => kind,
        }
    }

    pub fn title(&self) -> Option<&Value> {
        match self {
            Block::FullWidthText { title, .. }
            | Block::TextImage { title, .. }
            | Block::FullWidthImage { title, .. }
            | Block::StoriesListing { title, .. }
            | Block::Unknown { title, .. } => title.as_ref(),
        }
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", self.id())?;
        map.serialize_entry("type", self.type_name())?;
        map.serialize_entry("title", &self.title())?;
        match self {
            Block::FullWidthText { content, .. } => {
                map.serialize_entry("content", content)?;
            }
            Block::TextImage { content, image, .. } => {
                map.serialize_entry("content", content)?;
                map.serialize_entry("image", image)?;
            }
            Block::FullWidthImage { image, .. } => {
                map.serialize_entry("image", image)?;
            }
            Block::StoriesListing { stories, .. } => {
                map.serialize_entry("stories", stories)?;
            }
            Block::Unknown { .. } => {}
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub id: String,
    pub title: Option<Value>,
    pub slug: Option<String>,
    pub blocks: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_field_reads_as_missing() {
        let fields = Fields::new().with("title", Value::Null);
        assert_eq!(fields.get("title"), None);
        assert_eq!(fields.text("title"), None);
    }

    #[test]
    fn links_skip_non_link_elements() {
        let fields = Fields::new().with(
            "selectStories",
            json!([
                { "sys": { "type": "Link", "linkType": "Entry", "id": "a" } },
                "not a link",
                { "sys": { "id": "" } },
                { "sys": { "id": "b" }, "fields": { "title": "embedded" } }
            ]),
        );
        let ids: Vec<_> = fields
            .links("selectStories")
            .into_iter()
            .map(|link| link.id)
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn first_truthy_skips_empty_strings() {
        let fields = Fields::new()
            .with("summary", json!(""))
            .with("content", json!("long form"));
        assert_eq!(
            fields.first_truthy(&["summary", "content"]),
            Some(json!("long form"))
        );
    }

    #[test]
    fn first_truthy_falls_back_to_last_raw_value() {
        let fields = Fields::new()
            .with("summary", json!(""))
            .with("content", json!(""));
        assert_eq!(
            fields.first_truthy(&["summary", "content"]),
            Some(json!(""))
        );

        let summary_only = Fields::new().with("summary", json!(""));
        assert_eq!(summary_only.first_truthy(&["summary", "content"]), None);
    }

    #[test]
    fn localized_title_serializes_verbatim() {
        let block = Block::Unknown {
            id: "b3".to_string(),
            kind: "customFutureBlock".to_string(),
            title: Some(json!({ "en-US": "Hi" })),
        };
        let value = serde_json::to_value(&block).expect("serialize");
        assert_eq!(value["title"], json!({ "en-US": "Hi" }));
    }

    #[test]
    fn unknown_block_serializes_only_id_type_title() {
        let block = Block::Unknown {
            id: "b1".to_string(),
            kind: "customFutureBlock".to_string(),
            title: Some(json!("Later")),
        };
        let value = serde_json::to_value(&block).expect("serialize");
        assert_eq!(
            value,
            json!({ "id": "b1", "type": "customFutureBlock", "title": "Later" })
        );
    }

    #[test]
    fn text_image_block_serializes_absent_image_as_null() {
        let block = Block::TextImage {
            id: "b2".to_string(),
            title: None,
            content: Some(json!("Hello")),
            image: None,
        };
        let value = serde_json::to_value(&block).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": "b2",
                "type": "textImageBlock",
                "title": null,
                "content": "Hello",
                "image": null
            })
        );
    }
}
