//! Delivery API collection responses and the page query

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{Fields, Record, RecordKind};

pub const PAGE_CONTENT_TYPE: &str = "deluxePage";
pub const HOME_SLUG: &str = "home";
pub const DEFAULT_INCLUDE_DEPTH: u8 = 5;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid delivery response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Root results of an entries query plus the linked records delivered beside them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryCollection {
    pub items: Vec<Record>,
    pub includes: Includes,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Includes {
    pub entries: Vec<Record>,
    pub assets: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct EntryCollectionRaw {
    #[serde(default)]
    items: Vec<RecordRaw>,
    includes: Option<IncludesRaw>,
}

#[derive(Debug, Deserialize)]
struct IncludesRaw {
    #[serde(rename = "Entry", default)]
    entries: Vec<RecordRaw>,
    #[serde(rename = "Asset", default)]
    assets: Vec<RecordRaw>,
}

#[derive(Debug, Deserialize)]
struct RecordRaw {
    sys: SysRaw,
    fields: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct SysRaw {
    id: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(rename = "contentType")]
    content_type: Option<LinkRaw>,
}

#[derive(Debug, Deserialize)]
struct LinkRaw {
    sys: LinkSysRaw,
}

#[derive(Debug, Deserialize)]
struct LinkSysRaw {
    id: String,
}

impl RecordRaw {
    fn into_record(self, default_kind: RecordKind) -> Record {
        let kind = match self.sys.kind.as_deref() {
            Some("Asset") => RecordKind::Asset,
            Some("Entry") => RecordKind::Entry,
            _ => default_kind,
        };
        Record {
            id: self.sys.id,
            kind,
            content_type: self.sys.content_type.map(|link| link.sys.id),
            fields: self.fields.map(Fields::from).unwrap_or_default(),
        }
    }
}

impl EntryCollection {
    pub fn from_json(json: &str) -> Result<Self, DeliveryError> {
        let raw: EntryCollectionRaw = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_value(value: Value) -> Result<Self, DeliveryError> {
        let raw: EntryCollectionRaw = serde_json::from_value(value)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: EntryCollectionRaw) -> Self {
        let includes = raw.includes.map_or_else(Includes::default, |includes| Includes {
            entries: convert(includes.entries, RecordKind::Entry),
            assets: convert(includes.assets, RecordKind::Asset),
        });
        Self {
            items: convert(raw.items, RecordKind::Entry),
            includes,
        }
    }
}

fn convert(records: Vec<RecordRaw>, default_kind: RecordKind) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| record.into_record(default_kind))
        .collect()
}

/// Entries query selecting one page by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub content_type: String,
    pub slug: Option<String>,
    pub include: u8,
    pub limit: u32,
}

impl PageQuery {
    pub fn for_slug(slug: Option<&str>) -> Self {
        Self {
            content_type: PAGE_CONTENT_TYPE.to_string(),
            slug: slug.map(str::to_string),
            include: DEFAULT_INCLUDE_DEPTH,
            limit: 1,
        }
    }

    pub fn home() -> Self {
        Self::for_slug(Some(HOME_SLUG))
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("content_type".to_string(), self.content_type.clone())];
        if let Some(slug) = &self.slug {
            params.push(("fields.slug".to_string(), slug.clone()));
        }
        params.push(("include".to_string(), self.include.to_string()));
        params.push(("limit".to_string(), self.limit.to_string()));
        params
    }
}
