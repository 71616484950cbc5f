use std::collections::HashMap;

use crate::model::{Link, Record};

/// Lookup from record id to record over one delivery result set.
///
/// Sources are indexed in the order root results, included entries, included
/// assets. When an id appears more than once the later copy wins.
#[derive(Debug, Clone, Default)]
pub struct LinkIndex<'a> {
    records: HashMap<&'a str, &'a Record>,
}

impl<'a> LinkIndex<'a> {
    pub fn build(root: &'a [Record], entries: &'a [Record], assets: &'a [Record]) -> Self {
        let mut records = HashMap::with_capacity(root.len() + entries.len() + assets.len());
        for record in root.iter().chain(entries).chain(assets) {
            records.insert(record.id.as_str(), record);
        }
        Self { records }
    }

    pub fn resolve(&self, id: &str) -> Option<&'a Record> {
        self.records.get(id).copied()
    }

    pub fn resolve_link(&self, link: &Link) -> Option<&'a Record> {
        self.resolve(&link.id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
