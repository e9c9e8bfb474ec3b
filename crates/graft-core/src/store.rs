//! Read-only view of the normalized record store.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::query::FragmentNode;
use crate::{DataId, RecordData};

/// Reads records that are already present in the local graph.
///
/// Implementations never go to the network and never write.
pub trait RecordStore {
    /// Read one record through `fragment`.
    fn read(&self, fragment: &FragmentNode, id: &DataId) -> RecordData;

    /// Read several records through `fragment`, preserving the order of `ids`.
    fn read_all(&self, fragment: &FragmentNode, ids: &[DataId]) -> Vec<RecordData> {
        ids.iter().map(|id| self.read(fragment, id)).collect()
    }
}

/// A store snapshot held in memory.
///
/// Reads project the record onto the fragment's direct field selections; a
/// fragment without field selections sees the whole record. Unknown ids read
/// as `null`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: HashMap<DataId, Value>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<DataId>, record: Value) {
        self.records.insert(id.into(), record);
    }

    pub fn with_record(mut self, id: impl Into<DataId>, record: Value) -> Self {
        self.insert(id, record);
        self
    }

    /// Build a store from a JSON object of `id -> record`.
    pub fn from_json(snapshot: Value) -> Result<Self, serde_json::Error> {
        let records: HashMap<DataId, Value> = serde_json::from_value(snapshot)?;
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for InMemoryStore {
    fn read(&self, fragment: &FragmentNode, id: &DataId) -> RecordData {
        let Some(record) = self.records.get(id) else {
            return Value::Null;
        };

        let mut fields = fragment.fields().peekable();
        if fields.peek().is_none() {
            return record.clone();
        }

        let mut projected = Map::new();
        for field in fields {
            if let Some(value) = record.get(&field.name) {
                projected.insert(field.response_key().to_string(), value.clone());
            }
        }
        Value::Object(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FieldNode;
    use serde_json::json;

    fn store() -> InMemoryStore {
        InMemoryStore::from_json(json!({
            "story:1": { "id": "story:1", "text": "hi", "likeCount": 3 },
            "user:1": { "id": "user:1", "name": "Ada" }
        }))
        .unwrap()
    }

    #[test]
    fn read_projects_direct_fields() {
        let fragment = FragmentNode::new("story", "Story")
            .with_field("text")
            .with_child(FieldNode::new("likeCount").with_alias("likes"));
        let data = store().read(&fragment, &DataId::from("story:1"));
        assert_eq!(data, json!({ "text": "hi", "likes": 3 }));
    }

    #[test]
    fn read_without_fields_returns_whole_record() {
        let fragment = FragmentNode::new("user", "User");
        let data = store().read(&fragment, &DataId::from("user:1"));
        assert_eq!(data, json!({ "id": "user:1", "name": "Ada" }));
    }

    #[test]
    fn read_all_keeps_order_and_nulls_unknown() {
        let fragment = FragmentNode::new("nodes", "Node").plural();
        let ids = vec![
            DataId::from("user:1"),
            DataId::from("missing"),
            DataId::from("story:1"),
        ];
        let data = store().read_all(&fragment, &ids);
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["name"], "Ada");
        assert_eq!(data[1], Value::Null);
        assert_eq!(data[2]["text"], "hi");
    }
}
