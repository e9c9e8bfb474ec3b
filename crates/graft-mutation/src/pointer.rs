//! Fragment pointers embedded in record data.
//!
//! Data read through a parent fragment carries, under the child fragment's
//! concrete id, the record id(s) backing the child:
//!
//! ```json
//! { "__fragment_story": { "dataID": "story:1" } }
//! { "__fragment_likers": { "dataIDs": ["user:1", "user:2"] } }
//! ```
//!
//! A bare string is accepted as shorthand for `{ "dataID": ... }`.

use graft_core::{DataId, FragmentNode};
use serde_json::{Value, json};

pub const DATA_ID_KEY: &str = "dataID";
pub const DATA_IDS_KEY: &str = "dataIDs";

/// Record id(s) a prop value points at for one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentPointer {
    Single(DataId),
    Many(Vec<DataId>),
}

impl FragmentPointer {
    /// Pull the pointer for `fragment` out of `value`, if it has one.
    pub fn extract(value: &Value, fragment: &FragmentNode) -> Option<Self> {
        let pointer = value.as_object()?.get(&fragment.concrete_id)?;
        match pointer {
            Value::String(id) => Some(Self::Single(DataId::new(id.as_str()))),
            Value::Object(fields) => {
                if let Some(Value::String(id)) = fields.get(DATA_ID_KEY) {
                    return Some(Self::Single(DataId::new(id.as_str())));
                }
                let Some(Value::Array(ids)) = fields.get(DATA_IDS_KEY) else {
                    return None;
                };
                ids.iter()
                    .map(|id| id.as_str().map(DataId::new))
                    .collect::<Option<Vec<_>>>()
                    .map(Self::Many)
            }
            _ => None,
        }
    }

    /// The one record this pointer names, if it names exactly one.
    pub fn single_id(&self) -> Option<&DataId> {
        match self {
            Self::Single(id) => Some(id),
            Self::Many(ids) if ids.len() == 1 => ids.first(),
            Self::Many(_) => None,
        }
    }

    /// Number of records named.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_data_ids(self) -> Vec<DataId> {
        match self {
            Self::Single(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }

    /// Record data pointing `fragment` at one record.
    pub fn for_record(fragment: &FragmentNode, id: &DataId) -> Value {
        json!({ fragment.concrete_id.as_str(): { DATA_ID_KEY: id } })
    }

    /// Record data pointing `fragment` at several records.
    pub fn for_records(fragment: &FragmentNode, ids: &[DataId]) -> Value {
        json!({ fragment.concrete_id.as_str(): { DATA_IDS_KEY: ids } })
    }
}

/// Values a prop may hold to mean "nothing to resolve".
///
/// `null`, `false`, `0` and `""`.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
