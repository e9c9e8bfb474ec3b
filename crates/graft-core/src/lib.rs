use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Settings shared across all Graft crates
pub mod config;

pub mod mutation_config;
pub mod query;
pub mod store;

pub use config::{ConfigError, DiagnosticsConfig, GraftConfig, LoggingConfig};
pub use mutation_config::{
    FieldIds, MutationConfig, MutationConfigError, RangeBehaviors, RangeOperation,
    range_behavior_key,
};
pub use query::{Call, FieldNode, FragmentNode, QueryNode};
pub use store::{InMemoryStore, RecordStore};

/// Opaque key identifying one record in the normalized store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataId(String);

impl DataId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DataId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DataId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Variable name to value. Ordering carries no meaning.
pub type Variables = BTreeMap<String, serde_json::Value>;

/// Store-owned data for one record (or a projection of it).
pub type RecordData = serde_json::Value;

/// Route the fragment is being prepared for.
///
/// Only `prepare_variables` hooks look at it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    #[serde(default)]
    pub params: Variables,
}

impl Route {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Variables::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Identity of the server-side mutation root field, e.g. `likeStory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationIdentity {
    /// Root field invoked on the server's mutation type.
    pub root_field: String,
    /// Name of the input object type, when the server declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
}

impl OperationIdentity {
    pub fn new(root_field: impl Into<String>) -> Self {
        Self {
            root_field: root_field.into(),
            input_type: None,
        }
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }
}

impl fmt::Display for OperationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.input_type {
            Some(input) => write!(f, "mutation {{ {}(input: {}) }}", self.root_field, input),
            None => write!(f, "mutation {{ {} }}", self.root_field),
        }
    }
}

/// A file attached to a mutation as an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Upload field name to file payload.
pub type FileMap = BTreeMap<String, FilePayload>;
