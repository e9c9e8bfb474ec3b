//! Post-mutation patch instructions.
//!
//! A mutation returns an ordered list of [`MutationConfig`] entries telling the
//! cache writer how to fold the server payload back into the normalized graph.
//! Each variant carries only the fields it needs, and the constructors reject
//! malformed entries up front instead of leaving that to the writer.
//!
//! The JSON/YAML shape mirrors the wire format clients already produce:
//!
//! ```yaml
//! - type: RANGE_ADD
//!   parentName: story
//!   parentID: "story:1"
//!   connectionName: comments
//!   edgeName: feedbackCommentEdge
//!   rangeBehaviors:
//!     "": append
//!     orderby(newest): prepend
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::DataId;
use crate::query::{Call, QueryNode};

/// Calls that page through a connection rather than select a range.
const PAGINATION_CALLS: &[&str] = &["first", "last", "after", "before"];

/// What to do with a range once a new edge arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOperation {
    Append,
    Prepend,
    Ignore,
    Refetch,
    Remove,
}

/// Stringified call set -> range operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeBehaviors(BTreeMap<String, RangeOperation>);

impl RangeBehaviors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, operation: RangeOperation) -> Self {
        self.0.insert(key.into(), operation);
        self
    }

    pub fn get(&self, key: &str) -> Option<RangeOperation> {
        self.0.get(key).copied()
    }

    /// Look up the behaviour for a connection fetched with `calls`.
    pub fn operation_for(&self, calls: &[Call]) -> Option<RangeOperation> {
        self.get(&range_behavior_key(calls))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, RangeOperation)> for RangeBehaviors {
    fn from_iter<I: IntoIterator<Item = (String, RangeOperation)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Key a connection's calls the way `rangeBehaviors` entries are written.
///
/// Pagination calls are dropped, the rest are rendered as `name(value)`,
/// sorted and joined with `.`. A connection with no filtering calls maps to
/// the empty key.
pub fn range_behavior_key(calls: &[Call]) -> String {
    let mut parts: Vec<String> = calls
        .iter()
        .filter(|call| !PAGINATION_CALLS.contains(&call.name.as_str()))
        .map(Call::to_string)
        .collect();
    parts.sort();
    parts.join(".")
}

/// One record id or several, as used in `FIELDS_CHANGE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldIds {
    One(DataId),
    Many(Vec<DataId>),
}

impl FieldIds {
    pub fn ids(&self) -> Vec<&DataId> {
        match self {
            FieldIds::One(id) => vec![id],
            FieldIds::Many(ids) => ids.iter().collect(),
        }
    }
}

impl From<DataId> for FieldIds {
    fn from(id: DataId) -> Self {
        FieldIds::One(id)
    }
}

impl From<Vec<DataId>> for FieldIds {
    fn from(ids: Vec<DataId>) -> Self {
        FieldIds::Many(ids)
    }
}

/// How the cache writer should patch the graph after a response arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationConfig {
    /// Refetch fat-query fields on the given records.
    FieldsChange {
        #[serde(rename = "fieldIDs")]
        field_ids: BTreeMap<String, FieldIds>,
    },

    /// Insert a new edge into a parent's connection.
    #[serde(rename_all = "camelCase")]
    RangeAdd {
        parent_name: String,
        #[serde(rename = "parentID")]
        parent_id: DataId,
        connection_name: String,
        edge_name: String,
        range_behaviors: RangeBehaviors,
    },

    /// Remove a node from a connection and from the store.
    #[serde(rename_all = "camelCase")]
    NodeDelete {
        parent_name: String,
        #[serde(rename = "parentID")]
        parent_id: DataId,
        connection_name: String,
        #[serde(rename = "deletedIDFieldName")]
        deleted_id_field_name: String,
    },

    /// Remove an edge from a connection, leaving the node in the store.
    #[serde(rename_all = "camelCase")]
    RangeDelete {
        parent_name: String,
        #[serde(rename = "parentID")]
        parent_id: DataId,
        connection_name: String,
        #[serde(rename = "deletedIDFieldName")]
        deleted_id_field_name: String,
        path_to_connection: Vec<String>,
    },

    /// Always fetch these children, even if nothing tracked them.
    RequiredChildren { children: Vec<QueryNode> },
}

/// A config entry that cannot be applied as written.
#[derive(Debug, Error)]
pub enum MutationConfigError {
    #[error("{tag} config requires a non-empty `{field}`")]
    EmptyField { tag: &'static str, field: &'static str },

    #[error("FIELDS_CHANGE entry `{field}` lists no record ids")]
    EmptyFieldIds { field: String },

    #[error("malformed mutation config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed mutation config list: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MutationConfigError {
    pub fn empty_field(tag: &'static str, field: &'static str) -> Self {
        Self::EmptyField { tag, field }
    }
}

impl MutationConfig {
    pub fn fields_change(
        field_ids: BTreeMap<String, FieldIds>,
    ) -> Result<Self, MutationConfigError> {
        Self::FieldsChange { field_ids }.validated()
    }

    pub fn range_add(
        parent_name: impl Into<String>,
        parent_id: impl Into<DataId>,
        connection_name: impl Into<String>,
        edge_name: impl Into<String>,
        range_behaviors: RangeBehaviors,
    ) -> Result<Self, MutationConfigError> {
        Self::RangeAdd {
            parent_name: parent_name.into(),
            parent_id: parent_id.into(),
            connection_name: connection_name.into(),
            edge_name: edge_name.into(),
            range_behaviors,
        }
        .validated()
    }

    pub fn node_delete(
        parent_name: impl Into<String>,
        parent_id: impl Into<DataId>,
        connection_name: impl Into<String>,
        deleted_id_field_name: impl Into<String>,
    ) -> Result<Self, MutationConfigError> {
        Self::NodeDelete {
            parent_name: parent_name.into(),
            parent_id: parent_id.into(),
            connection_name: connection_name.into(),
            deleted_id_field_name: deleted_id_field_name.into(),
        }
        .validated()
    }

    pub fn range_delete(
        parent_name: impl Into<String>,
        parent_id: impl Into<DataId>,
        connection_name: impl Into<String>,
        deleted_id_field_name: impl Into<String>,
        path_to_connection: Vec<String>,
    ) -> Result<Self, MutationConfigError> {
        Self::RangeDelete {
            parent_name: parent_name.into(),
            parent_id: parent_id.into(),
            connection_name: connection_name.into(),
            deleted_id_field_name: deleted_id_field_name.into(),
            path_to_connection,
        }
        .validated()
    }

    pub fn required_children(children: Vec<QueryNode>) -> Result<Self, MutationConfigError> {
        Self::RequiredChildren { children }.validated()
    }

    /// Parse one entry and validate it.
    pub fn from_json(value: serde_json::Value) -> Result<Self, MutationConfigError> {
        let config: MutationConfig = serde_json::from_value(value)?;
        config.validated()
    }

    /// Parse a YAML (or JSON) list of entries, validating each in order.
    pub fn list_from_yaml(content: &str) -> Result<Vec<Self>, MutationConfigError> {
        let configs: Vec<MutationConfig> = serde_yaml::from_str(content)?;
        configs.into_iter().map(Self::validated).collect()
    }

    /// Wire tag of this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            MutationConfig::FieldsChange { .. } => "FIELDS_CHANGE",
            MutationConfig::RangeAdd { .. } => "RANGE_ADD",
            MutationConfig::NodeDelete { .. } => "NODE_DELETE",
            MutationConfig::RangeDelete { .. } => "RANGE_DELETE",
            MutationConfig::RequiredChildren { .. } => "REQUIRED_CHILDREN",
        }
    }

    /// Check every field this variant requires.
    pub fn validate(&self) -> Result<(), MutationConfigError> {
        let tag = self.tag();
        match self {
            MutationConfig::FieldsChange { field_ids } => {
                if field_ids.is_empty() {
                    return Err(MutationConfigError::empty_field(tag, "fieldIDs"));
                }
                for (field, ids) in field_ids {
                    if ids.ids().is_empty() {
                        return Err(MutationConfigError::EmptyFieldIds {
                            field: field.clone(),
                        });
                    }
                }
            }
            MutationConfig::RangeAdd {
                parent_name,
                parent_id,
                connection_name,
                edge_name,
                range_behaviors,
            } => {
                require(tag, "parentName", parent_name)?;
                require(tag, "parentID", parent_id.as_str())?;
                require(tag, "connectionName", connection_name)?;
                require(tag, "edgeName", edge_name)?;
                if range_behaviors.is_empty() {
                    return Err(MutationConfigError::empty_field(tag, "rangeBehaviors"));
                }
            }
            MutationConfig::NodeDelete {
                parent_name,
                parent_id,
                connection_name,
                deleted_id_field_name,
            } => {
                require(tag, "parentName", parent_name)?;
                require(tag, "parentID", parent_id.as_str())?;
                require(tag, "connectionName", connection_name)?;
                require(tag, "deletedIDFieldName", deleted_id_field_name)?;
            }
            MutationConfig::RangeDelete {
                parent_name,
                parent_id,
                connection_name,
                deleted_id_field_name,
                path_to_connection,
            } => {
                require(tag, "parentName", parent_name)?;
                require(tag, "parentID", parent_id.as_str())?;
                require(tag, "connectionName", connection_name)?;
                require(tag, "deletedIDFieldName", deleted_id_field_name)?;
                if path_to_connection.is_empty() {
                    return Err(MutationConfigError::empty_field(tag, "pathToConnection"));
                }
            }
            MutationConfig::RequiredChildren { children } => {
                if children.is_empty() {
                    return Err(MutationConfigError::empty_field(tag, "children"));
                }
            }
        }
        Ok(())
    }

    fn validated(self) -> Result<Self, MutationConfigError> {
        self.validate()?;
        Ok(self)
    }
}

fn require(tag: &'static str, field: &'static str, value: &str) -> Result<(), MutationConfigError> {
    if value.trim().is_empty() {
        return Err(MutationConfigError::empty_field(tag, field));
    }
    Ok(())
}
