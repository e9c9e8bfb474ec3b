//! Compiled query nodes.
//!
//! These are the shapes a fragment compiler hands back. Graft never parses
//! query text itself; it only carries these nodes between the compiler, the
//! record store and the code that patches the store after a mutation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// A call (argument) applied to a field, e.g. `orderby(newest)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Call {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            None | Some(Value::Null) => write!(f, "{}()", self.name),
            Some(Value::Array(items)) => {
                let parts: Vec<String> = items.iter().map(scalar_text).collect();
                write!(f, "{}({})", self.name, parts.join(","))
            }
            Some(value) => write!(f, "{}({})", self.name, scalar_text(value)),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A field selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<Call>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<QueryNode>,
}

impl FieldNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            calls: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_call(mut self, call: Call) -> Self {
        self.calls.push(call);
        self
    }

    pub fn with_child(mut self, child: impl Into<QueryNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Key this field is stored under in response data.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// One node in a compiled selection tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueryNode {
    Field(FieldNode),
    Fragment(FragmentNode),
}

impl From<FieldNode> for QueryNode {
    fn from(field: FieldNode) -> Self {
        QueryNode::Field(field)
    }
}

impl From<FragmentNode> for QueryNode {
    fn from(fragment: FragmentNode) -> Self {
        QueryNode::Fragment(fragment)
    }
}

/// A compiled, named fragment.
///
/// `plural` is fixed when the fragment is compiled and decides how props bound
/// to it are resolved, whatever shape the runtime value has. `concrete_id` is
/// the key under which record data embeds its pointer to this fragment.
///
/// A deserialized node without `concreteId` gets `__fragment_<name>`, so data
/// files can point at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FragmentNodeDef")]
pub struct FragmentNode {
    pub name: String,
    pub type_name: String,
    pub plural: bool,
    pub concrete_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<QueryNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FragmentNodeDef {
    name: String,
    type_name: String,
    #[serde(default)]
    plural: bool,
    #[serde(default)]
    concrete_id: Option<String>,
    #[serde(default)]
    children: Vec<QueryNode>,
}

impl From<FragmentNodeDef> for FragmentNode {
    fn from(def: FragmentNodeDef) -> Self {
        let concrete_id = def
            .concrete_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| named_concrete_id(&def.name));
        Self {
            name: def.name,
            type_name: def.type_name,
            plural: def.plural,
            concrete_id,
            children: def.children,
        }
    }
}

fn generate_concrete_id() -> String {
    format!("__fragment_{}", Uuid::new_v4().simple())
}

fn named_concrete_id(name: &str) -> String {
    format!("__fragment_{name}")
}

impl FragmentNode {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            plural: false,
            concrete_id: generate_concrete_id(),
            children: Vec::new(),
        }
    }

    pub fn plural(mut self) -> Self {
        self.plural = true;
        self
    }

    pub fn with_concrete_id(mut self, concrete_id: impl Into<String>) -> Self {
        self.concrete_id = concrete_id.into();
        self
    }

    pub fn with_child(mut self, child: impl Into<QueryNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_field(self, name: impl Into<String>) -> Self {
        self.with_child(FieldNode::new(name))
    }

    pub fn is_plural(&self) -> bool {
        self.plural
    }

    /// Direct field selections, skipping nested fragment spreads.
    pub fn fields(&self) -> impl Iterator<Item = &FieldNode> {
        self.children.iter().filter_map(|child| match child {
            QueryNode::Field(field) => Some(field),
            QueryNode::Fragment(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_display() {
        assert_eq!(Call::new("orderby", "newest").to_string(), "orderby(newest)");
        assert_eq!(Call::new("first", 10).to_string(), "first(10)");
        assert_eq!(Call::new("ids", json!(["a", "b"])).to_string(), "ids(a,b)");
        assert_eq!(Call::bare("viewer").to_string(), "viewer()");
    }

    #[test]
    fn fragment_ids_are_unique_unless_pinned() {
        let a = FragmentNode::new("story", "Story");
        let b = FragmentNode::new("story", "Story");
        assert_ne!(a.concrete_id, b.concrete_id);
        assert!(a.concrete_id.starts_with("__fragment_"));

        let pinned = FragmentNode::new("story", "Story").with_concrete_id("__fragmentID123");
        assert_eq!(pinned.concrete_id, "__fragmentID123");
    }

    #[test]
    fn query_nodes_deserialize_from_yaml() {
        let yaml = r#"
name: likers
typeName: User
plural: true
children:
  - kind: field
    name: name
  - kind: field
    name: profilePicture
    alias: pic
    calls:
      - name: size
        value: 32
"#;
        let fragment: FragmentNode = serde_yaml::from_str(yaml).unwrap();
        assert!(fragment.is_plural());
        assert_eq!(fragment.concrete_id, "__fragment_likers");
        let keys: Vec<&str> = fragment.fields().map(FieldNode::response_key).collect();
        assert_eq!(keys, vec!["name", "pic"]);
    }

    #[test]
    fn omitted_concrete_id_is_stable_across_loads() {
        let yaml = "name: story\ntypeName: Story\n";
        let first: FragmentNode = serde_yaml::from_str(yaml).unwrap();
        let second: FragmentNode = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(first.concrete_id, "__fragment_story");
        assert_eq!(first.concrete_id, second.concrete_id);

        let pinned: FragmentNode =
            serde_yaml::from_str("name: story\ntypeName: Story\nconcreteId: __s\n").unwrap();
        assert_eq!(pinned.concrete_id, "__s");
    }
}
