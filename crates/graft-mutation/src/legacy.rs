//! Adapter for declarations written in the old `queries` style.
//!
//! Older mutation definitions listed their fragments under `queries` and
//! kept initial variables at the top level under `variables`. They are
//! translated into the canonical [`FragmentDeclaration`] here so nothing
//! downstream has to know the old shape existed.

use graft_core::{FragmentNode, Variables};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::declaration::{DeclarationSpec, FragmentDeclaration};

#[derive(Debug, Clone, Deserialize)]
pub struct LegacyDeclaration {
    pub mutation: String,
    #[serde(default)]
    pub variables: Variables,
    pub queries: BTreeMap<String, FragmentNode>,
}

impl LegacyDeclaration {
    pub fn into_declaration(self) -> FragmentDeclaration {
        tracing::warn!(
            mutation = %self.mutation,
            "`queries` declarations are deprecated, declare `fragments` and `initialVariables` instead"
        );
        DeclarationSpec {
            mutation: self.mutation,
            initial_variables: self.variables,
            fragments: self.queries,
        }
        .into_declaration()
    }
}

/// A declaration document in either style.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnyDeclaration {
    Current(DeclarationSpec),
    Legacy(LegacyDeclaration),
}

impl AnyDeclaration {
    pub fn into_declaration(self) -> FragmentDeclaration {
        match self {
            AnyDeclaration::Current(spec) => spec.into_declaration(),
            AnyDeclaration::Legacy(legacy) => legacy.into_declaration(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, AnyDeclaration::Legacy(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_shape_becomes_canonical() {
        let doc: AnyDeclaration = serde_yaml::from_str(
            r#"
mutation: OldStyleMutation
variables:
  count: 5
queries:
  story:
    name: story
    typeName: Story
"#,
        )
        .unwrap();
        assert!(doc.is_legacy());

        let declaration = doc.into_declaration();
        assert_eq!(declaration.mutation_name(), "OldStyleMutation");
        assert_eq!(declaration.fragment_names(), vec!["story"]);
        assert_eq!(declaration.initial_variables()["count"], json!(5));
    }

    #[test]
    fn current_shape_is_preferred() {
        let doc: AnyDeclaration = serde_yaml::from_str(
            r#"
mutation: NewStyleMutation
fragments:
  viewer:
    name: viewer
    typeName: User
"#,
        )
        .unwrap();
        assert!(!doc.is_legacy());
        assert_eq!(doc.into_declaration().fragment_names(), vec!["viewer"]);
    }
}
