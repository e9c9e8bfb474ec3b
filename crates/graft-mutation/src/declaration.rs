//! Per-type fragment declarations.
//!
//! A [`FragmentDeclaration`] is written once for each mutation type and shared
//! by every instance of it. It names the fragments the mutation's props are
//! bound to, the variables those fragments start from and an optional hook
//! that derives route-specific variables.

use graft_core::{FragmentNode, Route, Variables};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

type BuildFn = dyn Fn(&BTreeSet<String>) -> Option<FragmentNode> + Send + Sync;

/// Produces a fragment given the set of declared variable names.
///
/// Returning `None` means the builder could not produce a fragment, which is
/// reported as a fatal error naming the mutation and fragment.
#[derive(Clone)]
pub struct FragmentBuilder(Arc<BuildFn>);

impl FragmentBuilder {
    pub fn new(
        build: impl Fn(&BTreeSet<String>) -> Option<FragmentNode> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(build))
    }

    /// A builder that always yields a copy of an already compiled node.
    pub fn compiled(fragment: FragmentNode) -> Self {
        Self::new(move |_| Some(fragment.clone()))
    }

    pub fn build(&self, declared_variables: &BTreeSet<String>) -> Option<FragmentNode> {
        (self.0)(declared_variables)
    }
}

impl fmt::Debug for FragmentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FragmentBuilder(..)")
    }
}

/// `prepare_variables(previous, route)` hook.
pub type PrepareVariables = Arc<dyn Fn(&Variables, &Route) -> Variables + Send + Sync>;

/// Fragments, initial variables and variable preparation for one mutation type.
#[derive(Clone)]
pub struct FragmentDeclaration {
    mutation_name: String,
    fragments: BTreeMap<String, FragmentBuilder>,
    initial_variables: Variables,
    prepare_variables: Option<PrepareVariables>,
}

impl FragmentDeclaration {
    /// Start a declaration for the mutation type called `mutation_name`.
    ///
    /// The name shows up in every diagnostic about this type.
    pub fn new(mutation_name: impl Into<String>) -> Self {
        Self {
            mutation_name: mutation_name.into(),
            fragments: BTreeMap::new(),
            initial_variables: Variables::new(),
            prepare_variables: None,
        }
    }

    pub fn with_fragment(
        self,
        name: impl Into<String>,
        build: impl Fn(&BTreeSet<String>) -> Option<FragmentNode> + Send + Sync + 'static,
    ) -> Self {
        self.with_builder(name, FragmentBuilder::new(build))
    }

    pub fn with_builder(mut self, name: impl Into<String>, builder: FragmentBuilder) -> Self {
        self.fragments.insert(name.into(), builder);
        self
    }

    pub fn with_initial_variable(
        mut self,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.initial_variables.insert(name.into(), value);
        self
    }

    pub fn with_initial_variables(mut self, variables: Variables) -> Self {
        self.initial_variables.extend(variables);
        self
    }

    pub fn with_prepare_variables(
        mut self,
        prepare: impl Fn(&Variables, &Route) -> Variables + Send + Sync + 'static,
    ) -> Self {
        self.prepare_variables = Some(Arc::new(prepare));
        self
    }

    pub fn mutation_name(&self) -> &str {
        &self.mutation_name
    }

    pub fn fragments(&self) -> impl Iterator<Item = (&String, &FragmentBuilder)> {
        self.fragments.iter()
    }

    pub fn builder(&self, name: &str) -> Option<&FragmentBuilder> {
        self.fragments.get(name)
    }

    pub fn fragment_names(&self) -> Vec<String> {
        self.fragments.keys().cloned().collect()
    }

    pub fn initial_variables(&self) -> &Variables {
        &self.initial_variables
    }

    /// Names fragments may reference; the key set of the initial variables.
    pub fn declared_variable_names(&self) -> BTreeSet<String> {
        self.initial_variables.keys().cloned().collect()
    }

    pub fn prepare_variables(&self) -> Option<&PrepareVariables> {
        self.prepare_variables.as_ref()
    }
}

impl fmt::Debug for FragmentDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentDeclaration")
            .field("mutation_name", &self.mutation_name)
            .field("fragments", &self.fragments.keys().collect::<Vec<_>>())
            .field("initial_variables", &self.initial_variables)
            .field("prepare_variables", &self.prepare_variables.is_some())
            .finish()
    }
}

/// Data-only form of a declaration, with fragments given as compiled nodes.
///
/// ```yaml
/// mutation: LikeStoryMutation
/// initialVariables:
///   size: 32
/// fragments:
///   story:
///     name: story
///     typeName: Story
///     concreteId: __fragment_story
///     children:
///       - kind: field
///         name: likeCount
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationSpec {
    pub mutation: String,
    #[serde(default)]
    pub initial_variables: Variables,
    pub fragments: BTreeMap<String, FragmentNode>,
}

impl DeclarationSpec {
    pub fn into_declaration(self) -> FragmentDeclaration {
        let declaration = FragmentDeclaration::new(self.mutation)
            .with_initial_variables(self.initial_variables);
        self.fragments
            .into_iter()
            .fold(declaration, |declaration, (name, fragment)| {
                declaration.with_builder(name, FragmentBuilder::compiled(fragment))
            })
    }
}
