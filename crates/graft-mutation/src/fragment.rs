//! Building mutation fragments and handing out lazy references to them.

use graft_core::{FragmentNode, Route, Variables};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use crate::declaration::{FragmentBuilder, FragmentDeclaration, PrepareVariables};
use crate::error::{MutationError, MutationResult};

/// Turns a fragment builder into an executable fragment.
pub trait FragmentCompiler {
    fn compile(
        &self,
        builder: &FragmentBuilder,
        declared_variables: &BTreeSet<String>,
    ) -> Option<FragmentNode>;
}

/// Compiler that runs the builder as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuilderCompiler;

impl FragmentCompiler for BuilderCompiler {
    fn compile(
        &self,
        builder: &FragmentBuilder,
        declared_variables: &BTreeSet<String>,
    ) -> Option<FragmentNode> {
        builder.build(declared_variables)
    }
}

/// Build the fragment `fragment_name` declared by `mutation_name`.
///
/// An unnamed result takes the declared fragment name.
pub fn build_mutation_fragment(
    compiler: &dyn FragmentCompiler,
    mutation_name: &str,
    fragment_name: &str,
    builder: &FragmentBuilder,
    declared_variables: &BTreeSet<String>,
) -> MutationResult<FragmentNode> {
    let mut fragment = compiler
        .compile(builder, declared_variables)
        .ok_or_else(|| MutationError::invalid_fragment(mutation_name, fragment_name))?;
    if fragment.name.is_empty() {
        fragment.name = fragment_name.to_string();
    }
    Ok(fragment)
}

/// A reference to a declared fragment that is only built on first use.
///
/// Route-specific variables are computed per call to [`variables`], so the
/// reference can be created before the route is known.
///
/// [`variables`]: FragmentReference::variables
pub struct FragmentReference {
    mutation_name: String,
    fragment_name: String,
    builder: FragmentBuilder,
    initial_variables: Variables,
    variable_overrides: Variables,
    prepare_variables: Option<PrepareVariables>,
    fragment: OnceLock<FragmentNode>,
}

impl FragmentReference {
    pub fn fragment_name(&self) -> &str {
        &self.fragment_name
    }

    pub fn mutation_name(&self) -> &str {
        &self.mutation_name
    }

    /// Variables the fragment runs with on `route`.
    ///
    /// With a `prepare_variables` hook this is the hook applied to the
    /// initial variables; otherwise the initial variables with the caller's
    /// overrides laid on top.
    pub fn variables(&self, route: &Route) -> Variables {
        match &self.prepare_variables {
            Some(prepare) => prepare(&self.initial_variables, route),
            None => {
                let mut variables = self.initial_variables.clone();
                variables.extend(
                    self.variable_overrides
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone())),
                );
                variables
            }
        }
    }

    pub fn is_built(&self) -> bool {
        self.fragment.get().is_some()
    }

    /// The fragment itself, built with `compiler` on first call.
    pub fn fragment(&self, compiler: &dyn FragmentCompiler) -> MutationResult<&FragmentNode> {
        if let Some(fragment) = self.fragment.get() {
            return Ok(fragment);
        }
        let declared = self.initial_variables.keys().cloned().collect();
        let fragment = build_mutation_fragment(
            compiler,
            &self.mutation_name,
            &self.fragment_name,
            &self.builder,
            &declared,
        )?;
        Ok(self.fragment.get_or_init(|| fragment))
    }
}

impl fmt::Debug for FragmentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentReference")
            .field("mutation_name", &self.mutation_name)
            .field("fragment_name", &self.fragment_name)
            .field("initial_variables", &self.initial_variables)
            .field("variable_overrides", &self.variable_overrides)
            .field("built", &self.is_built())
            .finish()
    }
}

impl FragmentDeclaration {
    /// Reference to the fragment `name`, built lazily.
    ///
    /// Fails when `name` was not declared, listing the names that were.
    ///
    /// `variable_overrides` only apply when the declaration has no
    /// `prepare_variables` hook. With a hook they are ignored and the hook
    /// alone derives the variables from the initial ones.
    pub fn get_fragment(
        &self,
        name: &str,
        variable_overrides: Option<Variables>,
    ) -> MutationResult<FragmentReference> {
        let builder = self.builder(name).ok_or_else(|| {
            MutationError::unknown_fragment(self.mutation_name(), name, self.fragment_names())
        })?;

        let variable_overrides = variable_overrides.unwrap_or_default();
        if self.prepare_variables().is_some() && !variable_overrides.is_empty() {
            tracing::debug!(
                mutation = self.mutation_name(),
                fragment = name,
                ignored = ?variable_overrides.keys().collect::<Vec<_>>(),
                "Variable overrides ignored; prepare_variables derives fragment variables"
            );
        }

        Ok(FragmentReference {
            mutation_name: self.mutation_name().to_string(),
            fragment_name: name.to_string(),
            builder: builder.clone(),
            initial_variables: self.initial_variables().clone(),
            variable_overrides,
            prepare_variables: self.prepare_variables().cloned(),
            fragment: OnceLock::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_declaration(builds: Arc<AtomicUsize>) -> FragmentDeclaration {
        FragmentDeclaration::new("ChangePhotoMutation")
            .with_initial_variable("size", json!(32))
            .with_fragment("photo", move |names| {
                builds.fetch_add(1, Ordering::SeqCst);
                names
                    .contains("size")
                    .then(|| FragmentNode::new("", "Photo"))
            })
    }

    #[test]
    fn reference_builds_once_on_demand() {
        let builds = Arc::new(AtomicUsize::new(0));
        let declaration = counting_declaration(builds.clone());

        let reference = declaration.get_fragment("photo", None).unwrap();
        assert!(!reference.is_built());
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        let fragment = reference.fragment(&BuilderCompiler).unwrap();
        assert_eq!(fragment.name, "photo");
        reference.fragment(&BuilderCompiler).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(reference.is_built());
    }

    #[test]
    fn overrides_merge_over_initial_variables() {
        let declaration = FragmentDeclaration::new("M")
            .with_initial_variable("size", json!(32))
            .with_initial_variable("crop", json!(false))
            .with_builder("photo", FragmentBuilder::compiled(FragmentNode::new("photo", "Photo")));

        let mut overrides = Variables::new();
        overrides.insert("size".to_string(), json!(64));
        let reference = declaration.get_fragment("photo", Some(overrides)).unwrap();

        let variables = reference.variables(&Route::new("home"));
        assert_eq!(variables["size"], json!(64));
        assert_eq!(variables["crop"], json!(false));
    }

    #[test]
    fn prepare_hook_derives_route_variables() {
        let declaration = FragmentDeclaration::new("M")
            .with_initial_variable("size", json!(32))
            .with_builder("photo", FragmentBuilder::compiled(FragmentNode::new("photo", "Photo")))
            .with_prepare_variables(|previous, route| {
                let mut variables = previous.clone();
                if let Some(scale) = route.params.get("scale").and_then(|v| v.as_i64()) {
                    let size = previous["size"].as_i64().unwrap_or(0) * scale;
                    variables.insert("size".to_string(), json!(size));
                }
                variables
            });

        let reference = declaration.get_fragment("photo", None).unwrap();
        let retina = Route::new("profile").with_param("scale", json!(2));
        assert_eq!(reference.variables(&retina)["size"], json!(64));
        assert_eq!(reference.variables(&Route::new("feed"))["size"], json!(32));
    }

    #[test]
    fn prepare_hook_takes_precedence_over_overrides() {
        let declaration = FragmentDeclaration::new("M")
            .with_initial_variable("size", json!(32))
            .with_builder("photo", FragmentBuilder::compiled(FragmentNode::new("photo", "Photo")))
            .with_prepare_variables(|previous, _| previous.clone());

        let mut overrides = Variables::new();
        overrides.insert("size".to_string(), json!(64));
        let reference = declaration.get_fragment("photo", Some(overrides)).unwrap();

        assert_eq!(reference.variables(&Route::new("home"))["size"], json!(32));
    }

    #[test]
    fn builder_failure_is_reported_on_first_use() {
        let declaration = FragmentDeclaration::new("BrokenMutation").with_fragment("story", |_| None);
        let reference = declaration.get_fragment("story", None).unwrap();
        let err = reference.fragment(&BuilderCompiler).unwrap_err();
        assert_eq!(
            err.to_string(),
            "BrokenMutation: `BrokenMutation.fragments.story` did not return a valid fragment"
        );
    }

    #[test]
    fn unknown_fragment_lists_valid_names() {
        let declaration = FragmentDeclaration::new("M")
            .with_builder("story", FragmentBuilder::compiled(FragmentNode::new("story", "Story")))
            .with_builder("viewer", FragmentBuilder::compiled(FragmentNode::new("viewer", "User")));
        let err = declaration.get_fragment("comment", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "M: unknown fragment `comment`, valid fragments are: story, viewer"
        );
    }
}
