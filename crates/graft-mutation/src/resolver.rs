//! Prop resolution.
//!
//! Turns the raw props a mutation is constructed with into record data read
//! from the store. Runs once, synchronously, while the mutation is built:
//!
//! 1. Every declared fragment is built; a builder that yields nothing is fatal.
//! 2. A declared fragment with no prop at all is warned about.
//! 3. Falsy props are left exactly as given and never reach the store.
//! 4. Plural fragments need a list whose elements all carry a pointer; their
//!    ids are flattened and read in one `read_all`.
//! 5. Singular fragments need a non-list. A pointer naming one record is read
//!    and a pointer naming several is fatal. Without a pointer the raw value
//!    is kept and a warning is raised once per instance.
//!
//! Props not bound to a fragment pass through untouched.

use graft_core::{DiagnosticsConfig, FragmentNode, RecordStore};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;

use crate::declaration::FragmentDeclaration;
use crate::error::{MutationError, MutationResult};
use crate::fragment::{BuilderCompiler, FragmentCompiler, build_mutation_fragment};
use crate::pointer::{FragmentPointer, is_falsy};

/// Props keyed by fragment (or plain) name.
pub type Props = Map<String, Value>;

/// Collaborators used while resolving props.
#[derive(Clone, Copy)]
pub struct ResolveEnv<'a> {
    pub store: &'a dyn RecordStore,
    pub compiler: &'a dyn FragmentCompiler,
    pub diagnostics: &'a DiagnosticsConfig,
}

static DEFAULT_DIAGNOSTICS: DiagnosticsConfig = DiagnosticsConfig {
    warn_missing_data: true,
    warn_unfetched_data: true,
};

impl<'a> ResolveEnv<'a> {
    /// Resolve against `store` with the builder-running compiler and default
    /// diagnostics.
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            compiler: &BuilderCompiler,
            diagnostics: &DEFAULT_DIAGNOSTICS,
        }
    }

    pub fn with_compiler(mut self, compiler: &'a dyn FragmentCompiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// A non-fatal problem noticed during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// No prop was supplied for a declared fragment.
    MissingData { fragment: String },
    /// A singular prop had no fragment pointer; it was kept as given.
    UnfetchedData { fragment: String },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::MissingData { fragment } => write!(
                f,
                "expected data for fragment `{fragment}`; pass an explicit null if none is intended"
            ),
            ResolveWarning::UnfetchedData { fragment } => write!(
                f,
                "prop `{fragment}` has no fragment pointer and looks like mock or unfetched data"
            ),
        }
    }
}

/// Resolved props owned by one mutation instance.
#[derive(Debug, Clone)]
pub struct MutationProps {
    mutation_name: String,
    values: Props,
    warnings: Vec<ResolveWarning>,
    unfetched_warning_shown: bool,
}

impl MutationProps {
    /// Resolve `raw` against `declaration`.
    pub fn resolve(
        declaration: &FragmentDeclaration,
        raw: Props,
        env: &ResolveEnv<'_>,
    ) -> MutationResult<Self> {
        let mut props = Self {
            mutation_name: declaration.mutation_name().to_string(),
            values: raw,
            warnings: Vec::new(),
            unfetched_warning_shown: false,
        };
        props.resolve_fragments(declaration, env)?;
        Ok(props)
    }

    fn resolve_fragments(
        &mut self,
        declaration: &FragmentDeclaration,
        env: &ResolveEnv<'_>,
    ) -> MutationResult<()> {
        let declared = declaration.declared_variable_names();

        for (name, builder) in declaration.fragments() {
            let fragment = build_mutation_fragment(
                env.compiler,
                &self.mutation_name,
                name,
                builder,
                &declared,
            )?;

            let Some(value) = self.values.remove(name) else {
                self.warn_missing_data(name, env);
                continue;
            };
            if is_falsy(&value) {
                self.values.insert(name.clone(), value);
                continue;
            }

            let resolved = if fragment.is_plural() {
                self.resolve_plural(name, &fragment, &value, env)?
            } else {
                self.resolve_singular(name, &fragment, &value, env)?
            };
            self.values.insert(name.clone(), resolved.unwrap_or(value));
        }

        Ok(())
    }

    fn resolve_plural(
        &self,
        name: &str,
        fragment: &FragmentNode,
        value: &Value,
        env: &ResolveEnv<'_>,
    ) -> MutationResult<Option<Value>> {
        let Value::Array(items) = value else {
            return Err(MutationError::expected_sequence(&self.mutation_name, name));
        };

        let mut ids = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let pointer = FragmentPointer::extract(item, fragment).ok_or_else(|| {
                MutationError::missing_fragment_pointer(&self.mutation_name, name, index)
            })?;
            ids.extend(pointer.into_data_ids());
        }

        tracing::debug!(
            mutation = %self.mutation_name,
            fragment = name,
            records = ids.len(),
            "Reading plural fragment prop"
        );
        Ok(Some(Value::Array(env.store.read_all(fragment, &ids))))
    }

    fn resolve_singular(
        &mut self,
        name: &str,
        fragment: &FragmentNode,
        value: &Value,
        env: &ResolveEnv<'_>,
    ) -> MutationResult<Option<Value>> {
        if value.is_array() {
            return Err(MutationError::unexpected_sequence(&self.mutation_name, name));
        }

        let Some(pointer) = FragmentPointer::extract(value, fragment) else {
            self.warn_unfetched_data(name, env);
            return Ok(None);
        };
        let Some(id) = pointer.single_id() else {
            return Err(MutationError::unexpected_plural_pointer(
                &self.mutation_name,
                name,
                pointer.len(),
            ));
        };

        tracing::debug!(
            mutation = %self.mutation_name,
            fragment = name,
            record = %id,
            "Reading singular fragment prop"
        );
        Ok(Some(env.store.read(fragment, id)))
    }

    fn warn_missing_data(&mut self, fragment: &str, env: &ResolveEnv<'_>) {
        let warning = ResolveWarning::MissingData {
            fragment: fragment.to_string(),
        };
        if env.diagnostics.warn_missing_data {
            tracing::warn!(mutation = %self.mutation_name, fragment, "{}", warning);
        }
        self.warnings.push(warning);
    }

    fn warn_unfetched_data(&mut self, fragment: &str, env: &ResolveEnv<'_>) {
        if self.unfetched_warning_shown {
            return;
        }
        self.unfetched_warning_shown = true;

        let warning = ResolveWarning::UnfetchedData {
            fragment: fragment.to_string(),
        };
        if env.diagnostics.warn_unfetched_data {
            tracing::warn!(mutation = %self.mutation_name, fragment, "{}", warning);
        }
        self.warnings.push(warning);
    }

    pub fn mutation_name(&self) -> &str {
        &self.mutation_name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserialize the prop `name`, if present and well-formed.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.values
            .get(name)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// String field `field` of the prop `name`.
    pub fn str_field(&self, name: &str, field: &str) -> Option<&str> {
        self.values.get(name)?.get(field)?.as_str()
    }

    pub fn values(&self) -> &Props {
        &self.values
    }

    pub fn into_values(self) -> Props {
        self.values
    }

    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::FragmentBuilder;
    use graft_core::{DataId, InMemoryStore};
    use serde_json::json;

    fn props(value: Value) -> Props {
        match value {
            Value::Object(map) => map,
            other => panic!("props must be an object, got {other}"),
        }
    }

    fn declaration() -> FragmentDeclaration {
        FragmentDeclaration::new("ChangeTitleMutation")
            .with_builder(
                "story",
                FragmentBuilder::compiled(
                    FragmentNode::new("story", "Story").with_concrete_id("__story"),
                ),
            )
            .with_builder(
                "viewer",
                FragmentBuilder::compiled(
                    FragmentNode::new("viewer", "User").with_concrete_id("__viewer"),
                ),
            )
    }

    #[test]
    fn unfetched_warning_is_shown_once_per_instance() {
        let store = InMemoryStore::new();
        let env = ResolveEnv::new(&store);
        let declaration = declaration();

        let mut resolved = MutationProps::resolve(
            &declaration,
            props(json!({ "story": { "title": "mock" }, "viewer": { "name": "mock" } })),
            &env,
        )
        .unwrap();
        assert_eq!(
            resolved.warnings(),
            &[ResolveWarning::UnfetchedData {
                fragment: "story".to_string()
            }]
        );

        resolved.resolve_fragments(&declaration, &env).unwrap();
        assert_eq!(resolved.warnings().len(), 1);
        assert_eq!(resolved.get("story"), Some(&json!({ "title": "mock" })));
    }

    #[test]
    fn silent_diagnostics_still_record_warnings() {
        let store = InMemoryStore::new();
        let silent = DiagnosticsConfig::silent();
        let env = ResolveEnv::new(&store).with_diagnostics(&silent);

        let resolved = MutationProps::resolve(&declaration(), Props::new(), &env).unwrap();
        assert_eq!(resolved.warnings().len(), 2);
        assert!(resolved.values().is_empty());
    }

    #[test]
    fn typed_accessors() {
        let store = InMemoryStore::new().with_record(
            "story:1",
            json!({ "id": "story:1", "title": "Hello" }),
        );
        let env = ResolveEnv::new(&store);
        let resolved = MutationProps::resolve(
            &declaration(),
            props(json!({
                "story": { "__story": { "dataID": "story:1" } },
                "viewer": null,
                "title": "New title"
            })),
            &env,
        )
        .unwrap();

        assert_eq!(resolved.str_field("story", "id"), Some("story:1"));
        assert_eq!(resolved.get_as::<String>("title").as_deref(), Some("New title"));
        assert_eq!(resolved.get_as::<DataId>("missing"), None);
        assert!(resolved.warnings().is_empty());
    }
}
