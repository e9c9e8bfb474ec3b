//! The mutation descriptor contract.

use graft_core::{FileMap, FragmentNode, MutationConfig, OperationIdentity, Variables};
use serde_json::Value;

use crate::declaration::FragmentDeclaration;
use crate::error::{MutationError, MutationResult};
use crate::fragment::FragmentReference;
use crate::resolver::{MutationProps, Props, ResolveEnv};

/// A state-changing operation against the client-held record graph.
///
/// Implementors describe what the server is asked to do and how the cache
/// should be patched afterwards. Props are resolved against the store exactly
/// once, in [`Mutation::create`], before the implementor ever sees them.
///
/// ```ignore
/// static DECLARATION: LazyLock<FragmentDeclaration> = LazyLock::new(|| {
///     FragmentDeclaration::new("LikeStoryMutation").with_fragment("story", build_story)
/// });
///
/// impl Mutation for LikeStoryMutation {
///     fn declaration() -> &'static FragmentDeclaration { &DECLARATION }
///     fn from_props(props: MutationProps) -> Self { Self { props } }
///     fn props(&self) -> &MutationProps { &self.props }
///     fn mutation(&self) -> OperationIdentity { OperationIdentity::new("likeStory") }
///     // ...
/// }
/// ```
pub trait Mutation: Sized {
    /// Fragments, initial variables and variable preparation for this type.
    fn declaration() -> &'static FragmentDeclaration;

    /// Wrap resolved props.
    fn from_props(props: MutationProps) -> Self;

    fn props(&self) -> &MutationProps;

    /// The server-side mutation to invoke.
    fn mutation(&self) -> OperationIdentity;

    /// Every field that may change as a result of this mutation.
    fn fat_query(&self) -> FragmentNode;

    /// How to patch the store once the response arrives, in order.
    fn configs(&self) -> Vec<MutationConfig>;

    /// Input for the server-side mutation.
    fn variables(&self) -> Variables;

    fn files(&self) -> Option<FileMap> {
        None
    }

    /// Speculative payload, shaped like the server response. It may name
    /// fewer or more fields than the real one.
    fn optimistic_response(&self) -> Option<Value> {
        None
    }

    /// Configs for the optimistic update. `None` leaves it to the sender to
    /// infer them from [`optimistic_response`](Mutation::optimistic_response).
    fn optimistic_configs(&self) -> Option<Vec<MutationConfig>> {
        None
    }

    /// Mutations sharing a key must reach the server one at a time, in the
    /// order they were submitted. Enforcing that is the sender's job.
    fn collision_key(&self) -> Option<String> {
        None
    }

    /// Resolve `raw_props` against the store and build the mutation.
    fn create(raw_props: Props, env: &ResolveEnv<'_>) -> MutationResult<Self> {
        let props = MutationProps::resolve(Self::declaration(), raw_props, env)?;
        Ok(Self::from_props(props))
    }

    /// Lazy reference to one of this type's fragments.
    fn get_fragment(
        name: &str,
        variable_overrides: Option<Variables>,
    ) -> MutationResult<FragmentReference> {
        Self::declaration().get_fragment(name, variable_overrides)
    }
}

/// `configs()` with every entry checked, failing on the first malformed one.
pub fn validated_configs<M: Mutation>(mutation: &M) -> MutationResult<Vec<MutationConfig>> {
    let configs = mutation.configs();
    check_configs(M::declaration().mutation_name(), &configs)?;
    Ok(configs)
}

/// `optimistic_configs()` with every entry checked.
pub fn validated_optimistic_configs<M: Mutation>(
    mutation: &M,
) -> MutationResult<Option<Vec<MutationConfig>>> {
    let Some(configs) = mutation.optimistic_configs() else {
        return Ok(None);
    };
    check_configs(M::declaration().mutation_name(), &configs)?;
    Ok(Some(configs))
}

fn check_configs(mutation_name: &str, configs: &[MutationConfig]) -> MutationResult<()> {
    for (index, config) in configs.iter().enumerate() {
        config
            .validate()
            .map_err(|source| MutationError::invalid_config(mutation_name, index, source))?;
    }
    Ok(())
}
