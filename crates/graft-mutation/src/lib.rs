//! Graft Mutations
//!
//! Declarative descriptions of state-changing operations against a
//! normalized, client-held record graph.
//!
//! # Module Structure
//!
//! - `descriptor` - the [`Mutation`] contract implemented per mutation type
//! - `declaration` - per-type fragment declarations
//! - `fragment` - fragment building and lazy [`FragmentReference`]s
//! - `resolver` - resolution of raw props into store records
//! - `pointer` - fragment pointers embedded in record data
//! - `collision` - serial submission by collision key
//! - `legacy` - adapter for `queries`-style declarations
//! - `error` - fatal error types

mod collision;
mod declaration;
mod descriptor;
mod error;
mod fragment;
mod legacy;
mod pointer;
mod resolver;

pub use collision::CollisionQueue;
pub use declaration::{DeclarationSpec, FragmentBuilder, FragmentDeclaration, PrepareVariables};
pub use descriptor::{Mutation, validated_configs, validated_optimistic_configs};
pub use error::{MutationError, MutationResult};
pub use fragment::{BuilderCompiler, FragmentCompiler, FragmentReference, build_mutation_fragment};
pub use legacy::{AnyDeclaration, LegacyDeclaration};
pub use pointer::{DATA_ID_KEY, DATA_IDS_KEY, FragmentPointer, is_falsy};
pub use resolver::{MutationProps, Props, ResolveEnv, ResolveWarning};
