//! Mutation error types.
//!
//! Every variant is a programmer error in a mutation definition or in the
//! props handed to it. They are returned from construction and are not meant
//! to be recovered from inside the crate.

use graft_core::MutationConfigError;
use thiserror::Error;

/// Result type for mutation operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Fatal problems found while building or resolving a mutation.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("{mutation}: `{mutation}.fragments.{fragment}` did not return a valid fragment")]
    InvalidFragment { mutation: String, fragment: String },

    #[error(
        "{mutation}: expected prop `{fragment}` to be a list because fragment `{fragment}` is plural"
    )]
    ExpectedSequence { mutation: String, fragment: String },

    #[error(
        "{mutation}: prop `{fragment}` is a list but fragment `{fragment}` is singular; \
         declare the fragment as plural to pass a list"
    )]
    UnexpectedSequence { mutation: String, fragment: String },

    #[error(
        "{mutation}: prop `{fragment}` points at {count} records but fragment `{fragment}` \
         is singular; declare the fragment as plural to pass several records"
    )]
    UnexpectedPluralPointer {
        mutation: String,
        fragment: String,
        count: usize,
    },

    #[error(
        "{mutation}: element {index} of prop `{fragment}` has no pointer to fragment `{fragment}`; \
         pass records fetched through that fragment"
    )]
    MissingFragmentPointer {
        mutation: String,
        fragment: String,
        index: usize,
    },

    #[error(
        "{mutation}: unknown fragment `{fragment}`, valid fragments are: {}",
        .valid.join(", ")
    )]
    UnknownFragment {
        mutation: String,
        fragment: String,
        valid: Vec<String>,
    },

    #[error("{mutation}: config {index} is malformed: {source}")]
    InvalidConfig {
        mutation: String,
        index: usize,
        #[source]
        source: MutationConfigError,
    },
}

impl MutationError {
    pub fn invalid_fragment(mutation: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::InvalidFragment {
            mutation: mutation.into(),
            fragment: fragment.into(),
        }
    }

    pub fn expected_sequence(mutation: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::ExpectedSequence {
            mutation: mutation.into(),
            fragment: fragment.into(),
        }
    }

    pub fn unexpected_sequence(mutation: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::UnexpectedSequence {
            mutation: mutation.into(),
            fragment: fragment.into(),
        }
    }

    pub fn unexpected_plural_pointer(
        mutation: impl Into<String>,
        fragment: impl Into<String>,
        count: usize,
    ) -> Self {
        Self::UnexpectedPluralPointer {
            mutation: mutation.into(),
            fragment: fragment.into(),
            count,
        }
    }

    pub fn missing_fragment_pointer(
        mutation: impl Into<String>,
        fragment: impl Into<String>,
        index: usize,
    ) -> Self {
        Self::MissingFragmentPointer {
            mutation: mutation.into(),
            fragment: fragment.into(),
            index,
        }
    }

    pub fn unknown_fragment(
        mutation: impl Into<String>,
        fragment: impl Into<String>,
        valid: Vec<String>,
    ) -> Self {
        Self::UnknownFragment {
            mutation: mutation.into(),
            fragment: fragment.into(),
            valid,
        }
    }

    pub fn invalid_config(
        mutation: impl Into<String>,
        index: usize,
        source: MutationConfigError,
    ) -> Self {
        Self::InvalidConfig {
            mutation: mutation.into(),
            index,
            source,
        }
    }
}
