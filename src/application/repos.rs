//! Source traits describing the collaborators a listing is composed from.

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pinned::PinnedSet;
use crate::domain::entities::TopicRecord;
use crate::domain::types::Scope;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Anything a listing can carry. The composer only needs a stable identity.
pub trait ListingItem: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Debug + Send;

    fn listing_id(&self) -> Self::Id;
}

impl ListingItem for TopicRecord {
    type Id = i64;

    fn listing_id(&self) -> i64 {
        self.id
    }
}

/// Which part of a scope an ordinary source should enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Everything in scope except pinned items.
    Unpinned,
    /// Everything in scope, pinned or not, in plain scope order.
    All,
}

/// Supplies the complete pinned set of a scope in one call.
///
/// Implementations must enumerate every pinned item and return them already
/// ordered by the scope's ordering mode.
#[async_trait]
pub trait PinnedSource<T: ListingItem>: Send + Sync {
    async fn load(&self, scope: &Scope) -> Result<PinnedSet<T>, RepoError>;
}

/// Supplies counted, offset-addressable slices of a scope.
#[async_trait]
pub trait OrdinarySource<T: ListingItem>: Send + Sync {
    async fn total(&self, scope: &Scope, partition: Partition) -> Result<u64, RepoError>;

    /// Zero-indexed slice of the partition; short only at the end of the collection.
    async fn fetch(
        &self,
        scope: &Scope,
        partition: Partition,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<T>, RepoError>;
}
