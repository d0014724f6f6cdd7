//! Graph database access
//!
//! Every operation the services need is a named method on [GraphStore]. The
//! Neo4j implementation issues the parameterized Cypher in [queries]; the
//! in-memory implementation follows the same contracts for tests and
//! `memory://` development runs.

pub mod memory;
pub mod models;
pub mod neo4j;
pub mod queries;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;

pub use memory::MemoryGraphStore;
pub use models::{
    Actor, ActorInput, ActorRow, CatalogItemInput, CatalogRow, ItemKind, Movie, NewRating,
    TvShow, UserNode, UserRole,
};
pub use neo4j::Neo4jStore;

/// Failures raised by the graph store or while mapping its rows
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Neo4j(#[from] neo4rs::Error),

    #[error("failed to decode row: {0}")]
    Decode(#[from] neo4rs::DeError),

    #[error("missing value for {field}")]
    Missing { field: &'static str },

    #[error("malformed {field} value '{value}': {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Named graph operations
///
/// Lookups by unique key (user Email, item Name, actor FirstName + LastName)
/// return `false`/`None` on a miss rather than failing.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Round-trip to the store
    async fn ping(&self) -> StoreResult<()>;

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// CREATE a user node; duplicate emails are not checked
    async fn create_user(&self, user: &UserNode) -> StoreResult<()>;

    /// Last user node with this email, if any
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserNode>>;

    // ------------------------------------------------------------------------
    // Interactions
    // ------------------------------------------------------------------------

    /// MERGE a FAVORITE edge; `false` when the item or user did not match
    async fn merge_favorite(
        &self,
        kind: ItemKind,
        item_name: &str,
        user_email: &str,
    ) -> StoreResult<bool>;

    /// CREATE a RATED edge and overwrite the item's AvgScore with the mean of
    /// all its RATED scores, as one transaction. Returns the new average, or
    /// `None` when the item or user did not match and nothing was written.
    async fn rate_item(&self, kind: ItemKind, rating: &NewRating) -> StoreResult<Option<f64>>;

    // ------------------------------------------------------------------------
    // Traversals
    // ------------------------------------------------------------------------

    async fn items_by_actor(
        &self,
        kind: ItemKind,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<Vec<CatalogRow>>;

    async fn actors_in_item(&self, kind: ItemKind, item_name: &str) -> StoreResult<Vec<ActorRow>>;

    async fn favorite_items(&self, kind: ItemKind, user_email: &str)
    -> StoreResult<Vec<CatalogRow>>;

    // ------------------------------------------------------------------------
    // Catalogue administration
    // ------------------------------------------------------------------------

    /// `false` when an item with this name already exists
    async fn create_item(&self, kind: ItemKind, item: &CatalogItemInput) -> StoreResult<bool>;

    /// `false` when no item with this name exists
    async fn update_item(&self, kind: ItemKind, item: &CatalogItemInput) -> StoreResult<bool>;

    /// DETACH DELETE; `false` when no item with this name exists
    async fn delete_item(&self, kind: ItemKind, name: &str) -> StoreResult<bool>;

    async fn find_item(&self, kind: ItemKind, name: &str) -> StoreResult<Option<CatalogRow>>;

    /// Items ordered by name
    async fn items_page(
        &self,
        kind: ItemKind,
        skip: usize,
        limit: usize,
    ) -> StoreResult<Vec<CatalogRow>>;

    /// `false` when an actor with this name already exists
    async fn create_actor(&self, actor: &ActorInput) -> StoreResult<bool>;

    async fn delete_actor(&self, first_name: &str, last_name: &str) -> StoreResult<bool>;

    /// MERGE ACTED_IN; `false` when the actor or item did not match
    async fn link_actor(
        &self,
        first_name: &str,
        last_name: &str,
        kind: ItemKind,
        item_name: &str,
    ) -> StoreResult<bool>;
}

/// Database wrapper providing access to the configured graph store
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn GraphStore>,
}

impl Database {
    /// Create a new database wrapper from an existing store
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Empty in-process store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryGraphStore::new()))
    }

    /// Connect to the store named by the configuration
    pub async fn connect(config: &Config) -> Result<Self> {
        if config.uses_memory_graph() {
            tracing::warn!("Using in-memory graph store, data will not survive a restart");
            return Ok(Self::in_memory());
        }

        let store = Neo4jStore::connect(config).await?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Get the graph store
    pub fn graph(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }
}
