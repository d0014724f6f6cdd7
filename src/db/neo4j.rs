//! Neo4j graph store over Bolt
//!
//! Each call borrows a pooled connection for the duration of one query (or
//! one transaction) and hands it back when the stream or transaction is
//! dropped, whichever way the call exits.

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query, Row, RowStream, Txn};

use super::models::{ActorInput, ActorRow, CatalogItemInput, CatalogRow, ItemKind, NewRating, UserNode};
use super::{queries, GraphStore, StoreResult};
use crate::config::Config;

pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Open a connection pool to the configured server
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(config.graph_uri.as_str())
            .user(config.graph_user.as_str())
            .password(config.graph_password.as_str())
            .max_connections(config.graph_max_connections);
        if let Some(database) = &config.graph_database {
            builder = builder.db(database.as_str());
        }

        let graph = Graph::connect(builder.build()?).await?;
        tracing::info!(
            uri = %config.graph_uri,
            max_connections = config.graph_max_connections,
            "Connected to graph database"
        );

        Ok(Self { graph })
    }

    async fn fetch_all<T>(&self, query: Query, map: fn(&Row) -> StoreResult<T>) -> StoreResult<Vec<T>> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(map(&row)?);
        }
        Ok(rows)
    }

    /// Value of a single aggregate column, 0 when no row came back
    async fn fetch_count(&self, query: Query, column: &str) -> StoreResult<i64> {
        let mut stream = self.graph.execute(query).await?;
        let mut count = 0;
        while let Some(row) = stream.next().await? {
            count += row.get::<i64>(column)?;
        }
        Ok(count)
    }
}

fn catalog_row(row: &Row) -> StoreResult<CatalogRow> {
    Ok(CatalogRow {
        name: row.get::<Option<String>>("Name")?.unwrap_or_default(),
        extent: row.get("Extent")?,
        year_of_release: row.get("YearOfRelease")?,
        genre: row.get("Genre")?,
        avg_score: row.get("AvgScore")?,
        description: row.get("Description")?,
        image: row.get("Image")?,
        link: row.get("Link")?,
    })
}

fn actor_row(row: &Row) -> StoreResult<ActorRow> {
    Ok(ActorRow {
        first_name: row.get("FirstName")?,
        last_name: row.get("LastName")?,
        date_of_birth: row.get("DateOfBirth")?,
        awards: row.get("Awards")?,
    })
}

fn user_node(row: &Row) -> StoreResult<UserNode> {
    Ok(UserNode {
        first_name: row.get::<Option<String>>("FirstName")?.unwrap_or_default(),
        last_name: row.get::<Option<String>>("LastName")?.unwrap_or_default(),
        email: row.get::<Option<String>>("Email")?.unwrap_or_default(),
        password_hash: row.get::<Option<String>>("Password")?.unwrap_or_default(),
        type_of_user: row.get::<Option<String>>("TypeOfUser")?.unwrap_or_default(),
    })
}

/// First row of a transactional stream; the rest is drained so the next
/// statement can run on the same connection
async fn first_row(stream: &mut RowStream, txn: &mut Txn) -> StoreResult<Option<Row>> {
    let first = stream.next(txn.handle()).await?;
    while stream.next(txn.handle()).await?.is_some() {}
    Ok(first)
}

async fn rate_in_txn(txn: &mut Txn, kind: ItemKind, rating: &NewRating) -> StoreResult<Option<f64>> {
    let mut created = txn.execute(queries::create_rating(kind, rating)).await?;
    let created = match first_row(&mut created, txn).await? {
        Some(row) => row.get::<i64>("created")?,
        None => 0,
    };
    if created == 0 {
        return Ok(None);
    }

    let mut updated = txn
        .execute(queries::update_average(kind, &rating.item_name))
        .await?;
    match first_row(&mut updated, txn).await? {
        Some(row) => Ok(row.get::<Option<f64>>("averageScore")?),
        None => Ok(None),
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn ping(&self) -> StoreResult<()> {
        self.fetch_count(queries::ping(), "ok").await.map(|_| ())
    }

    async fn create_user(&self, user: &UserNode) -> StoreResult<()> {
        self.graph.run(queries::create_user(user)).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserNode>> {
        let users = self
            .fetch_all(queries::find_user_by_email(email), user_node)
            .await?;
        Ok(users.into_iter().last())
    }

    async fn merge_favorite(
        &self,
        kind: ItemKind,
        item_name: &str,
        user_email: &str,
    ) -> StoreResult<bool> {
        let matched = self
            .fetch_count(queries::merge_favorite(kind, item_name, user_email), "matched")
            .await?;
        Ok(matched > 0)
    }

    async fn rate_item(&self, kind: ItemKind, rating: &NewRating) -> StoreResult<Option<f64>> {
        let mut txn = self.graph.start_txn().await?;
        match rate_in_txn(&mut txn, kind, rating).await {
            Ok(average) => {
                txn.commit().await?;
                Ok(average)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Failed to roll back rating transaction");
                }
                Err(e)
            }
        }
    }

    async fn items_by_actor(
        &self,
        kind: ItemKind,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<Vec<CatalogRow>> {
        self.fetch_all(queries::items_by_actor(kind, first_name, last_name), catalog_row)
            .await
    }

    async fn actors_in_item(&self, kind: ItemKind, item_name: &str) -> StoreResult<Vec<ActorRow>> {
        self.fetch_all(queries::actors_in_item(kind, item_name), actor_row)
            .await
    }

    async fn favorite_items(
        &self,
        kind: ItemKind,
        user_email: &str,
    ) -> StoreResult<Vec<CatalogRow>> {
        self.fetch_all(queries::favorite_items(kind, user_email), catalog_row)
            .await
    }

    async fn create_item(&self, kind: ItemKind, item: &CatalogItemInput) -> StoreResult<bool> {
        let created = self
            .fetch_count(queries::create_item(kind, item), "created")
            .await?;
        Ok(created > 0)
    }

    async fn update_item(&self, kind: ItemKind, item: &CatalogItemInput) -> StoreResult<bool> {
        let matched = self
            .fetch_count(queries::update_item(kind, item), "matched")
            .await?;
        Ok(matched > 0)
    }

    async fn delete_item(&self, kind: ItemKind, name: &str) -> StoreResult<bool> {
        let deleted = self
            .fetch_count(queries::delete_item(kind, name), "deleted")
            .await?;
        Ok(deleted > 0)
    }

    async fn find_item(&self, kind: ItemKind, name: &str) -> StoreResult<Option<CatalogRow>> {
        let rows = self
            .fetch_all(queries::find_item(kind, name), catalog_row)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn items_page(
        &self,
        kind: ItemKind,
        skip: usize,
        limit: usize,
    ) -> StoreResult<Vec<CatalogRow>> {
        self.fetch_all(queries::items_page(kind, skip, limit), catalog_row)
            .await
    }

    async fn create_actor(&self, actor: &ActorInput) -> StoreResult<bool> {
        let created = self
            .fetch_count(queries::create_actor(actor), "created")
            .await?;
        Ok(created > 0)
    }

    async fn delete_actor(&self, first_name: &str, last_name: &str) -> StoreResult<bool> {
        let deleted = self
            .fetch_count(queries::delete_actor(first_name, last_name), "deleted")
            .await?;
        Ok(deleted > 0)
    }

    async fn link_actor(
        &self,
        first_name: &str,
        last_name: &str,
        kind: ItemKind,
        item_name: &str,
    ) -> StoreResult<bool> {
        let linked = self
            .fetch_count(
                queries::link_actor(first_name, last_name, kind, item_name),
                "linked",
            )
            .await?;
        Ok(linked > 0)
    }
}
