//! In-process graph store
//!
//! Keeps nodes and edges in plain collections behind one
//! `tokio::sync::RwLock`, so every write (including the rating pair) is
//! atomic with respect to other callers. Item properties are held as the same
//! text rows the Neo4j reads produce.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{ActorInput, ActorRow, CatalogItemInput, CatalogRow, ItemKind, NewRating, UserNode};
use super::{GraphStore, StoreResult};

type ActorKey = (String, String);
type ItemKey = (ItemKind, String);

#[derive(Debug, Clone)]
struct RatedEdge {
    item: ItemKey,
    user_email: String,
    score: f64,
    feedback: String,
}

#[derive(Debug, Default)]
struct Graph {
    users: Vec<UserNode>,
    items: BTreeMap<ItemKey, CatalogRow>,
    actors: BTreeMap<ActorKey, ActorRow>,
    favorites: HashSet<(String, ItemKey)>,
    ratings: Vec<RatedEdge>,
    acted_in: Vec<(ActorKey, ItemKey)>,
}

impl Graph {
    fn has_user(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email == email)
    }

    fn item_key(kind: ItemKind, name: &str) -> ItemKey {
        (kind, name.to_string())
    }

    fn rows_for(&self, keys: impl Iterator<Item = ItemKey>) -> Vec<CatalogRow> {
        keys.filter_map(|key| self.items.get(&key).cloned()).collect()
    }
}

/// In-memory implementation of [GraphStore]
#[derive(Default)]
pub struct MemoryGraphStore {
    graph: RwLock<Graph>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw item row, bypassing validation
    pub async fn insert_item_row(&self, kind: ItemKind, row: CatalogRow) {
        let key = Graph::item_key(kind, &row.name);
        self.graph.write().await.items.insert(key, row);
    }

    /// Insert a raw actor row, bypassing validation
    pub async fn insert_actor_row(&self, row: ActorRow) {
        let key = (
            row.first_name.clone().unwrap_or_default(),
            row.last_name.clone().unwrap_or_default(),
        );
        self.graph.write().await.actors.insert(key, row);
    }

    /// Number of FAVORITE edges from a user to an item
    pub async fn favorite_count(&self, kind: ItemKind, item_name: &str, user_email: &str) -> usize {
        let graph = self.graph.read().await;
        let key = (user_email.to_string(), Graph::item_key(kind, item_name));
        usize::from(graph.favorites.contains(&key))
    }

    /// Scores of every RATED edge into an item, in insertion order
    pub async fn rating_scores(&self, kind: ItemKind, item_name: &str) -> Vec<f64> {
        let graph = self.graph.read().await;
        let key = Graph::item_key(kind, item_name);
        graph
            .ratings
            .iter()
            .filter(|edge| edge.item == key)
            .map(|edge| edge.score)
            .collect()
    }

    /// (user email, feedback) of every RATED edge into an item, in insertion order
    pub async fn rating_feedback(&self, kind: ItemKind, item_name: &str) -> Vec<(String, String)> {
        let graph = self.graph.read().await;
        let key = Graph::item_key(kind, item_name);
        graph
            .ratings
            .iter()
            .filter(|edge| edge.item == key)
            .map(|edge| (edge.user_email.clone(), edge.feedback.clone()))
            .collect()
    }

    /// Number of user nodes with this email
    pub async fn user_count(&self, email: &str) -> usize {
        let graph = self.graph.read().await;
        graph.users.iter().filter(|u| u.email == email).count()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, user: &UserNode) -> StoreResult<()> {
        self.graph.write().await.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserNode>> {
        let graph = self.graph.read().await;
        Ok(graph.users.iter().rev().find(|u| u.email == email).cloned())
    }

    async fn merge_favorite(
        &self,
        kind: ItemKind,
        item_name: &str,
        user_email: &str,
    ) -> StoreResult<bool> {
        let mut graph = self.graph.write().await;
        let key = Graph::item_key(kind, item_name);
        if !graph.items.contains_key(&key) || !graph.has_user(user_email) {
            return Ok(false);
        }
        graph.favorites.insert((user_email.to_string(), key));
        Ok(true)
    }

    async fn rate_item(&self, kind: ItemKind, rating: &NewRating) -> StoreResult<Option<f64>> {
        let mut graph = self.graph.write().await;
        let key = Graph::item_key(kind, &rating.item_name);
        if !graph.items.contains_key(&key) || !graph.has_user(&rating.user_email) {
            return Ok(None);
        }

        // One edge per matching user node, as the MATCH/CREATE pair does
        let matching_users = graph
            .users
            .iter()
            .filter(|u| u.email == rating.user_email)
            .count();
        for _ in 0..matching_users {
            graph.ratings.push(RatedEdge {
                item: key.clone(),
                user_email: rating.user_email.clone(),
                score: rating.score,
                feedback: rating.feedback.clone(),
            });
        }

        let scores: Vec<f64> = graph
            .ratings
            .iter()
            .filter(|edge| edge.item == key)
            .map(|edge| edge.score)
            .collect();
        let average = scores.iter().sum::<f64>() / scores.len() as f64;

        if let Some(item) = graph.items.get_mut(&key) {
            item.avg_score = Some(average.to_string());
        }
        Ok(Some(average))
    }

    async fn items_by_actor(
        &self,
        kind: ItemKind,
        first_name: &str,
        last_name: &str,
    ) -> StoreResult<Vec<CatalogRow>> {
        let graph = self.graph.read().await;
        let actor = (first_name.to_string(), last_name.to_string());
        let keys = graph
            .acted_in
            .iter()
            .filter(|(a, item)| *a == actor && item.0 == kind)
            .map(|(_, item)| item.clone());
        Ok(graph.rows_for(keys))
    }

    async fn actors_in_item(&self, kind: ItemKind, item_name: &str) -> StoreResult<Vec<ActorRow>> {
        let graph = self.graph.read().await;
        let key = Graph::item_key(kind, item_name);
        Ok(graph
            .acted_in
            .iter()
            .filter(|(_, item)| *item == key)
            .filter_map(|(actor, _)| graph.actors.get(actor).cloned())
            .collect())
    }

    async fn favorite_items(
        &self,
        kind: ItemKind,
        user_email: &str,
    ) -> StoreResult<Vec<CatalogRow>> {
        let graph = self.graph.read().await;
        let mut keys: Vec<ItemKey> = graph
            .favorites
            .iter()
            .filter(|(email, item)| email == user_email && item.0 == kind)
            .map(|(_, item)| item.clone())
            .collect();
        keys.sort();
        Ok(graph.rows_for(keys.into_iter()))
    }

    async fn create_item(&self, kind: ItemKind, item: &CatalogItemInput) -> StoreResult<bool> {
        let mut graph = self.graph.write().await;
        let key = Graph::item_key(kind, &item.name);
        if graph.items.contains_key(&key) {
            return Ok(false);
        }
        graph.items.insert(
            key,
            CatalogRow {
                name: item.name.clone(),
                extent: Some(item.extent.to_string()),
                year_of_release: Some(item.year_of_release.to_string()),
                genre: Some(item.genre.clone()),
                avg_score: Some(item.avg_score.to_string()),
                description: Some(item.description.clone()),
                image: Some(item.image.clone()),
                link: Some(item.link.clone()),
            },
        );
        Ok(true)
    }

    async fn update_item(&self, kind: ItemKind, item: &CatalogItemInput) -> StoreResult<bool> {
        let mut graph = self.graph.write().await;
        let Some(row) = graph.items.get_mut(&Graph::item_key(kind, &item.name)) else {
            return Ok(false);
        };
        row.extent = Some(item.extent.to_string());
        row.year_of_release = Some(item.year_of_release.to_string());
        row.genre = Some(item.genre.clone());
        row.description = Some(item.description.clone());
        row.link = Some(item.link.clone());
        if !item.image.is_empty() {
            row.image = Some(item.image.clone());
        }
        Ok(true)
    }

    async fn delete_item(&self, kind: ItemKind, name: &str) -> StoreResult<bool> {
        let mut graph = self.graph.write().await;
        let key = Graph::item_key(kind, name);
        if graph.items.remove(&key).is_none() {
            return Ok(false);
        }
        graph.favorites.retain(|(_, item)| *item != key);
        graph.ratings.retain(|edge| edge.item != key);
        graph.acted_in.retain(|(_, item)| *item != key);
        Ok(true)
    }

    async fn find_item(&self, kind: ItemKind, name: &str) -> StoreResult<Option<CatalogRow>> {
        let graph = self.graph.read().await;
        Ok(graph.items.get(&Graph::item_key(kind, name)).cloned())
    }

    async fn items_page(
        &self,
        kind: ItemKind,
        skip: usize,
        limit: usize,
    ) -> StoreResult<Vec<CatalogRow>> {
        let graph = self.graph.read().await;
        Ok(graph
            .items
            .iter()
            .filter(|((item_kind, _), _)| *item_kind == kind)
            .skip(skip)
            .take(limit)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn create_actor(&self, actor: &ActorInput) -> StoreResult<bool> {
        let mut graph = self.graph.write().await;
        let key = (actor.first_name.clone(), actor.last_name.clone());
        if graph.actors.contains_key(&key) {
            return Ok(false);
        }
        graph.actors.insert(
            key,
            ActorRow {
                first_name: Some(actor.first_name.clone()),
                last_name: Some(actor.last_name.clone()),
                date_of_birth: Some(actor.date_of_birth.format("%Y-%m-%d").to_string()),
                awards: Some(actor.awards.clone()),
            },
        );
        Ok(true)
    }

    async fn delete_actor(&self, first_name: &str, last_name: &str) -> StoreResult<bool> {
        let mut graph = self.graph.write().await;
        let key = (first_name.to_string(), last_name.to_string());
        if graph.actors.remove(&key).is_none() {
            return Ok(false);
        }
        graph.acted_in.retain(|(actor, _)| *actor != key);
        Ok(true)
    }

    async fn link_actor(
        &self,
        first_name: &str,
        last_name: &str,
        kind: ItemKind,
        item_name: &str,
    ) -> StoreResult<bool> {
        let mut graph = self.graph.write().await;
        let actor = (first_name.to_string(), last_name.to_string());
        let item = Graph::item_key(kind, item_name);
        if !graph.actors.contains_key(&actor) || !graph.items.contains_key(&item) {
            return Ok(false);
        }
        let edge = (actor, item);
        if !graph.acted_in.contains(&edge) {
            graph.acted_in.push(edge);
        }
        Ok(true)
    }
}
