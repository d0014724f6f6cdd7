//! Favorites and ratings written by users against movies and TV shows

use crate::db::{Database, ItemKind, NewRating};
use crate::error::ApiResult;
use crate::services::validation::validate_score;

#[derive(Clone)]
pub struct InteractionService {
    db: Database,
}

impl InteractionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Mark an item as a favorite of the user
    ///
    /// Adding the same favorite twice leaves a single edge. A missing item or
    /// user is not an error; nothing is written.
    pub async fn add_favorite(
        &self,
        kind: ItemKind,
        item_name: &str,
        user_email: &str,
    ) -> ApiResult<()> {
        let matched = self
            .db
            .graph()
            .merge_favorite(kind, item_name, user_email)
            .await?;

        if matched {
            tracing::info!(kind = kind.label(), item = %item_name, user = %user_email, "Favorite added");
        } else {
            tracing::warn!(
                kind = kind.label(),
                item = %item_name,
                user = %user_email,
                "Favorite not added: item or user not found"
            );
        }
        Ok(())
    }

    /// Record a rating and refresh the item's average score
    ///
    /// Returns the new average, or `None` when the item or user was not found
    /// and nothing was written.
    pub async fn rate_item(
        &self,
        kind: ItemKind,
        item_name: &str,
        user_email: &str,
        score: f64,
        feedback: &str,
    ) -> ApiResult<Option<f64>> {
        validate_score(score)?;

        let rating = NewRating {
            item_name: item_name.to_string(),
            user_email: user_email.to_string(),
            score,
            feedback: feedback.to_string(),
        };
        let average = self.db.graph().rate_item(kind, &rating).await?;

        match average {
            Some(average) => tracing::info!(
                kind = kind.label(),
                item = %item_name,
                user = %user_email,
                score,
                average,
                "Rating recorded"
            ),
            None => tracing::warn!(
                kind = kind.label(),
                item = %item_name,
                user = %user_email,
                "Rating not recorded: item or user not found"
            ),
        }
        Ok(average)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{CatalogRow, MemoryGraphStore, UserNode};
    use crate::error::ApiError;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    async fn seeded() -> (Arc<MemoryGraphStore>, InteractionService) {
        let store = Arc::new(MemoryGraphStore::new());
        store
            .insert_item_row(
                ItemKind::Movie,
                CatalogRow {
                    name: "Heat".to_string(),
                    extent: Some("170".to_string()),
                    year_of_release: Some("1995".to_string()),
                    ..Default::default()
                },
            )
            .await;
        let db = Database::new(store.clone());
        db.graph()
            .create_user(&UserNode {
                first_name: "Ana".to_string(),
                last_name: "Petrovic".to_string(),
                email: "ana@gmail.com".to_string(),
                password_hash: "hash".to_string(),
                type_of_user: "user".to_string(),
            })
            .await
            .unwrap();
        (store, InteractionService::new(db))
    }

    #[tokio::test]
    async fn test_average_follows_every_rating() {
        let (store, service) = seeded().await;

        let first = service
            .rate_item(ItemKind::Movie, "Heat", "ana@gmail.com", 8.0, "great")
            .await
            .unwrap();
        assert_eq!(first, Some(8.0));

        let second = service
            .rate_item(ItemKind::Movie, "Heat", "ana@gmail.com", 4.0, "meh")
            .await
            .unwrap();
        assert_eq!(second, Some(6.0));
        assert_eq!(store.rating_scores(ItemKind::Movie, "Heat").await, vec![8.0, 4.0]);
    }

    #[tokio::test]
    async fn test_out_of_range_score_writes_nothing() {
        let (store, service) = seeded().await;

        for score in [-1.0, 10.5, f64::NAN] {
            assert_matches!(
                service
                    .rate_item(ItemKind::Movie, "Heat", "ana@gmail.com", score, "")
                    .await,
                Err(ApiError::Validation(_))
            );
        }
        assert!(store.rating_scores(ItemKind::Movie, "Heat").await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_nodes_are_not_errors() {
        let (store, service) = seeded().await;

        let average = service
            .rate_item(ItemKind::TvShow, "Heat", "ana@gmail.com", 5.0, "")
            .await
            .unwrap();
        assert_eq!(average, None);

        service
            .add_favorite(ItemKind::Movie, "Heat", "bob@gmail.com")
            .await
            .unwrap();
        assert_eq!(store.favorite_count(ItemKind::Movie, "Heat", "bob@gmail.com").await, 0);
    }

    #[tokio::test]
    async fn test_favorite_is_idempotent() {
        let (store, service) = seeded().await;

        service.add_favorite(ItemKind::Movie, "Heat", "ana@gmail.com").await.unwrap();
        service.add_favorite(ItemKind::Movie, "Heat", "ana@gmail.com").await.unwrap();

        assert_eq!(store.favorite_count(ItemKind::Movie, "Heat", "ana@gmail.com").await, 1);
    }
}
