//! Catalogue reads and administration for movies, TV shows and actors

use serde::Serialize;

use crate::db::models::map_rows;
use crate::db::{
    Actor, ActorInput, CatalogItemInput, CatalogRow, Database, ItemKind, Movie, StoreError,
    TvShow,
};
use crate::error::{ApiError, ApiResult};
use crate::services::images::ImageStore;
use crate::services::validation::SCORE_RANGE;

/// A typed record backed by one of the catalogue node labels
pub trait CatalogRecord: TryFrom<CatalogRow, Error = StoreError> + Serialize {
    const KIND: ItemKind;
}

impl CatalogRecord for Movie {
    const KIND: ItemKind = ItemKind::Movie;
}

impl CatalogRecord for TvShow {
    const KIND: ItemKind = ItemKind::TvShow;
}

// ============================================================================
// Admin form input
// ============================================================================

/// Image file attached to an admin form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw text fields of the admin add/update form
///
/// `extent` carries Duration for movies and NumOfSeasons for TV shows.
#[derive(Debug, Clone, Default)]
pub struct ItemForm {
    pub name: String,
    pub extent: String,
    pub year_of_release: String,
    pub genre: String,
    pub avg_score: String,
    pub description: String,
    pub link: String,
    pub image: Option<ImageUpload>,
}

impl ItemForm {
    /// Parse the text fields; the image is handled separately
    fn parse(&self, kind: ItemKind) -> ApiResult<CatalogItemInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Name is required"));
        }

        let extent_field = kind.extent_property();
        let extent = self
            .extent
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|value| *value >= 0)
            .ok_or_else(|| {
                ApiError::validation(format!("{extent_field} must be a non-negative whole number"))
            })?;

        let year_of_release = self
            .year_of_release
            .trim()
            .parse::<i32>()
            .map_err(|_| ApiError::validation("YearOfRelease must be a whole number"))?;

        Ok(CatalogItemInput {
            name: name.to_string(),
            extent,
            year_of_release,
            genre: self.genre.trim().to_string(),
            avg_score: parse_initial_score(&self.avg_score)?,
            description: self.description.trim().to_string(),
            link: self.link.trim().to_string(),
            image: String::new(),
        })
    }
}

/// Blank and NaN (what the admin UI sends for an empty field) mean unrated
fn parse_initial_score(value: &str) -> ApiResult<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }
    match value.parse::<f64>() {
        Ok(score) if score.is_nan() => Ok(0.0),
        Ok(score) if SCORE_RANGE.contains(&score) => Ok(score),
        _ => Err(ApiError::validation("AvgScore must be between 0 and 10.")),
    }
}

// ============================================================================
// Catalog Service
// ============================================================================

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
    images: ImageStore,
    page_size: usize,
}

impl CatalogService {
    pub fn new(db: Database, images: ImageStore, page_size: usize) -> Self {
        Self {
            db,
            images,
            page_size: page_size.max(1),
        }
    }

    // ------------------------------------------------------------------------
    // Traversals
    // ------------------------------------------------------------------------

    pub async fn movies_by_actor(&self, first_name: &str, last_name: &str) -> ApiResult<Vec<Movie>> {
        self.items_by_actor(first_name, last_name).await
    }

    pub async fn shows_by_actor(&self, first_name: &str, last_name: &str) -> ApiResult<Vec<TvShow>> {
        self.items_by_actor(first_name, last_name).await
    }

    pub async fn actors_in_movie(&self, name: &str) -> ApiResult<Vec<Actor>> {
        self.actors_in(ItemKind::Movie, name).await
    }

    pub async fn actors_in_show(&self, name: &str) -> ApiResult<Vec<Actor>> {
        self.actors_in(ItemKind::TvShow, name).await
    }

    pub async fn favorite_movies(&self, user_email: &str) -> ApiResult<Vec<Movie>> {
        self.favorites(user_email).await
    }

    pub async fn favorite_shows(&self, user_email: &str) -> ApiResult<Vec<TvShow>> {
        self.favorites(user_email).await
    }

    async fn items_by_actor<T: CatalogRecord>(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> ApiResult<Vec<T>> {
        let rows = self
            .db
            .graph()
            .items_by_actor(T::KIND, first_name, last_name)
            .await?;
        Ok(map_rows(rows)?)
    }

    async fn actors_in(&self, kind: ItemKind, name: &str) -> ApiResult<Vec<Actor>> {
        let rows = self.db.graph().actors_in_item(kind, name).await?;
        Ok(map_rows(rows)?)
    }

    async fn favorites<T: CatalogRecord>(&self, user_email: &str) -> ApiResult<Vec<T>> {
        let rows = self.db.graph().favorite_items(T::KIND, user_email).await?;
        Ok(map_rows(rows)?)
    }

    // ------------------------------------------------------------------------
    // Movies and TV shows
    // ------------------------------------------------------------------------

    /// One page of items ordered by name, pages start at 1
    pub async fn items_page<T: CatalogRecord>(&self, page: usize) -> ApiResult<Vec<T>> {
        if page == 0 {
            return Err(ApiError::validation("Page must be at least 1"));
        }
        let skip = (page - 1)
            .checked_mul(self.page_size)
            .filter(|skip| i64::try_from(*skip).is_ok())
            .ok_or_else(|| ApiError::validation("Page is out of range"))?;
        let rows = self
            .db
            .graph()
            .items_page(T::KIND, skip, self.page_size)
            .await?;
        Ok(map_rows(rows)?)
    }

    pub async fn item<T: CatalogRecord>(&self, name: &str) -> ApiResult<T> {
        let row = self
            .db
            .graph()
            .find_item(T::KIND, name)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("{} not found", T::KIND.display_name())))?;
        Ok(T::try_from(row)?)
    }

    pub async fn add_item(&self, kind: ItemKind, form: ItemForm) -> ApiResult<()> {
        let mut input = form.parse(kind)?;
        if let Some(upload) = &form.image {
            input.image = self.store_image(upload).await?;
        }

        let created = match self.db.graph().create_item(kind, &input).await {
            Ok(created) => created,
            Err(e) => {
                self.discard_image(&input.image).await;
                return Err(e.into());
            }
        };
        if !created {
            self.discard_image(&input.image).await;
            return Err(ApiError::validation(format!(
                "{} with this name already exists",
                kind.display_name()
            )));
        }

        tracing::info!(kind = kind.label(), name = %input.name, "Item added");
        Ok(())
    }

    /// Update the descriptive fields of an existing item
    ///
    /// The average score is owned by ratings and left untouched. A new image
    /// replaces the old file; without one the old image is kept.
    pub async fn update_item(&self, kind: ItemKind, form: ItemForm) -> ApiResult<()> {
        let mut input = form.parse(kind)?;
        let existing = self
            .db
            .graph()
            .find_item(kind, &input.name)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("{} not found", kind.display_name())))?;

        if let Some(upload) = &form.image {
            input.image = self.store_image(upload).await?;
        }

        let updated = match self.db.graph().update_item(kind, &input).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_image(&input.image).await;
                return Err(e.into());
            }
        };
        if !updated {
            self.discard_image(&input.image).await;
            return Err(ApiError::not_found(format!("{} not found", kind.display_name())));
        }

        if !input.image.is_empty() {
            if let Some(old) = existing.image.as_deref().filter(|old| *old != input.image) {
                self.images.remove(old).await;
            }
        }

        tracing::info!(kind = kind.label(), name = %input.name, "Item updated");
        Ok(())
    }

    /// Remove an item with all its relationships and its image
    pub async fn delete_item(&self, kind: ItemKind, name: &str) -> ApiResult<()> {
        let image = self
            .db
            .graph()
            .find_item(kind, name)
            .await?
            .and_then(|row| row.image);

        if !self.db.graph().delete_item(kind, name).await? {
            return Err(ApiError::not_found(format!("{} not found", kind.display_name())));
        }
        if let Some(image) = image {
            self.images.remove(&image).await;
        }

        tracing::info!(kind = kind.label(), name = %name, "Item deleted");
        Ok(())
    }

    async fn store_image(&self, upload: &ImageUpload) -> ApiResult<String> {
        if upload.bytes.is_empty() {
            return Ok(String::new());
        }
        self.images
            .save(upload.file_name.as_deref(), &upload.bytes)
            .await
    }

    async fn discard_image(&self, public_path: &str) {
        if !public_path.is_empty() {
            self.images.remove(public_path).await;
        }
    }

    // ------------------------------------------------------------------------
    // Actors
    // ------------------------------------------------------------------------

    pub async fn add_actor(&self, actor: ActorInput) -> ApiResult<()> {
        let first_name = actor.first_name.trim();
        let last_name = actor.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(ApiError::validation("FirstName and LastName are required"));
        }
        let actor = ActorInput {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            ..actor
        };

        if !self.db.graph().create_actor(&actor).await? {
            return Err(ApiError::validation("Actor already exists"));
        }

        tracing::info!(first_name = %actor.first_name, last_name = %actor.last_name, "Actor added");
        Ok(())
    }

    pub async fn delete_actor(&self, first_name: &str, last_name: &str) -> ApiResult<()> {
        if !self.db.graph().delete_actor(first_name, last_name).await? {
            return Err(ApiError::not_found("Actor not found"));
        }
        tracing::info!(first_name = %first_name, last_name = %last_name, "Actor deleted");
        Ok(())
    }

    /// Record that an actor appears in a movie or TV show
    pub async fn link_actor(
        &self,
        first_name: &str,
        last_name: &str,
        kind: ItemKind,
        item_name: &str,
    ) -> ApiResult<()> {
        let linked = self
            .db
            .graph()
            .link_actor(first_name, last_name, kind, item_name)
            .await?;
        if !linked {
            return Err(ApiError::not_found(format!(
                "Actor or {} not found",
                kind.display_name()
            )));
        }

        tracing::info!(
            first_name = %first_name,
            last_name = %last_name,
            kind = kind.label(),
            item = %item_name,
            "Actor linked"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::db::{ActorRow, MemoryGraphStore};
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn form(name: &str) -> ItemForm {
        ItemForm {
            name: name.to_string(),
            extent: "120".to_string(),
            year_of_release: "1999".to_string(),
            genre: "Sci-Fi".to_string(),
            avg_score: "NaN".to_string(),
            description: "A hacker learns the truth".to_string(),
            link: "https://example.com/matrix".to_string(),
            image: None,
        }
    }

    fn service(store: Arc<MemoryGraphStore>, page_size: usize) -> (tempfile::TempDir, CatalogService) {
        let dir = tempfile::tempdir().unwrap();
        let images = ImageStore::new(dir.path());
        (dir, CatalogService::new(Database::new(store), images, page_size))
    }

    fn keanu() -> ActorInput {
        ActorInput {
            first_name: "Keanu".to_string(),
            last_name: "Reeves".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1964, 9, 2).unwrap(),
            awards: vec!["Saturn Award".to_string()],
        }
    }

    #[tokio::test]
    async fn test_add_and_read_movie() {
        let (_dir, catalog) = service(Arc::new(MemoryGraphStore::new()), 10);
        catalog.add_item(ItemKind::Movie, form("The Matrix")).await.unwrap();

        let movie: Movie = catalog.item("The Matrix").await.unwrap();
        assert_eq!(movie.duration, 120);
        assert_eq!(movie.year_of_release, 1999);
        assert_eq!(movie.avg_score, 0.0);

        assert_matches!(
            catalog.add_item(ItemKind::Movie, form("The Matrix")).await,
            Err(ApiError::Validation(_))
        );
        assert_matches!(catalog.item::<TvShow>("The Matrix").await, Err(ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_form_validation() {
        let (_dir, catalog) = service(Arc::new(MemoryGraphStore::new()), 10);

        let bad_extent = ItemForm {
            extent: "two hours".to_string(),
            ..form("The Matrix")
        };
        assert_matches!(
            catalog.add_item(ItemKind::Movie, bad_extent).await,
            Err(ApiError::Validation(m)) if m.starts_with("Duration")
        );

        let bad_seasons = ItemForm {
            extent: "-1".to_string(),
            ..form("Dark")
        };
        assert_matches!(
            catalog.add_item(ItemKind::TvShow, bad_seasons).await,
            Err(ApiError::Validation(m)) if m.starts_with("NumOfSeasons")
        );

        assert_matches!(
            catalog.add_item(ItemKind::Movie, form("  ")).await,
            Err(ApiError::Validation(_))
        );
        assert_matches!(parse_initial_score("11"), Err(ApiError::Validation(_)));
        assert_eq!(parse_initial_score(" 7.5 ").unwrap(), 7.5);
    }

    #[tokio::test]
    async fn test_update_keeps_average() {
        let store = Arc::new(MemoryGraphStore::new());
        let (_dir, catalog) = service(store.clone(), 10);
        catalog
            .add_item(
                ItemKind::Movie,
                ItemForm {
                    avg_score: "6.5".to_string(),
                    ..form("The Matrix")
                },
            )
            .await
            .unwrap();

        catalog
            .update_item(
                ItemKind::Movie,
                ItemForm {
                    extent: "136".to_string(),
                    avg_score: "1".to_string(),
                    ..form("The Matrix")
                },
            )
            .await
            .unwrap();

        let movie: Movie = catalog.item("The Matrix").await.unwrap();
        assert_eq!(movie.duration, 136);
        assert_eq!(movie.avg_score, 6.5);

        assert_matches!(
            catalog.update_item(ItemKind::Movie, form("Unknown")).await,
            Err(ApiError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn test_paging_is_one_based() {
        let (_dir, catalog) = service(Arc::new(MemoryGraphStore::new()), 2);
        for name in ["C", "A", "E", "B", "D"] {
            catalog.add_item(ItemKind::TvShow, form(name)).await.unwrap();
        }

        let names = |shows: Vec<TvShow>| shows.into_iter().map(|s| s.name).collect::<Vec<_>>();
        assert_eq!(names(catalog.items_page(1).await.unwrap()), vec!["A", "B"]);
        assert_eq!(names(catalog.items_page(3).await.unwrap()), vec!["E"]);
        assert!(catalog.items_page::<TvShow>(4).await.unwrap().is_empty());
        assert_matches!(catalog.items_page::<TvShow>(0).await, Err(ApiError::Validation(_)));
        assert_matches!(
            catalog.items_page::<TvShow>(usize::MAX).await,
            Err(ApiError::Validation(m)) if m == "Page is out of range"
        );
        let past_i64 = usize::try_from(i64::MAX).unwrap() / 2 + 2;
        assert_matches!(catalog.items_page::<TvShow>(past_i64).await, Err(ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_actor_links_drive_traversals() {
        let (_dir, catalog) = service(Arc::new(MemoryGraphStore::new()), 10);
        catalog.add_item(ItemKind::Movie, form("The Matrix")).await.unwrap();
        catalog.add_actor(keanu()).await.unwrap();
        assert_matches!(catalog.add_actor(keanu()).await, Err(ApiError::Validation(_)));

        catalog
            .link_actor("Keanu", "Reeves", ItemKind::Movie, "The Matrix")
            .await
            .unwrap();
        assert_matches!(
            catalog.link_actor("Keanu", "Reeves", ItemKind::TvShow, "The Matrix").await,
            Err(ApiError::NotFound(_))
        );

        let movies = catalog.movies_by_actor("Keanu", "Reeves").await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].name, "The Matrix");
        assert!(catalog.shows_by_actor("Keanu", "Reeves").await.unwrap().is_empty());

        let actors = catalog.actors_in_movie("The Matrix").await.unwrap();
        assert_eq!(actors, vec![Actor {
            first_name: "Keanu".to_string(),
            last_name: "Reeves".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1964, 9, 2).unwrap(),
            awards: vec!["Saturn Award".to_string()],
        }]);

        catalog.delete_item(ItemKind::Movie, "The Matrix").await.unwrap();
        assert!(catalog.movies_by_actor("Keanu", "Reeves").await.unwrap().is_empty());
        catalog.delete_actor("Keanu", "Reeves").await.unwrap();
        assert_matches!(catalog.delete_actor("Keanu", "Reeves").await, Err(ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_rows_fail_reads() {
        let store = Arc::new(MemoryGraphStore::new());
        store
            .insert_actor_row(ActorRow {
                first_name: Some("Keanu".to_string()),
                last_name: Some("Reeves".to_string()),
                date_of_birth: Some("yesterday".to_string()),
                awards: None,
            })
            .await;
        store
            .insert_item_row(
                ItemKind::Movie,
                CatalogRow {
                    name: "Broken".to_string(),
                    extent: Some("long".to_string()),
                    year_of_release: Some("1999".to_string()),
                    ..Default::default()
                },
            )
            .await;
        let (_dir, catalog) = service(store, 10);

        assert_matches!(
            catalog.item::<Movie>("Broken").await,
            Err(ApiError::Store(StoreError::Parse { field: "Duration", .. }))
        );
        catalog
            .link_actor("Keanu", "Reeves", ItemKind::Movie, "Broken")
            .await
            .unwrap();
        assert_matches!(
            catalog.actors_in_movie("Broken").await,
            Err(ApiError::Store(StoreError::Parse { field: "DateOfBirth", .. }))
        );
    }

    #[tokio::test]
    async fn test_image_replaced_on_update() {
        const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let (dir, catalog) = service(Arc::new(MemoryGraphStore::new()), 10);
        let upload = ImageUpload {
            file_name: Some("matrix.png".to_string()),
            bytes: PNG.to_vec(),
        };

        catalog
            .add_item(
                ItemKind::Movie,
                ItemForm {
                    image: Some(upload.clone()),
                    ..form("The Matrix")
                },
            )
            .await
            .unwrap();
        let first: Movie = catalog.item("The Matrix").await.unwrap();
        assert!(first.image.starts_with("/images/"));

        catalog
            .update_item(
                ItemKind::Movie,
                ItemForm {
                    image: Some(upload),
                    ..form("The Matrix")
                },
            )
            .await
            .unwrap();
        let second: Movie = catalog.item("The Matrix").await.unwrap();
        assert_ne!(first.image, second.image);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        // no new upload keeps the current image
        catalog.update_item(ItemKind::Movie, form("The Matrix")).await.unwrap();
        let third: Movie = catalog.item("The Matrix").await.unwrap();
        assert_eq!(third.image, second.image);

        catalog.delete_item(ItemKind::Movie, "The Matrix").await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
