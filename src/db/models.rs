//! Graph node shapes, text rows and typed records
//!
//! Item and actor properties come back from the store as text (the read
//! queries wrap them in `toString`); the typed records are produced by parsing
//! those rows, so malformed stored values surface as [StoreError::Parse].

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::StoreError;

// ============================================================================
// Item kinds
// ============================================================================

/// The two catalogue node labels that can be rated, favorited and acted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    Movie,
    TvShow,
}

impl ItemKind {
    /// Node label in the graph
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Movie => "Movie",
            ItemKind::TvShow => "TVShow",
        }
    }

    /// Property holding the item's extent: running time or season count
    pub fn extent_property(self) -> &'static str {
        match self {
            ItemKind::Movie => "Duration",
            ItemKind::TvShow => "NumOfSeasons",
        }
    }

    /// Human readable name used in response messages
    pub fn display_name(self) -> &'static str {
        match self {
            ItemKind::Movie => "Movie",
            ItemKind::TvShow => "TV show",
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// Allowed values of a user's TypeOfUser property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// User node as stored, password already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct UserNode {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub type_of_user: String,
}

/// A new RATED edge
#[derive(Debug, Clone)]
pub struct NewRating {
    pub item_name: String,
    pub user_email: String,
    pub score: f64,
    pub feedback: String,
}

// ============================================================================
// Rows as delivered by the store
// ============================================================================

/// Movie or TV show properties as text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    pub name: String,
    /// Duration for movies, NumOfSeasons for TV shows
    pub extent: Option<String>,
    pub year_of_release: Option<String>,
    pub genre: Option<String>,
    pub avg_score: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

/// Actor properties as text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorRow {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub awards: Option<Vec<String>>,
}

// ============================================================================
// Write inputs
// ============================================================================

/// Descriptive fields of a movie or TV show written by the admin surface
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItemInput {
    pub name: String,
    pub extent: i32,
    pub year_of_release: i32,
    pub genre: String,
    /// Initial average; ignored on update
    pub avg_score: f64,
    pub description: String,
    pub link: String,
    /// Public path of the stored image, empty when none (kept on update)
    pub image: String,
}

/// Actor node written by the admin surface
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorInput {
    #[serde(alias = "FirstName")]
    pub first_name: String,
    #[serde(alias = "LastName")]
    pub last_name: String,
    #[serde(alias = "DateOfBirth", deserialize_with = "deserialize_date")]
    pub date_of_birth: NaiveDate,
    #[serde(alias = "Awards", default)]
    pub awards: Vec<String>,
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_date(&text).map_err(serde::de::Error::custom)
}

// ============================================================================
// Typed records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub name: String,
    pub duration: i32,
    pub year_of_release: i32,
    pub genre: String,
    pub avg_score: f64,
    pub description: String,
    pub image: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvShow {
    pub name: String,
    pub num_of_seasons: i32,
    pub year_of_release: i32,
    pub genre: String,
    pub avg_score: f64,
    pub description: String,
    pub image: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub awards: Vec<String>,
}

impl TryFrom<CatalogRow> for Movie {
    type Error = StoreError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            duration: parse_required("Duration", row.extent.as_deref())?,
            year_of_release: parse_required("YearOfRelease", row.year_of_release.as_deref())?,
            avg_score: parse_avg_score(row.avg_score.as_deref())?,
            name: row.name,
            genre: row.genre.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            image: row.image.unwrap_or_default(),
            link: row.link.unwrap_or_default(),
        })
    }
}

impl TryFrom<CatalogRow> for TvShow {
    type Error = StoreError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            num_of_seasons: parse_required("NumOfSeasons", row.extent.as_deref())?,
            year_of_release: parse_required("YearOfRelease", row.year_of_release.as_deref())?,
            avg_score: parse_avg_score(row.avg_score.as_deref())?,
            name: row.name,
            genre: row.genre.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            image: row.image.unwrap_or_default(),
            link: row.link.unwrap_or_default(),
        })
    }
}

impl TryFrom<ActorRow> for Actor {
    type Error = StoreError;

    fn try_from(row: ActorRow) -> Result<Self, Self::Error> {
        let raw_date = row
            .date_of_birth
            .ok_or(StoreError::Missing { field: "DateOfBirth" })?;
        let date_of_birth = parse_date(&raw_date).map_err(|e| StoreError::Parse {
            field: "DateOfBirth",
            value: raw_date.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
            date_of_birth,
            awards: row.awards.unwrap_or_default(),
        })
    }
}

/// Map a batch of rows, failing on the first malformed one
pub fn map_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// ============================================================================
// Parsing helpers
// ============================================================================

fn parse_required<T>(field: &'static str, value: Option<&str>) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = value.ok_or(StoreError::Missing { field })?;
    value.trim().parse().map_err(|e: T::Err| StoreError::Parse {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Items that were never rated have no average yet
fn parse_avg_score(value: Option<&str>) -> Result<f64, StoreError> {
    match value {
        None => Ok(0.0),
        Some(_) => parse_required("AvgScore", value),
    }
}

/// Accepts plain dates as well as the date-times older clients stored
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn row() -> CatalogRow {
        CatalogRow {
            name: "Heat".to_string(),
            extent: Some("170".to_string()),
            year_of_release: Some("1995".to_string()),
            genre: Some("Crime".to_string()),
            avg_score: Some("8.5".to_string()),
            description: None,
            image: Some("/images/heat.png".to_string()),
            link: Some("https://example.com/heat".to_string()),
        }
    }

    #[test]
    fn test_movie_from_text_row() {
        let movie = Movie::try_from(row()).unwrap();
        assert_eq!(
            movie,
            Movie {
                name: "Heat".to_string(),
                duration: 170,
                year_of_release: 1995,
                genre: "Crime".to_string(),
                avg_score: 8.5,
                description: String::new(),
                image: "/images/heat.png".to_string(),
                link: "https://example.com/heat".to_string(),
            }
        );
    }

    #[test]
    fn test_unrated_item_has_zero_average() {
        let show = TvShow::try_from(CatalogRow {
            avg_score: None,
            ..row()
        })
        .unwrap();
        assert_eq!(show.num_of_seasons, 170);
        assert_eq!(show.avg_score, 0.0);
    }

    #[test]
    fn test_malformed_number_is_a_parse_error() {
        let result = Movie::try_from(CatalogRow {
            extent: Some("two hours".to_string()),
            ..row()
        });
        assert_matches!(result, Err(StoreError::Parse { field: "Duration", .. }));

        let result = Movie::try_from(CatalogRow {
            year_of_release: None,
            ..row()
        });
        assert_matches!(result, Err(StoreError::Missing { field: "YearOfRelease" }));
    }

    #[test]
    fn test_actor_dates() {
        assert_eq!(
            parse_date("1964-09-02").unwrap(),
            NaiveDate::from_ymd_opt(1964, 9, 2).unwrap()
        );
        assert_eq!(
            parse_date("1964-09-02T00:00:00").unwrap(),
            NaiveDate::from_ymd_opt(1964, 9, 2).unwrap()
        );
        assert_eq!(
            parse_date("1964-09-02T00:00:00Z").unwrap(),
            NaiveDate::from_ymd_opt(1964, 9, 2).unwrap()
        );

        let actor = Actor::try_from(ActorRow {
            first_name: Some("Keanu".to_string()),
            last_name: Some("Reeves".to_string()),
            date_of_birth: Some("not a date".to_string()),
            awards: None,
        });
        assert_matches!(actor, Err(StoreError::Parse { field: "DateOfBirth", .. }));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("user".parse::<UserRole>(), Ok(UserRole::User));
        assert!("Admin".parse::<UserRole>().is_err());
    }
}
