//! Cypher query contracts
//!
//! One builder per graph operation. Labels and property names come from
//! [ItemKind] and are never taken from user input; all values are bound as
//! parameters.

use neo4rs::{query, Query};

use super::models::{ActorInput, CatalogItemInput, ItemKind, NewRating, UserNode};

/// Columns every item read returns, all as text
fn item_columns(kind: ItemKind, var: &str) -> String {
    format!(
        "toString({var}.Name) AS Name, \
         toString({var}.{extent}) AS Extent, \
         toString({var}.YearOfRelease) AS YearOfRelease, \
         toString({var}.Genre) AS Genre, \
         toString({var}.AvgScore) AS AvgScore, \
         toString({var}.Description) AS Description, \
         toString({var}.Image) AS Image, \
         toString({var}.Link) AS Link",
        extent = kind.extent_property(),
    )
}

const ACTOR_COLUMNS: &str = "a.FirstName AS FirstName, a.LastName AS LastName, \
     toString(a.DateOfBirth) AS DateOfBirth, a.Awards AS Awards";

pub fn ping() -> Query {
    query("RETURN 1 AS ok")
}

// ============================================================================
// Users
// ============================================================================

pub fn create_user(user: &UserNode) -> Query {
    query(
        "CREATE (u:User {FirstName: $firstName, LastName: $lastName, Email: $email, \
         Password: $password, TypeOfUser: $typeOfUser})",
    )
    .param("firstName", user.first_name.clone())
    .param("lastName", user.last_name.clone())
    .param("email", user.email.clone())
    .param("password", user.password_hash.clone())
    .param("typeOfUser", user.type_of_user.clone())
}

pub fn find_user_by_email(email: &str) -> Query {
    query(
        "MATCH (u:User {Email: $email}) \
         RETURN u.FirstName AS FirstName, u.LastName AS LastName, u.Email AS Email, \
         u.Password AS Password, u.TypeOfUser AS TypeOfUser",
    )
    .param("email", email.to_string())
}

// ============================================================================
// Interactions
// ============================================================================

pub fn merge_favorite(kind: ItemKind, item_name: &str, user_email: &str) -> Query {
    query(&format!(
        "MATCH (i:{label} {{Name: $name}}) \
         MATCH (u:User {{Email: $email}}) \
         MERGE (u)-[f:FAVORITE]->(i) \
         RETURN count(f) AS matched",
        label = kind.label(),
    ))
    .param("name", item_name.to_string())
    .param("email", user_email.to_string())
}

pub fn create_rating(kind: ItemKind, rating: &NewRating) -> Query {
    query(&format!(
        "MATCH (i:{label} {{Name: $name}}) \
         MATCH (u:User {{Email: $email}}) \
         CREATE (u)-[r:RATED {{Score: $score, Feedback: $feedback}}]->(i) \
         RETURN count(r) AS created",
        label = kind.label(),
    ))
    .param("name", rating.item_name.clone())
    .param("email", rating.user_email.clone())
    .param("score", rating.score)
    .param("feedback", rating.feedback.clone())
}

/// Recompute from every RATED edge and overwrite
pub fn update_average(kind: ItemKind, item_name: &str) -> Query {
    query(&format!(
        "MATCH (i:{label} {{Name: $name}})<-[r:RATED]-(:User) \
         WITH i, avg(toFloat(r.Score)) AS averageScore \
         SET i.AvgScore = averageScore \
         RETURN averageScore",
        label = kind.label(),
    ))
    .param("name", item_name.to_string())
}

// ============================================================================
// Traversals
// ============================================================================

pub fn items_by_actor(kind: ItemKind, first_name: &str, last_name: &str) -> Query {
    query(&format!(
        "MATCH (:Actor {{FirstName: $firstName, LastName: $lastName}})-[:ACTED_IN]->(i:{label}) \
         RETURN {columns}",
        label = kind.label(),
        columns = item_columns(kind, "i"),
    ))
    .param("firstName", first_name.to_string())
    .param("lastName", last_name.to_string())
}

pub fn actors_in_item(kind: ItemKind, item_name: &str) -> Query {
    query(&format!(
        "MATCH (:{label} {{Name: $name}})<-[:ACTED_IN]-(a:Actor) RETURN {columns}",
        label = kind.label(),
        columns = ACTOR_COLUMNS,
    ))
    .param("name", item_name.to_string())
}

pub fn favorite_items(kind: ItemKind, user_email: &str) -> Query {
    query(&format!(
        "MATCH (:User {{Email: $email}})-[:FAVORITE]->(i:{label}) RETURN {columns}",
        label = kind.label(),
        columns = item_columns(kind, "i"),
    ))
    .param("email", user_email.to_string())
}

// ============================================================================
// Catalogue administration
// ============================================================================

pub fn create_item(kind: ItemKind, item: &CatalogItemInput) -> Query {
    query(&format!(
        "OPTIONAL MATCH (existing:{label} {{Name: $name}}) \
         WITH existing WHERE existing IS NULL \
         CREATE (i:{label} {{Name: $name, {extent}: $extent, YearOfRelease: $year, Genre: $genre, \
         AvgScore: $avgScore, Description: $description, Image: $image, Link: $link}}) \
         RETURN count(i) AS created",
        label = kind.label(),
        extent = kind.extent_property(),
    ))
    .param("name", item.name.clone())
    .param("extent", i64::from(item.extent))
    .param("year", i64::from(item.year_of_release))
    .param("genre", item.genre.clone())
    .param("avgScore", item.avg_score)
    .param("description", item.description.clone())
    .param("image", item.image.clone())
    .param("link", item.link.clone())
}

/// Leaves AvgScore alone; an empty image keeps the stored one
pub fn update_item(kind: ItemKind, item: &CatalogItemInput) -> Query {
    query(&format!(
        "MATCH (i:{label} {{Name: $name}}) \
         SET i.{extent} = $extent, i.YearOfRelease = $year, i.Genre = $genre, \
         i.Description = $description, i.Link = $link, \
         i.Image = CASE WHEN $image = '' THEN i.Image ELSE $image END \
         RETURN count(i) AS matched",
        label = kind.label(),
        extent = kind.extent_property(),
    ))
    .param("name", item.name.clone())
    .param("extent", i64::from(item.extent))
    .param("year", i64::from(item.year_of_release))
    .param("genre", item.genre.clone())
    .param("description", item.description.clone())
    .param("image", item.image.clone())
    .param("link", item.link.clone())
}

pub fn delete_item(kind: ItemKind, name: &str) -> Query {
    query(&format!(
        "MATCH (i:{label} {{Name: $name}}) DETACH DELETE i RETURN count(*) AS deleted",
        label = kind.label(),
    ))
    .param("name", name.to_string())
}

pub fn find_item(kind: ItemKind, name: &str) -> Query {
    query(&format!(
        "MATCH (i:{label} {{Name: $name}}) RETURN {columns} LIMIT 1",
        label = kind.label(),
        columns = item_columns(kind, "i"),
    ))
    .param("name", name.to_string())
}

pub fn items_page(kind: ItemKind, skip: usize, limit: usize) -> Query {
    query(&format!(
        "MATCH (i:{label}) RETURN {columns} ORDER BY Name SKIP $skip LIMIT $limit",
        label = kind.label(),
        columns = item_columns(kind, "i"),
    ))
    .param("skip", i64::try_from(skip).unwrap_or(i64::MAX))
    .param("limit", i64::try_from(limit).unwrap_or(i64::MAX))
}

pub fn create_actor(actor: &ActorInput) -> Query {
    query(
        "OPTIONAL MATCH (existing:Actor {FirstName: $firstName, LastName: $lastName}) \
         WITH existing WHERE existing IS NULL \
         CREATE (a:Actor {FirstName: $firstName, LastName: $lastName, \
         DateOfBirth: date($dateOfBirth), Awards: $awards}) \
         RETURN count(a) AS created",
    )
    .param("firstName", actor.first_name.clone())
    .param("lastName", actor.last_name.clone())
    .param("dateOfBirth", actor.date_of_birth.format("%Y-%m-%d").to_string())
    .param("awards", actor.awards.clone())
}

pub fn delete_actor(first_name: &str, last_name: &str) -> Query {
    query(
        "MATCH (a:Actor {FirstName: $firstName, LastName: $lastName}) \
         DETACH DELETE a RETURN count(*) AS deleted",
    )
    .param("firstName", first_name.to_string())
    .param("lastName", last_name.to_string())
}

pub fn link_actor(first_name: &str, last_name: &str, kind: ItemKind, item_name: &str) -> Query {
    query(&format!(
        "MATCH (a:Actor {{FirstName: $firstName, LastName: $lastName}}) \
         MATCH (i:{label} {{Name: $name}}) \
         MERGE (a)-[r:ACTED_IN]->(i) \
         RETURN count(r) AS linked",
        label = kind.label(),
    ))
    .param("firstName", first_name.to_string())
    .param("lastName", last_name.to_string())
    .param("name", item_name.to_string())
}
