//! Multipart form reading for the movie and TV show admin endpoints

use axum::extract::Multipart;

use crate::db::ItemKind;
use crate::error::ApiResult;
use crate::services::{ImageUpload, ItemForm};

/// Collect the admin item form; unknown fields are skipped
pub async fn read_item_form(kind: ItemKind, mut multipart: Multipart) -> ApiResult<ItemForm> {
    let mut form = ItemForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name.eq_ignore_ascii_case("image") {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            form.image = Some(ImageUpload {
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let target = match name.as_str() {
            "Name" | "name" => &mut form.name,
            "YearOfRelease" | "yearOfRelease" => &mut form.year_of_release,
            "Genre" | "genre" => &mut form.genre,
            "AvgScore" | "avgScore" => &mut form.avg_score,
            "Description" | "description" => &mut form.description,
            "Link" | "link" => &mut form.link,
            // The admin UI posts season counts under Duration as well
            "Duration" | "duration" | "NumOfSeasons" | "numOfSeasons" => &mut form.extent,
            other => {
                tracing::debug!(kind = kind.label(), field = %other, "Ignoring unknown form field");
                continue;
            }
        };
        *target = field.text().await?;
    }

    Ok(form)
}
