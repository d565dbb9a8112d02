// rest/routes/gallery.rs — Gallery add/remove.
//
// The image binary goes to the media store first; only its public URL is
// persisted, appended to the room's gallery payload. The fetch-modify-
// overwrite on the JSON column is last-write-wins (see DESIGN.md).

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::rooms::GalleryItem;
use crate::AppContext;

use super::rooms::fetch_room;

fn outcome(success: bool, message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({ "success": success, "message": message.into() }))
}

/// `POST /edit/{slug}/gallery` — multipart fields `label` and `file`.
pub async fn add(
    State(ctx): State<Arc<AppContext>>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut label = String::new();
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().map(str::to_string);
                match name.as_deref() {
                    Some("label") => match field.text().await {
                        Ok(text) => label = text.trim().to_string(),
                        Err(e) => return bad_upload(e.to_string()),
                    },
                    Some("file") => {
                        let file_name = field.file_name().unwrap_or("upload").to_string();
                        match field.bytes().await {
                            Ok(bytes) => file = Some((file_name, bytes.to_vec())),
                            Err(e) => return bad_upload(e.to_string()),
                        }
                    }
                    _ => {}
                }
            }
            Ok(None) => break,
            Err(e) => return bad_upload(e.to_string()),
        }
    }

    if label.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            outcome(false, "A label is required."),
        )
            .into_response();
    }
    let Some((file_name, bytes)) = file else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            outcome(false, "An image file is required."),
        )
            .into_response();
    };
    if bytes.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            outcome(false, "The uploaded file is empty."),
        )
            .into_response();
    }

    let mut room = match fetch_room(&ctx, &slug).await {
        Ok(room) => room,
        Err(resp) => return resp,
    };

    let url = match ctx.media.save(&bytes, &file_name).await {
        Ok(url) => url,
        Err(e) => {
            error!(slug = %slug, err = %e, "gallery upload failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                outcome(false, "Failed to store the image."),
            )
                .into_response();
        }
    };

    room.gallery.push(GalleryItem {
        id: uuid::Uuid::new_v4().to_string(),
        label: label.clone(),
        url,
    });

    match ctx.storage.set_gallery(&slug, &room.gallery).await {
        Ok(true) => {
            info!(slug = %slug, label = %label, "gallery item added");
            outcome(true, "Image added.").into_response()
        }
        Ok(false) => (StatusCode::NOT_FOUND, outcome(false, "No such property.")).into_response(),
        Err(e) => {
            error!(slug = %slug, err = %e, "gallery save failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                outcome(false, "Failed to save the gallery."),
            )
                .into_response()
        }
    }
}

fn bad_upload(detail: String) -> Response {
    warn!(err = %detail, "malformed gallery upload");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        outcome(false, "Malformed upload."),
    )
        .into_response()
}

/// `POST /edit/{slug}/gallery/{item_id}/remove` — void semantics: removing an
/// id that is not present is not an error.
pub async fn remove(
    State(ctx): State<Arc<AppContext>>,
    Path((slug, item_id)): Path<(String, String)>,
) -> Response {
    let mut room = match fetch_room(&ctx, &slug).await {
        Ok(room) => room,
        Err(resp) => return resp,
    };

    let before = room.gallery.len();
    let removed: Vec<GalleryItem> = room
        .gallery
        .iter()
        .filter(|i| i.id == item_id)
        .cloned()
        .collect();
    room.gallery.retain(|i| i.id != item_id);

    if room.gallery.len() != before {
        if let Err(e) = ctx.storage.set_gallery(&slug, &room.gallery).await {
            error!(slug = %slug, err = %e, "gallery save failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                outcome(false, "Failed to save the gallery."),
            )
                .into_response();
        }
        // The DB row no longer references the file; losing the unlink only
        // leaks disk space, so a failure here is logged and ignored.
        for item in removed {
            if let Err(e) = ctx.media.delete(&item.url).await {
                warn!(slug = %slug, url = %item.url, err = %e, "media delete failed");
            }
        }
        info!(slug = %slug, item = %item_id, "gallery item removed");
    }

    StatusCode::NO_CONTENT.into_response()
}
