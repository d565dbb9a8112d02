// rest/routes/rooms.rs — Admin property lifecycle + public tenant info.
//
// Writes are form-encoded full-form submissions: 303 redirect to the
// dashboard on success, `{success:false, message}` envelope on validation or
// storage failure. The admin UI is an external consumer of these endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::rooms::{self, Guidebook, Room, RoomDraft};
use crate::AppContext;

/// Full form field set. Every edit resubmits everything — there are no
/// partial updates.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RoomForm {
    pub name: String,
    pub address: String,
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub ac_guide: String,
    pub rules: String,
    pub checkin: String,
    pub checkout: String,
    pub trash: String,
    pub laundry: String,
    pub facilities: String,
    pub other_info: String,
    pub logo_url: String,
    pub primary_color: String,
    pub faq_text: String,
}

impl RoomForm {
    fn into_draft(self) -> RoomDraft {
        RoomDraft {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            wifi_ssid: self.wifi_ssid.trim().to_string(),
            wifi_pass: self.wifi_pass.trim().to_string(),
            ac_guide: self.ac_guide.trim().to_string(),
            rules: self.rules.trim().to_string(),
            guidebook: Guidebook {
                checkin: self.checkin.trim().to_string(),
                checkout: self.checkout.trim().to_string(),
                trash: self.trash.trim().to_string(),
                laundry: self.laundry.trim().to_string(),
                facilities: self.facilities.trim().to_string(),
                other_info: self.other_info.trim().to_string(),
            },
            faq: rooms::parse_faq_text(&self.faq_text),
            logo_url: non_empty(self.logo_url),
            primary_color: non_empty(self.primary_color),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message.into() })),
    )
        .into_response()
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

pub async fn dashboard(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, Response> {
    let rooms = ctx.storage.list_rooms().await.map_err(|e| {
        error!(err = %e, "failed to list rooms");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load rooms.")
    })?;

    let list: Vec<Value> = rooms
        .iter()
        .map(|r| {
            json!({
                "slug": r.slug,
                "name": r.name,
                "address": r.address,
                "wifiPass": r.wifi_pass,
                "guestUrl": guest_url(&ctx, &r.slug),
                "updatedAt": r.updated_at,
            })
        })
        .collect();
    Ok(Json(json!({ "rooms": list })))
}

fn guest_url(ctx: &AppContext, slug: &str) -> String {
    match &ctx.config.public_base_url {
        Some(base) => format!("{base}/{slug}"),
        None => format!("/{slug}"),
    }
}

// ─── Create / Update / Delete ─────────────────────────────────────────────────

pub async fn create(State(ctx): State<Arc<AppContext>>, Form(form): Form<RoomForm>) -> Response {
    let draft = form.into_draft();
    if let Err(msg) = draft.validate() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, msg);
    }

    match ctx.storage.create_room(&draft).await {
        Ok(room) => {
            info!(slug = %room.slug, name = %room.name, "room created");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!(err = %e, "room create failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save the property.",
            )
        }
    }
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Path(slug): Path<String>,
    Form(form): Form<RoomForm>,
) -> Response {
    let draft = form.into_draft();
    if let Err(msg) = draft.validate() {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, msg);
    }

    match ctx.storage.update_room(&slug, &draft).await {
        Ok(true) => {
            info!(slug = %slug, "room updated");
            Redirect::to("/").into_response()
        }
        Ok(false) => failure(StatusCode::NOT_FOUND, "No such property."),
        Err(e) => {
            error!(slug = %slug, err = %e, "room update failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save the property.",
            )
        }
    }
}

pub async fn delete(State(ctx): State<Arc<AppContext>>, Path(slug): Path<String>) -> Response {
    match ctx.storage.delete_room(&slug).await {
        Ok(()) => {
            info!(slug = %slug, "room deleted");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!(slug = %slug, err = %e, "room delete failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete the property.",
            )
        }
    }
}

// ─── Edit form data ───────────────────────────────────────────────────────────

/// Everything the edit form needs, with the guidebook as explicit fields and
/// the FAQ flattened back to one-question-per-line text.
pub async fn edit_form(
    State(ctx): State<Arc<AppContext>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, Response> {
    let room = fetch_room(&ctx, &slug).await?;
    Ok(Json(json!({
        "slug": room.slug,
        "name": room.name,
        "address": room.address,
        "wifiSsid": room.wifi_ssid,
        "wifiPass": room.wifi_pass,
        "acGuide": room.ac_guide,
        "rules": room.rules,
        "checkin": room.guidebook.checkin,
        "checkout": room.guidebook.checkout,
        "trash": room.guidebook.trash,
        "laundry": room.guidebook.laundry,
        "facilities": room.guidebook.facilities,
        "otherInfo": room.guidebook.other_info,
        "logoUrl": room.logo_url,
        "primaryColor": room.primary_color,
        "faqText": rooms::flatten_faq(&room.faq),
        "gallery": room.gallery,
    })))
}

// ─── Public tenant info ───────────────────────────────────────────────────────

/// Branding and FAQ payload for the guest page, readable before the first
/// chat turn. Never exposes wifi credentials or the guidebook.
pub async fn public_info(
    State(ctx): State<Arc<AppContext>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, Response> {
    let room = fetch_room(&ctx, &slug).await?;
    Ok(Json(json!({
        "name": room.name,
        "logoUrl": room.logo_url,
        "primaryColor": room.primary_color,
        "faqPayload": room.faq,
    })))
}

pub(super) async fn fetch_room(ctx: &AppContext, slug: &str) -> Result<Room, Response> {
    match ctx.storage.get_room(slug).await {
        Ok(Some(room)) => Ok(room),
        Ok(None) => Err(failure(StatusCode::NOT_FOUND, "No such property.")),
        Err(e) => {
            error!(slug = %slug, err = %e, "room fetch failed");
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load the property.",
            ))
        }
    }
}
