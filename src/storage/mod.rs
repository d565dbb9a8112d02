use anyhow::{Context as _, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::rooms::{self, FaqCategory, GalleryItem, Guidebook, Room, RoomDraft};

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking a request indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// How many times create_room regenerates the slug on a UNIQUE violation
/// before giving up. The 36^12 slug space makes even one retry unlikely.
const SLUG_RETRIES: usize = 3;

/// Execute a future with the standard query timeout.
/// Returns an error if the operation takes longer than `QUERY_TIMEOUT`.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RoomRow {
    id: String,
    slug: String,
    name: String,
    address: String,
    wifi_ssid: String,
    wifi_pass: String,
    ac_guide: String,
    rules: String,
    checkin: String,
    checkout: String,
    trash: String,
    laundry: String,
    facilities: String,
    other_info: String,
    /// JSON array of FAQ categories. Malformed or legacy NULL data reads as `[]`.
    faq_payload: String,
    /// JSON array of `{id, label, url}` gallery items. Same `[]` fallback.
    gallery_payload: String,
    logo_url: Option<String>,
    primary_color: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RoomRow {
    fn into_room(self) -> Room {
        // Payload columns are always arrays to consumers — a corrupt or NULL
        // column degrades to empty, never to an error or a null.
        let faq: Vec<FaqCategory> = serde_json::from_str(&self.faq_payload).unwrap_or_default();
        let gallery: Vec<GalleryItem> =
            serde_json::from_str(&self.gallery_payload).unwrap_or_default();

        Room {
            id: self.id,
            slug: self.slug,
            name: self.name,
            address: self.address,
            wifi_ssid: self.wifi_ssid,
            wifi_pass: self.wifi_pass,
            ac_guide: self.ac_guide,
            rules: self.rules,
            guidebook: Guidebook {
                checkin: self.checkin,
                checkout: self.checkout,
                trash: self.trash,
                laundry: self.laundry,
                facilities: self.facilities,
                other_info: self.other_info,
            },
            faq,
            gallery,
            logo_url: self.logo_url,
            primary_color: self.primary_color,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_slow_query(database_url, 0).await
    }

    /// Connect with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn connect_with_slow_query(database_url: &str, slow_query_ms: u64) -> Result<Self> {
        let mut opts = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database URL: {database_url}"))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        sqlx::migrate!("src/storage/migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    // ─── Rooms ──────────────────────────────────────────────────────────────

    /// Insert a new room with a generated id and slug.
    ///
    /// On the (practically unreachable) slug UNIQUE violation, a fresh slug
    /// is drawn and the insert retried a bounded number of times.
    pub async fn create_room(&self, draft: &RoomDraft) -> Result<Room> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let mut last_err = None;
        for _ in 0..SLUG_RETRIES {
            let slug = rooms::slug::generate();
            let result = self.insert_room(&id, &slug, draft, &now).await;
            match result {
                Ok(()) => {
                    return self
                        .get_room(&slug)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("room not found after insert"));
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(slug = %slug, "slug collision on insert — regenerating");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("slug generation exhausted retries")))
    }

    async fn insert_room(&self, id: &str, slug: &str, draft: &RoomDraft, now: &str) -> Result<()> {
        let faq_payload = serde_json::to_string(&draft.faq)?;
        sqlx::query(
            "INSERT INTO rooms (id, slug, name, address, wifi_ssid, wifi_pass, ac_guide, rules, \
             checkin, checkout, trash, laundry, facilities, other_info, faq_payload, \
             gallery_payload, logo_url, primary_color, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, '[]', ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(slug)
        .bind(&draft.name)
        .bind(&draft.address)
        .bind(&draft.wifi_ssid)
        .bind(&draft.wifi_pass)
        .bind(&draft.ac_guide)
        .bind(&draft.rules)
        .bind(&draft.guidebook.checkin)
        .bind(&draft.guidebook.checkout)
        .bind(&draft.guidebook.trash)
        .bind(&draft.guidebook.laundry)
        .bind(&draft.guidebook.facilities)
        .bind(&draft.guidebook.other_info)
        .bind(&faq_payload)
        .bind(&draft.logo_url)
        .bind(&draft.primary_color)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_room(&self, slug: &str) -> Result<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as("SELECT * FROM rooms WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(RoomRow::into_room))
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        with_timeout(async {
            let rows: Vec<RoomRow> = sqlx::query_as("SELECT * FROM rooms ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(RoomRow::into_room).collect())
        })
        .await
    }

    /// Full-record overwrite of every editable field, keyed by slug.
    /// Partial updates are not supported — every edit resubmits the whole
    /// form. Returns false when the slug does not exist.
    pub async fn update_room(&self, slug: &str, draft: &RoomDraft) -> Result<bool> {
        let faq_payload = serde_json::to_string(&draft.faq)?;
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE rooms SET name = ?, address = ?, wifi_ssid = ?, wifi_pass = ?, ac_guide = ?, \
             rules = ?, checkin = ?, checkout = ?, trash = ?, laundry = ?, facilities = ?, \
             other_info = ?, faq_payload = ?, logo_url = ?, primary_color = ?, updated_at = ? \
             WHERE slug = ?",
        )
        .bind(&draft.name)
        .bind(&draft.address)
        .bind(&draft.wifi_ssid)
        .bind(&draft.wifi_pass)
        .bind(&draft.ac_guide)
        .bind(&draft.rules)
        .bind(&draft.guidebook.checkin)
        .bind(&draft.guidebook.checkout)
        .bind(&draft.guidebook.trash)
        .bind(&draft.guidebook.laundry)
        .bind(&draft.guidebook.facilities)
        .bind(&draft.guidebook.other_info)
        .bind(&faq_payload)
        .bind(&draft.logo_url)
        .bind(&draft.primary_color)
        .bind(&now)
        .bind(slug)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Idempotent — deleting a slug that no longer exists is not an error.
    pub async fn delete_room(&self, slug: &str) -> Result<()> {
        sqlx::query("DELETE FROM rooms WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Overwrite the gallery JSON column. The surrounding read-modify-write
    /// is last-write-wins; see DESIGN.md for the concurrency decision.
    pub async fn set_gallery(&self, slug: &str, gallery: &[GalleryItem]) -> Result<bool> {
        let payload = serde_json::to_string(gallery)?;
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query("UPDATE rooms SET gallery_payload = ?, updated_at = ? WHERE slug = ?")
            .bind(&payload)
            .bind(&now)
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.message().contains("UNIQUE constraint failed"))
}
