// rooms/mod.rs — Tenant domain model.
//
// A "room" is one configured property: display/branding fields, the facts the
// concierge answers from, a structured guidebook, the FAQ payload shown as
// quick questions, and the labeled image gallery.

pub mod slug;

use serde::{Deserialize, Serialize};

/// One configured property, keyed externally by its unguessable slug.
#[derive(Debug, Clone)]
pub struct Room {
    /// Internal row id — never used as an external identifier.
    pub id: String,
    /// Public identifier and URL segment. Immutable after creation.
    pub slug: String,
    pub name: String,
    pub address: String,
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub ac_guide: String,
    pub rules: String,
    pub guidebook: Guidebook,
    pub faq: Vec<FaqCategory>,
    pub gallery: Vec<GalleryItem>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// ─── Guidebook ────────────────────────────────────────────────────────────────

/// Structured house-guide record. Each field is stored as its own column;
/// the labeled-line text the AI consumes is rendered on demand by
/// [`Guidebook::knowledge_block`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Guidebook {
    pub checkin: String,
    pub checkout: String,
    pub trash: String,
    pub laundry: String,
    pub facilities: String,
    pub other_info: String,
}

impl Guidebook {
    /// Render the guidebook as the labeled-line block embedded in the system
    /// prompt. Labels are stable — they are part of the knowledge-base
    /// vocabulary the prompt instructions refer to.
    pub fn knowledge_block(&self) -> String {
        format!(
            "CHECK-IN: {}\nCHECK-OUT: {}\nTRASH DISPOSAL: {}\nLAUNDRY: {}\nFACILITIES: {}\nOTHER INFO: {}",
            self.checkin, self.checkout, self.trash, self.laundry, self.facilities, self.other_info
        )
    }
}

// ─── FAQ payload ──────────────────────────────────────────────────────────────

/// Closed set of icon identifiers the guest UI can render. Unknown tags in
/// stored payloads fall back to `Info` instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqIcon {
    Wifi,
    Thermometer,
    MapPin,
    Sparkles,
    Utensils,
    Key,
    #[serde(other)]
    Info,
}

impl Default for FaqIcon {
    fn default() -> Self {
        FaqIcon::Info
    }
}

/// One category of quick questions shown to guests before the first turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqCategory {
    pub title: String,
    #[serde(default)]
    pub icon: FaqIcon,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Title of the single category produced from the admin form's free-text box.
pub const DEFAULT_FAQ_TITLE: &str = "Quick Questions";

/// Parse the newline-delimited admin textarea into the FAQ payload.
///
/// Blank lines are dropped, order is preserved, and everything lands in one
/// default category. An all-blank input yields an empty payload (an empty
/// array, never null).
pub fn parse_faq_text(text: &str) -> Vec<FaqCategory> {
    let questions: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if questions.is_empty() {
        return Vec::new();
    }

    vec![FaqCategory {
        title: DEFAULT_FAQ_TITLE.to_string(),
        icon: FaqIcon::Sparkles,
        questions,
    }]
}

/// Flatten every category's questions back into the one-per-line text shown
/// in the edit form. Inverse of [`parse_faq_text`] up to category structure.
pub fn flatten_faq(faq: &[FaqCategory]) -> String {
    faq.iter()
        .flat_map(|c| c.questions.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

// ─── Gallery payload ──────────────────────────────────────────────────────────

/// One labeled image the AI may reference in answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    pub label: String,
    pub url: String,
}

// ─── Room draft (admin form input) ────────────────────────────────────────────

/// Validated form input for create/update. Every edit resubmits the whole
/// form; there are no partial updates.
#[derive(Debug, Clone, Default)]
pub struct RoomDraft {
    pub name: String,
    pub address: String,
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub ac_guide: String,
    pub rules: String,
    pub guidebook: Guidebook,
    pub faq: Vec<FaqCategory>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
}

impl RoomDraft {
    /// Required-field check: name, address, and wifi credentials must be
    /// non-empty. Returns a human-readable message for the form envelope.
    pub fn validate(&self) -> Result<(), String> {
        for (value, label) in [
            (&self.name, "Property name"),
            (&self.address, "Address"),
            (&self.wifi_ssid, "Wifi name"),
            (&self.wifi_pass, "Wifi password"),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{label} is required."));
            }
        }
        Ok(())
    }
}
