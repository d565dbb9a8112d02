//! Context Assembler tests against a provider spy.
//!
//! The spy records every (system prompt, history, message) triple it is
//! handed, so the tests can assert both the short-circuit behavior (no
//! provider call for unknown rooms) and the exact context that reaches the
//! provider for real rooms.

use async_trait::async_trait;
use std::sync::Mutex;
use tempfile::TempDir;

use conciergd::concierge::{self, ChatTurn, ROOM_NOT_FOUND_REPLY};
use conciergd::provider::{ChatProvider, ProviderError, ProviderTurn, TurnRole};
use conciergd::rooms::{parse_faq_text, GalleryItem, Guidebook, RoomDraft};
use conciergd::storage::Storage;

// ─── Spy provider ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct RecordedCall {
    system: String,
    history: Vec<ProviderTurn>,
    message: String,
}

enum Reply {
    Text(String),
    ApiError(String),
}

struct SpyProvider {
    calls: Mutex<Vec<RecordedCall>>,
    reply: Reply,
}

impl SpyProvider {
    fn replying(text: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Reply::Text(text.to_string()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: Reply::ApiError(message.to_string()),
        }
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for SpyProvider {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[ProviderTurn],
        message: &str,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system_instruction.to_string(),
            history: history.to_vec(),
            message: message.to_string(),
        });
        match &self.reply {
            Reply::Text(t) => Ok(t.clone()),
            Reply::ApiError(m) => Err(ProviderError::Api {
                status: 429,
                message: m.clone(),
            }),
        }
    }
}

// ─── Harness ──────────────────────────────────────────────────────────────────

async fn test_storage(dir: &TempDir) -> Storage {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    Storage::connect(&url).await.unwrap()
}

fn loft_draft() -> RoomDraft {
    RoomDraft {
        name: "The Loft".into(),
        address: "1 Main St".into(),
        wifi_ssid: "loft-5g".into(),
        wifi_pass: "ABC123".into(),
        ac_guide: "Use the white remote.".into(),
        rules: "No smoking.".into(),
        guidebook: Guidebook {
            checkin: "3 PM".into(),
            checkout: "11 AM".into(),
            ..Default::default()
        },
        faq: parse_faq_text("What is the wifi password?\nHow do I use the AC?"),
        logo_url: None,
        primary_color: None,
    }
}

fn turn(role: &str, text: &str) -> ChatTurn {
    ChatTurn {
        id: None,
        role: role.into(),
        text: text.into(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_slug_never_reaches_the_provider() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    let spy = SpyProvider::replying("should never be seen");

    let outcome = concierge::send_message(&storage, &spy, "nope99-nope99", "hi", &[]).await;

    assert!(!outcome.success);
    assert_eq!(outcome.response, ROOM_NOT_FOUND_REPLY);
    assert!(spy.calls().is_empty(), "provider must not be called");
}

#[tokio::test]
async fn successful_call_returns_generated_text() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    let room = storage.create_room(&loft_draft()).await.unwrap();
    let spy = SpyProvider::replying("The wifi password is ABC123.");

    let outcome = concierge::send_message(
        &storage,
        &spy,
        &room.slug,
        "What is the wifi password?",
        &[],
    )
    .await;

    assert!(outcome.success);
    assert_eq!(outcome.response, "The wifi password is ABC123.");

    let calls = spy.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].message, "What is the wifi password?");
}

#[tokio::test]
async fn system_prompt_carries_room_facts() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    let room = storage.create_room(&loft_draft()).await.unwrap();
    let spy = SpyProvider::replying("ok");

    concierge::send_message(&storage, &spy, &room.slug, "wifi?", &[]).await;

    let system = spy.calls()[0].system.clone();
    for fact in ["The Loft", "1 Main St", "loft-5g", "ABC123", "CHECK-IN: 3 PM"] {
        assert!(system.contains(fact), "system prompt missing {fact}");
    }
    assert!(system.contains("contact the host"));
}

#[tokio::test]
async fn gallery_items_reach_the_system_prompt() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    let room = storage.create_room(&loft_draft()).await.unwrap();
    storage
        .set_gallery(
            &room.slug,
            &[GalleryItem {
                id: "g1".into(),
                label: "Heater".into(),
                url: "U1".into(),
            }],
        )
        .await
        .unwrap();
    let spy = SpyProvider::replying("ok");

    concierge::send_message(&storage, &spy, &room.slug, "heater?", &[]).await;

    let system = spy.calls()[0].system.clone();
    assert!(system.contains("Heater"));
    assert!(system.contains("U1"));
}

#[tokio::test]
async fn history_is_normalized_before_the_provider_sees_it() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    let room = storage.create_room(&loft_draft()).await.unwrap();
    let spy = SpyProvider::replying("ok");

    let history = vec![
        turn("model", "Welcome! I am your digital concierge."),
        turn("user", "hi"),
        turn("assistant", "hello"),
    ];
    concierge::send_message(&storage, &spy, &room.slug, "next", &history).await;

    let sent = spy.calls()[0].history.clone();
    // Leading welcome turn dropped; "assistant" mapped onto the model role.
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].role, TurnRole::User);
    assert_eq!(sent[0].text, "hi");
    assert_eq!(sent[1].role, TurnRole::Model);
    assert_eq!(sent[1].text, "hello");
}

#[tokio::test]
async fn provider_failure_maps_to_system_error_envelope() {
    let dir = TempDir::new().unwrap();
    let storage = test_storage(&dir).await;
    let room = storage.create_room(&loft_draft()).await.unwrap();
    let spy = SpyProvider::failing("rate limited");

    let outcome = concierge::send_message(&storage, &spy, &room.slug, "hi", &[]).await;

    assert!(!outcome.success);
    assert_eq!(outcome.response, "System Error: rate limited");
}
