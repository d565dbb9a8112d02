// concierge/prompt.rs — System instruction construction.
//
// One string per request: the property's knowledge base in a fixed order,
// the policy block, and (when the gallery is non-empty) the visual guide
// instructions. The assistant never sees tenant data any other way.

use crate::rooms::Room;

/// Fixed policy appended to every system instruction, regardless of tenant.
///
/// Must stay aligned with the knowledge-base labels emitted above it — the
/// topic list names the sections the assistant may draw from.
const POLICY_BLOCK: &str = "\
[INSTRUCTIONS]
- You may answer questions about: wifi access, the address and directions, \
air conditioning, house rules, check-in and check-out, trash disposal, \
laundry, building facilities, and anything else stated in the knowledge base.
- Answer politely and briefly — under 50 words.
- Never discuss: other guests, pricing or availability, the host's personal \
details, or topics unrelated to the stay.
- If the answer is not in the knowledge base, tell the guest to contact the \
host rather than guessing.";

/// Build the complete system instruction for one room.
pub fn build_system_prompt(room: &Room) -> String {
    let mut prompt = format!(
        "You are the digital concierge for \"{name}\".\n\n\
         [KNOWLEDGE BASE]\n\
         - Address: {address}\n\
         - Wifi SSID: {ssid}\n\
         - Wifi Password: {pass}\n\
         - AC Instructions: {ac}\n\
         - House Rules: {rules}\n\
         [HOUSE GUIDEBOOK]\n\
         {guidebook}\n\n\
         {policy}",
        name = room.name,
        address = room.address,
        ssid = room.wifi_ssid,
        pass = room.wifi_pass,
        ac = room.ac_guide,
        rules = room.rules,
        guidebook = room.guidebook.knowledge_block(),
        policy = POLICY_BLOCK,
    );

    if !room.gallery.is_empty() {
        prompt.push_str("\n\n[VISUAL GUIDES]\nWhen the guest's question matches one of these items, you must include the image in your answer as a markdown image reference:\n");
        for item in &room.gallery {
            prompt.push_str(&format!("- {}: ![{}]({})\n", item.label, item.label, item.url));
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::{GalleryItem, Guidebook, Room};

    fn sample_room() -> Room {
        Room {
            id: "id-1".into(),
            slug: "abc123-xyz789".into(),
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
            faq: vec![],
            gallery: vec![],
            logo_url: None,
            primary_color: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn prompt_embeds_facts_in_order() {
        let prompt = build_system_prompt(&sample_room());
        let positions: Vec<usize> = ["The Loft", "1 Main St", "loft-5g", "ABC123", "Use the white remote.", "No smoking.", "CHECK-IN: 3 PM"]
            .iter()
            .map(|s| prompt.find(s).unwrap_or_else(|| panic!("missing {s}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "facts out of order");
    }

    #[test]
    fn prompt_carries_fallback_instruction() {
        let prompt = build_system_prompt(&sample_room());
        assert!(prompt.contains("contact the host rather than guessing"));
        assert!(prompt.contains("under 50 words"));
    }

    #[test]
    fn gallery_items_appear_as_markdown_references() {
        let mut room = sample_room();
        room.gallery = vec![GalleryItem {
            id: "g1".into(),
            label: "Heater".into(),
            url: "U1".into(),
        }];
        let prompt = build_system_prompt(&room);
        assert!(prompt.contains("[VISUAL GUIDES]"));
        assert!(prompt.contains("Heater"));
        assert!(prompt.contains("U1"));
        assert!(prompt.contains("![Heater](U1)"));
    }

    #[test]
    fn no_visual_block_without_gallery() {
        let prompt = build_system_prompt(&sample_room());
        assert!(!prompt.contains("[VISUAL GUIDES]"));
    }
}
