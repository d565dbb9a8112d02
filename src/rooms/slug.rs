// rooms/slug.rs — Unguessable public identifiers.
//
// A slug is the only external key for a room: two hyphen-joined groups of six
// characters drawn from the lowercase-alphanumeric alphabet (36^12 ≈ 4.7e18
// values). Uniqueness is additionally enforced by the slug column's UNIQUE
// constraint; see Storage::create_room for the collision retry.

use rand_core::{OsRng, RngCore};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const GROUP_LEN: usize = 6;

/// Generate a fresh slug from OS randomness, e.g. `k3x9qa-07fmzp`.
pub fn generate() -> String {
    let mut bytes = [0u8; GROUP_LEN * 2];
    OsRng.fill_bytes(&mut bytes);

    let mut out = String::with_capacity(GROUP_LEN * 2 + 1);
    for (i, b) in bytes.iter().enumerate() {
        if i == GROUP_LEN {
            out.push('-');
        }
        out.push(ALPHABET[(*b as usize) % ALPHABET.len()] as char);
    }
    out
}

/// Whether `s` has the exact shape `generate` produces. Used by tests and to
/// reject malformed slugs early in lookup paths if ever needed.
pub fn is_well_formed(s: &str) -> bool {
    let mut groups = s.split('-');
    let (Some(a), Some(b), None) = (groups.next(), groups.next(), groups.next()) else {
        return false;
    };
    [a, b].iter().all(|g| {
        g.len() == GROUP_LEN && g.bytes().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}
