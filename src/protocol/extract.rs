//! Session id extraction.
//!
//! The session endpoint replies with a JSON-shaped body, but this client does
//! not parse it: the id is pulled out by searching for a literal field marker
//! and taking everything up to the next quote. Deployed services have emitted
//! both `"session_id": "` and `"session_id":"`, so both spellings are tried.
//!
//! This is intentionally brittle. A reply that happens to contain the marker
//! inside other data will be mis-extracted, and a malformed reply yields no id
//! and no retry. Both behaviors are part of the preserved service contract.

// ============================================================================
// Constants
// ============================================================================

/// Field markers tried in order; the first match wins.
const MARKERS: [&str; 2] = [r#""session_id": ""#, r#""session_id":""#];

// ============================================================================
// Extraction
// ============================================================================

/// Extracts the session id from a raw session reply.
///
/// Returns `None` if the marker or its closing quote is absent, or if the
/// extracted id is empty. The reply is decoded lossily; an id containing
/// invalid UTF-8 cannot round-trip and is treated as absent.
#[must_use]
pub fn extract_session_id(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);

    for marker in MARKERS {
        if let Some(start) = text.find(marker) {
            let rest = &text[start + marker.len()..];
            let end = rest.find('"')?;
            let id = &rest[..end];
            if id.is_empty() {
                return None;
            }
            return Some(id.to_owned());
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
