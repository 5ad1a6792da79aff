//! Request body encoding.
//!
//! Defines the two request bodies the streamer sends, one per endpoint.
//! Field order matters on the wire (the service's extraction is positional in
//! spirit), so both structs keep their fields in declaration order.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

use crate::error::Result;

// ============================================================================
// InitRequest
// ============================================================================

/// Session initialization request body.
///
/// Sent unframed to the session endpoint.
///
/// # Format
///
/// ```json
/// {"lat": 50.4162, "lng": 30.8906, "meters": 1000, "mode": "device"}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct InitRequest {
    /// Latitude of the map center.
    pub lat: f64,
    /// Longitude of the map center.
    pub lng: f64,
    /// Search radius in meters.
    pub meters: u32,
    /// Always `"device"` for this client.
    pub mode: &'static str,
}

impl InitRequest {
    /// Creates a device-mode initialization request.
    #[inline]
    #[must_use]
    pub fn new(lat: f64, lng: f64, meters: u32) -> Self {
        Self {
            lat,
            lng,
            meters,
            mode: "device",
        }
    }

    /// Serializes the request to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] on serialization failure.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

// ============================================================================
// LookupRequest
// ============================================================================

/// Frame position-lookup request body.
///
/// Sent length-framed to the lookup endpoint.
///
/// # Format
///
/// ```json
/// {"session_id":"<id>","image_path":"<path>"}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct LookupRequest<'a> {
    /// Session the lookup is scoped to.
    pub session_id: &'a str,
    /// Identifier of the frame to localize.
    pub image_path: &'a str,
}

impl<'a> LookupRequest<'a> {
    /// Creates a lookup request for one frame.
    #[inline]
    #[must_use]
    pub fn new(session_id: &'a str, image_path: &'a str) -> Self {
        Self {
            session_id,
            image_path,
        }
    }

    /// Serializes the request to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] on serialization failure.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_request_fields() {
        let body = InitRequest::new(50.4162, 30.8906, 1000).encode().expect("encode");
        let text = String::from_utf8(body).expect("utf8");

        assert!(text.contains(r#""lat":50.4162"#));
        assert!(text.contains(r#""lng":30.8906"#));
        assert!(text.contains(r#""meters":1000"#));
        assert!(text.contains(r#""mode":"device""#));
    }

    #[test]
    fn test_init_request_field_order() {
        let body = InitRequest::new(1.0, 2.0, 3).encode().expect("encode");
        assert_eq!(
            String::from_utf8(body).expect("utf8"),
            r#"{"lat":1.0,"lng":2.0,"meters":3,"mode":"device"}"#
        );
    }

    #[test]
    fn test_lookup_request_exact_bytes() {
        let body = LookupRequest::new("S1", "data/stream/a.jpg")
            .encode()
            .expect("encode");
        assert_eq!(
            String::from_utf8(body).expect("utf8"),
            r#"{"session_id":"S1","image_path":"data/stream/a.jpg"}"#
        );
    }

    #[test]
    fn test_lookup_request_escapes_path() {
        let body = LookupRequest::new("S1", "odd\"name.jpg").encode().expect("encode");
        let text = String::from_utf8(body).expect("utf8");
        assert!(text.contains(r#"odd\"name.jpg"#));
    }
}
