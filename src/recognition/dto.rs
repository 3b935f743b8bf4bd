//! Recognition engine wire format.
//!
//! Every engine variant speaks the same JSON object:
//! `{"album": ..., "artist": ..., "error": ...}` with all fields optional.
//! DO NOT use these types outside the recognition module - convert to
//! domain types in the adapter.

use serde::{Deserialize, Serialize};

/// Raw response from `identify_album(image_path, x1, y1, x2, y2)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineResponse {
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    /// Business error reported by the engine (e.g. "No album cover detected")
    #[serde(default)]
    pub error: Option<String>,
}

impl EngineResponse {
    pub fn matched(album: &str, artist: &str) -> Self {
        Self {
            album: Some(album.to_string()),
            artist: Some(artist.to_string()),
            error: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Default::default()
        }
    }
}

/// Parse engine stdout.
///
/// Engines may log before answering, so the last non-empty line is taken
/// as the JSON payload.
pub fn parse_engine_output(stdout: &str) -> Result<EngineResponse, serde_json::Error> {
    let payload = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    serde_json::from_str(payload)
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_match() {
        let parsed = parse_engine_output(r#"{"album": "Abbey Road", "artist": "The Beatles"}"#)
            .expect("Should parse match");
        assert_eq!(parsed, EngineResponse::matched("Abbey Road", "The Beatles"));
    }

    #[test]
    fn test_parse_empty_object() {
        let parsed = parse_engine_output("{}").expect("Should parse empty object");
        assert_eq!(parsed, EngineResponse::default());
    }

    #[test]
    fn test_parse_error_with_null_fields() {
        let parsed =
            parse_engine_output(r#"{"album": null, "artist": null, "error": "No album cover detected"}"#)
                .expect("Should parse error");
        assert_eq!(parsed.error.as_deref(), Some("No album cover detected"));
        assert!(parsed.album.is_none());
    }

    #[test]
    fn test_parse_takes_last_line() {
        let stdout = "loading model...\nSimilarity: 0.91\n{\"album\": \"Blue\", \"artist\": \"Joni Mitchell\"}\n\n";
        let parsed = parse_engine_output(stdout).expect("Should skip log lines");
        assert_eq!(parsed.artist.as_deref(), Some("Joni Mitchell"));
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let parsed = parse_engine_output(r#"{"album": "Blue", "score": 0.93}"#).unwrap();
        assert_eq!(parsed.album.as_deref(), Some("Blue"));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_engine_output("Traceback (most recent call last):").is_err());
        assert!(parse_engine_output("").is_err());
    }
}
