//! Adapter layer: convert engine responses to domain results.
//!
//! This is the ONLY place where [`EngineResponse`] is interpreted.

use super::domain::{IdentificationResult, RecognitionError, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use super::dto::EngineResponse;

/// Map an engine response to an identification.
///
/// A present `error` field wins over any album/artist values. Missing
/// album or artist fall back to placeholders rather than failing.
pub fn to_identification(response: EngineResponse) -> Result<IdentificationResult, RecognitionError> {
    if let Some(message) = response.error {
        return Err(RecognitionError::Identification { message });
    }

    Ok(IdentificationResult {
        album: response.album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
        artist: response.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_maps_through() {
        let result = to_identification(EngineResponse::matched("X", "Y")).unwrap();
        assert_eq!(
            result,
            IdentificationResult {
                album: "X".to_string(),
                artist: "Y".to_string()
            }
        );
    }

    #[test]
    fn test_empty_response_uses_placeholders() {
        let result = to_identification(EngineResponse::default()).unwrap();
        assert_eq!(result.album, "Unknown Album");
        assert_eq!(result.artist, "Unknown Artist");
        assert!(!result.has_album());
        assert!(!result.has_artist());
    }

    #[test]
    fn test_error_field_is_identification_failure() {
        let err = to_identification(EngineResponse::failed("no match")).unwrap_err();
        match err {
            RecognitionError::Identification { ref message } => assert_eq!(message, "no match"),
            other => panic!("expected identification failure, got {:?}", other),
        }
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_wins_over_values() {
        let response = EngineResponse {
            album: Some("X".to_string()),
            artist: Some("Y".to_string()),
            error: Some("low confidence".to_string()),
        };
        assert!(to_identification(response).is_err());
    }
}
