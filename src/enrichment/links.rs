//! Streaming-service deep links.
//!
//! Links are search links, not resolved ids: the app URI opens the Spotify
//! client if installed and the web URL is the fallback.

use serde::Serialize;

/// App URI plus web fallback for one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamingLink {
    pub app_uri: String,
    pub web_url: String,
}

impl StreamingLink {
    fn search(query: &str) -> Self {
        let encoded = urlencoding::encode(query.trim());
        Self {
            app_uri: format!("spotify:search:{}", encoded),
            web_url: format!("https://open.spotify.com/search/{}", encoded),
        }
    }
}

pub fn artist_link(artist: &str) -> StreamingLink {
    StreamingLink::search(artist)
}

/// Searches "track artist" for better matches.
pub fn track_link(track: &str, artist: &str) -> StreamingLink {
    StreamingLink::search(&format!("{} {}", track, artist))
}

/// Searches "album artist" for better matches.
pub fn album_link(album: &str, artist: &str) -> StreamingLink {
    StreamingLink::search(&format!("{} {}", album, artist))
}
