//! Test utilities and fixtures for autotag tests.
//!
//! Provides recognition response fixtures shaped like a real service answer,
//! so extractor and pipeline tests share one source of truth.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{sample_recognition, matched};
//!
//! let fields = extract::extract(&sample_recognition());
//! let client = MockRecognizer::always(matched());
//! ```

use serde_json::{Value, json};

use crate::recognition::RecognitionResult;

/// Cover art URL used by [`sample_recognition`]
pub const SAMPLE_COVER_URL: &str = "https://images.example.com/cover/800x800cc.jpg";

/// A complete recognition response with every field the extractor reads.
///
/// Sections are deliberately not in "natural" order: the artist section comes
/// after the song section.
pub fn sample_recognition() -> Value {
    json!({
        "matches": [{"id": "552406075", "offset": 31.2}],
        "tagid": "5D4F9A1C",
        "track": {
            "key": "552406075",
            "title": "Midnight City",
            "subtitle": "M83",
            "genres": {"primary": "Alternative/Indie"},
            "images": {
                "background": "https://images.example.com/artist/800x800bb.jpg",
                "coverart": "https://images.example.com/cover/200x200cc.jpg",
                "coverarthq": SAMPLE_COVER_URL
            },
            "sections": [
                {
                    "type": "SONG",
                    "metadata": [
                        {"title": "Album", "text": "Hurry Up, We're Dreaming"},
                        {"title": "Label", "text": "Mute"},
                        {"title": "Released", "text": "2011"}
                    ]
                },
                {"type": "LYRICS", "text": []},
                {"type": "ARTIST", "name": "M83", "id": "42"}
            ]
        }
    })
}

/// [`sample_recognition`] wrapped as a match.
pub fn matched() -> RecognitionResult {
    RecognitionResult::Matched(sample_recognition())
}

/// A match whose `track` carries only the given fields.
pub fn matched_track(track: Value) -> RecognitionResult {
    RecognitionResult::Matched(json!({ "track": track }))
}
