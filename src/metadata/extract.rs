//! Projection of a recognition response onto [`TagFields`].
//!
//! Every field is looked up on its own. A lookup that hits a missing key, a
//! value of the wrong type or an empty list yields `None` for that field
//! only; the other lookups still run against the same response.
//!
//! Response shape read here (all of it optional):
//!
//! ```text
//! track.title
//! track.genres.primary                       "Pop/Dance" -> "Pop"
//! track.images.{coverarthq,coverart,background}
//! track.sections[type=ARTIST].name
//! track.sections[type=SONG].metadata[title=Album].text
//! ```

use serde_json::Value;

use super::TagFields;

/// Image keys in order of preference
pub const COVER_ART_KEYS: [&str; 3] = ["coverarthq", "coverart", "background"];

const ARTIST_SECTION: &str = "ARTIST";
const SONG_SECTION: &str = "SONG";
const ALBUM_ENTRY: &str = "Album";

/// Extract every field from a recognition response.
pub fn extract(recognition: &Value) -> TagFields {
    TagFields {
        title: title(recognition),
        artist: artist(recognition),
        album: album(recognition),
        genre: genre(recognition),
        cover_art_url: cover_art_url(recognition),
    }
}

pub fn title(recognition: &Value) -> Option<String> {
    text(track(recognition)?.get("title")?)
}

/// Name of the artist section, wherever it sits in `sections`.
pub fn artist(recognition: &Value) -> Option<String> {
    text(find_section(recognition, ARTIST_SECTION)?.get("name")?)
}

pub fn album(recognition: &Value) -> Option<String> {
    let entry = find_section(recognition, SONG_SECTION)?
        .get("metadata")?
        .as_array()?
        .iter()
        .find(|entry| str_field(entry, "title") == Some(ALBUM_ENTRY))?;

    text(entry.get("text")?)
}

/// Primary genre, first component only.
pub fn genre(recognition: &Value) -> Option<String> {
    let primary = track(recognition)?
        .get("genres")?
        .get("primary")?
        .as_str()?;

    let first = primary.split('/').next()?;
    non_blank(first)
}

pub fn cover_art_url(recognition: &Value) -> Option<String> {
    let images = track(recognition)?.get("images")?;

    COVER_ART_KEYS
        .iter()
        .find_map(|key| images.get(*key).and_then(text))
}

fn track(recognition: &Value) -> Option<&Value> {
    recognition.get("track").filter(|t| t.is_object())
}

fn find_section<'a>(recognition: &'a Value, kind: &str) -> Option<&'a Value> {
    track(recognition)?
        .get("sections")?
        .as_array()?
        .iter()
        .find(|section| str_field(section, "type") == Some(kind))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn text(value: &Value) -> Option<String> {
    non_blank(value.as_str()?)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// Arbitrary JSON biased towards the keys the extractor looks at
    fn arbitrary_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z/ ]{0,12}".prop_map(Value::String),
            Just(Value::String("ARTIST".to_string())),
            Just(Value::String("SONG".to_string())),
            Just(Value::String("Album".to_string())),
        ];

        leaf.prop_recursive(5, 128, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map(
                    "(track|sections|type|name|metadata|title|text|genres|primary|images|coverart|coverarthq|background)",
                    inner,
                    0..6,
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Extraction is total and each field matches its standalone lookup
        #[test]
        fn extract_never_panics_and_fields_are_independent(response in arbitrary_json()) {
            let fields = extract(&response);
            prop_assert_eq!(fields.title, title(&response));
            prop_assert_eq!(fields.artist, artist(&response));
            prop_assert_eq!(fields.album, album(&response));
            prop_assert_eq!(fields.genre, genre(&response));
            prop_assert_eq!(fields.cover_art_url, cover_art_url(&response));
        }

        /// Garbage in `sections` never hides title or genre
        #[test]
        fn garbage_sections_keep_title_and_genre(sections in arbitrary_json()) {
            let response = json!({"track": {
                "title": "Song",
                "genres": {"primary": "Rock/Indie"},
                "sections": sections
            }});
            let title = title(&response);
            let genre = genre(&response);
            prop_assert_eq!(title.as_deref(), Some("Song"));
            prop_assert_eq!(genre.as_deref(), Some("Rock"));
        }

        /// The extracted genre never contains the separator
        #[test]
        fn genre_has_no_separator(primary in "[a-zA-Z /]{0,30}") {
            let response = json!({"track": {"genres": {"primary": primary}}});
            if let Some(g) = genre(&response) {
                prop_assert!(!g.contains('/'));
                prop_assert!(!g.is_empty());
            }
        }
    }
}
