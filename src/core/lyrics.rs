//! Verse pagination over stored lyrics

/// Delimiter between two verses: a blank line
pub const VERSE_DELIMITER: &str = "\n\n";

/// Lyrics library
pub struct LyricsLib;

impl LyricsLib {
    /// Split lyrics into verses
    pub fn verses(lyrics: &str) -> Vec<&str> {
        lyrics.split(VERSE_DELIMITER).collect()
    }

    /// Return the verse at 1-based `index`, or the full text when the index
    /// does not point at a verse (zero, negative, past the end)
    pub fn verse(lyrics: &str, index: i64) -> &str {
        let verses = Self::verses(lyrics);

        match usize::try_from(index) {
            Ok(i) if i >= 1 && i <= verses.len() => verses[i - 1],
            _ => lyrics,
        }
    }

    /// Parse a raw `verse` query value; anything unparsable selects the full text
    pub fn parse_index(raw: Option<&str>) -> i64 {
        raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
    }
}
