//! Song model and the list query parameters

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A song record as stored and served.
///
/// The group name is a view over the `groups` relation; the song row only
/// holds a foreign key. Every field defaults to empty so the same shape can
/// carry a partial update, where an empty string means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Song {
    pub id: i64,
    /// Group (performer) name
    pub group: String,
    /// Song title
    pub song: String,
    /// Free-form release date
    pub release_date: String,
    /// Lyrics, verses separated by a blank line
    pub text: String,
    /// External link
    pub link: String,
}

impl Song {
    #[cfg(test)]
    pub fn new(group: impl Into<String>, song: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            song: song.into(),
            ..Self::default()
        }
    }

    /// True when at least one field would be written by a partial update
    pub fn has_changes(&self) -> bool {
        !(self.group.is_empty()
            && self.song.is_empty()
            && self.release_date.is_empty()
            && self.text.is_empty()
            && self.link.is_empty())
    }

    /// Overwrite the enrichable fields with whatever the lookup returned
    pub fn apply_detail(&mut self, detail: SongDetail) {
        if let Some(release_date) = detail.release_date {
            self.release_date = release_date;
        }
        if let Some(text) = detail.text {
            self.text = text;
        }
        if let Some(link) = detail.link {
            self.link = link;
        }
    }
}

/// Song fields returned by the external info lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Substring filters for the list query. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SongFilter {
    pub group: String,
    pub song: String,
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// A validated page request; both values are always >= 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build from already-parsed values, falling back to defaults for anything below 1
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE),
            page_size: page_size.filter(|s| *s >= 1).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Build from raw query-string values; unparsable input falls back to defaults
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self::new(
            page.and_then(|p| p.trim().parse().ok()),
            page_size.and_then(|s| s.trim().parse().ok()),
        )
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::parse(None, None);
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 10, 0));

        let p = Pagination::parse(Some("abc"), Some("-3"));
        assert_eq!((p.page(), p.limit()), (1, 10));

        let p = Pagination::parse(Some("0"), Some("0"));
        assert_eq!((p.page(), p.limit()), (1, 10));
    }

    #[test]
    fn test_pagination_offset() {
        let p = Pagination::parse(Some("2"), Some("10"));
        assert_eq!(p.offset(), 10);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(Some(3), Some(25));
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_song_json_shape() {
        let song = Song {
            id: 4,
            group: "Muse".into(),
            song: "Supermassive Black Hole".into(),
            release_date: "16.07.2006".into(),
            text: "Ooh baby".into(),
            link: "https://example.com".into(),
        };
        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["releaseDate"], "16.07.2006");
        assert_eq!(json["group"], "Muse");
        assert_eq!(json["song"], "Supermassive Black Hole");
    }

    #[test]
    fn test_partial_body() {
        let song: Song = serde_json::from_str(r#"{"text": "new words"}"#).unwrap();
        assert!(song.has_changes());
        assert!(song.group.is_empty());
        assert!(!Song::default().has_changes());
    }

    #[test]
    fn test_apply_detail() {
        let mut song = Song::new("Muse", "Uprising");
        song.link = "old".into();
        song.apply_detail(SongDetail {
            release_date: Some("2009".into()),
            text: None,
            link: Some("new".into()),
        });
        assert_eq!(song.release_date, "2009");
        assert_eq!(song.link, "new");
        assert!(song.text.is_empty());
    }
}
