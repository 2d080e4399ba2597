//! Database table operations

mod group_table;
mod song_table;

pub use group_table::GroupTable;
pub use song_table::SongTable;

/// Lowercase form stored next to every filterable column.
///
/// SQLite `LIKE` only folds ASCII, so matching runs on these columns instead.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_case() {
        assert_eq!(fold_case("Кино"), "кино");
        assert_eq!(fold_case("Die ÄRZTE"), "die ärzte");
        assert_eq!(fold_case("Muse"), "muse");
    }
}
