use crate::{contest::model::Contest, preferences::filter::FilterPreferences};

/// Projects a fetched contest list onto what the user asked to see.
///
/// Only the bookmarked-only flag is applied here. Platform selection is part
/// of the list query, so a platform change means a new fetch while a
/// bookmark-flag change only needs this function to run again.
/// The input order is kept as is.
pub fn derive_visible(contests: &[Contest], prefs: &FilterPreferences) -> Vec<Contest> {
    contests
        .iter()
        .filter(|contest| !prefs.show_bookmarked || contest.is_bookmarked)
        .cloned()
        .collect()
}
