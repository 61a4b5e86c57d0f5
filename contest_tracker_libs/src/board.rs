use crate::{
    contest::{
        client::{ContestApi, ContestApiError},
        derivation::derive_visible,
        model::{Contest, Platform, SyncResponse},
    },
    preferences::filter::{FilterPreferences, PersistedFilter},
};
use thiserror::Error;
use tokio::time::{Duration, Instant};

/// How long fetched lists are considered fresh.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("contest `{contest_id}` is not on the board: {reason}")]
    ContestNotFound { contest_id: String, reason: String },
    #[error("contest `{0}` already has a solution url")]
    SolutionAlreadySet(String),
    #[error("remote operation failed")]
    Remote(#[from] ContestApiError),
}

/// Upcoming and past contest lists together with the user's filter.
///
/// Lists are fetched per selected platform set. A platform change refetches
/// both lists, a bookmark-flag change only changes what is derived from them.
/// Every successful mutation refetches both lists, and the response of the
/// mutation itself is applied first.
pub struct ContestBoard<A: ContestApi> {
    api: A,
    filter: PersistedFilter,
    upcoming: Vec<Contest>,
    past: Vec<Contest>,
    upcoming_failed: bool,
    past_failed: bool,
    fetched_at: Option<Instant>,
    stale_after: Duration,
}

impl<A: ContestApi> ContestBoard<A> {
    pub fn new(api: A, filter: PersistedFilter) -> Self {
        Self {
            api,
            filter,
            upcoming: Vec::new(),
            past: Vec::new(),
            upcoming_failed: false,
            past_failed: false,
            fetched_at: None,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn preferences(&self) -> &FilterPreferences {
        self.filter.preferences()
    }

    /// Fetches both lists for the selected platforms.
    ///
    /// A failed list is logged and replaced by an empty one; it never affects
    /// the other list.
    pub async fn refresh(&mut self) {
        let platforms = self.filter.preferences().selected_platforms.clone();
        self.fetched_at = Some(Instant::now());
        self.upcoming_failed = false;
        self.past_failed = false;

        if platforms.is_empty() {
            tracing::info!("No platform selected, nothing to fetch.");
            self.upcoming.clear();
            self.past.clear();
            return;
        }

        let (upcoming, past) = tokio::join!(
            self.api.list_upcoming(&platforms),
            self.api.list_past(&platforms)
        );

        self.upcoming = upcoming.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch upcoming contests: {:?}", e);
            self.upcoming_failed = true;
            Vec::new()
        });
        self.past = past.unwrap_or_else(|e| {
            tracing::error!("Failed to fetch past contests: {:?}", e);
            self.past_failed = true;
            Vec::new()
        });

        tracing::info!(
            "{} upcoming and {} past contests fetched.",
            self.upcoming.len(),
            self.past.len()
        );
    }

    pub fn is_stale(&self) -> bool {
        self.fetched_at
            .map(|fetched_at| fetched_at.elapsed() >= self.stale_after)
            .unwrap_or(true)
    }

    /// Refetches only when the lists were never fetched or have gone stale.
    /// Returns whether a fetch happened.
    pub async fn refresh_if_stale(&mut self) -> bool {
        if !self.is_stale() {
            return false;
        }
        self.refresh().await;
        true
    }

    pub fn upcoming(&self) -> &[Contest] {
        &self.upcoming
    }

    pub fn past(&self) -> &[Contest] {
        &self.past
    }

    pub fn visible_upcoming(&self) -> Vec<Contest> {
        derive_visible(&self.upcoming, self.filter.preferences())
    }

    pub fn visible_past(&self) -> Vec<Contest> {
        derive_visible(&self.past, self.filter.preferences())
    }

    pub fn find(&self, contest_id: &str) -> Option<&Contest> {
        self.upcoming
            .iter()
            .chain(self.past.iter())
            .find(|contest| contest.id == contest_id)
    }

    pub async fn toggle_platform(&mut self, platform: Platform) {
        self.filter.toggle_platform(platform);
        self.refresh().await;
    }

    pub async fn clear_platforms(&mut self) {
        self.filter.clear_all();
        self.refresh().await;
    }

    pub async fn select_all_platforms(&mut self) {
        self.filter.select_all();
        self.refresh().await;
    }

    pub fn toggle_bookmarked(&mut self) {
        self.filter.toggle_bookmarked();
    }

    /// Flips the bookmark of a contest on the board.
    pub async fn toggle_bookmark(&mut self, contest_id: &str) -> Result<Contest, BoardError> {
        let desired = !self
            .find(contest_id)
            .ok_or_else(|| self.not_found(contest_id, true))?
            .is_bookmarked;

        let updated = self.api.set_bookmark(contest_id, desired).await?;
        self.apply(&updated);
        self.refresh().await;

        Ok(updated)
    }

    /// Attaches a solution url to a past contest.
    ///
    /// A blank url is a no-op and returns `Ok(None)` without any remote call.
    pub async fn save_solution(
        &mut self,
        contest_id: &str,
        url: &str,
    ) -> Result<Option<Contest>, BoardError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(None);
        }

        let contest = self
            .past
            .iter()
            .find(|contest| contest.id == contest_id)
            .ok_or_else(|| self.not_found(contest_id, false))?;
        if contest.has_solution() {
            return Err(BoardError::SolutionAlreadySet(contest_id.to_string()));
        }

        let updated = self.api.set_solution_url(contest_id, url).await?;
        self.apply(&updated);
        self.refresh().await;

        Ok(Some(updated))
    }

    pub async fn sync(&self) -> Result<SyncResponse, BoardError> {
        Ok(self.api.sync().await?)
    }

    /// Explains why `contest_id` is missing from the searched lists.
    fn not_found(&self, contest_id: &str, with_upcoming: bool) -> BoardError {
        let prefs = self.filter.preferences();
        let deselected: Vec<&str> = Platform::ALL
            .iter()
            .filter(|platform| !prefs.is_selected(**platform))
            .map(|platform| platform.as_str())
            .collect();

        let reason = if prefs.selected_platforms.is_empty() {
            String::from("no platform is selected")
        } else if with_upcoming && self.upcoming_failed {
            String::from("fetching upcoming contests failed")
        } else if self.past_failed {
            String::from("fetching past contests failed")
        } else if !deselected.is_empty() {
            format!(
                "it is not listed for the selected platforms, deselected: {}",
                deselected.join(", ")
            )
        } else if with_upcoming {
            String::from("the contest service does not list it")
        } else {
            String::from("it is not a past contest")
        };

        BoardError::ContestNotFound {
            contest_id: contest_id.to_string(),
            reason,
        }
    }

    fn apply(&mut self, updated: &Contest) {
        for contest in self.upcoming.iter_mut().chain(self.past.iter_mut()) {
            if contest.id == updated.id {
                *contest = updated.clone();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::preferences::store::{MemoryPreferenceStore, PreferenceStore};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::{
        collections::BTreeSet,
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Arc, Mutex,
        },
    };

    type ApiResult<T> = std::result::Result<T, ContestApiError>;

    fn contest(id: &str, platform: Platform, is_bookmarked: bool) -> Contest {
        let start_time = Utc.with_ymd_and_hms(2031, 7, 4, 15, 0, 0).unwrap();
        Contest {
            id: id.to_string(),
            name: format!("Round {}", id),
            platform,
            url: format!("https://example.com/contests/{}", id),
            start_time,
            end_time: start_time + chrono::Duration::minutes(90),
            duration: 5400,
            is_bookmarked,
            solution_url: None,
        }
    }

    fn unavailable() -> ContestApiError {
        ContestApiError::UnexpectedStatus {
            status: 500,
            message: String::from("internal server error"),
        }
    }

    /// In-memory contest service.
    #[derive(Default)]
    struct FakeApi {
        upcoming: Mutex<Vec<Contest>>,
        past: Mutex<Vec<Contest>>,
        list_calls: AtomicUsize,
        mutation_calls: AtomicUsize,
        last_platforms: Mutex<Option<BTreeSet<Platform>>>,
        fail_upcoming: AtomicBool,
        fail_mutations: AtomicBool,
    }

    impl FakeApi {
        fn new(upcoming: Vec<Contest>, past: Vec<Contest>) -> Self {
            Self {
                upcoming: Mutex::new(upcoming),
                past: Mutex::new(past),
                ..Self::default()
            }
        }

        fn filtered(list: &Mutex<Vec<Contest>>, platforms: &BTreeSet<Platform>) -> Vec<Contest> {
            list.lock()
                .unwrap()
                .iter()
                .filter(|contest| platforms.contains(&contest.platform))
                .cloned()
                .collect()
        }

        fn update(&self, contest_id: &str, f: impl Fn(&mut Contest)) -> ApiResult<Contest> {
            self.mutation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            for list in [&self.upcoming, &self.past] {
                let mut list = list.lock().unwrap();
                if let Some(contest) = list.iter_mut().find(|c| c.id == contest_id) {
                    f(contest);
                    return Ok(contest.clone());
                }
            }
            Err(ContestApiError::UnexpectedStatus {
                status: 404,
                message: String::from("not found"),
            })
        }
    }

    #[async_trait]
    impl ContestApi for FakeApi {
        async fn list_upcoming(&self, platforms: &BTreeSet<Platform>) -> ApiResult<Vec<Contest>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_platforms.lock().unwrap() = Some(platforms.clone());
            if self.fail_upcoming.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            Ok(Self::filtered(&self.upcoming, platforms))
        }

        async fn list_past(&self, platforms: &BTreeSet<Platform>) -> ApiResult<Vec<Contest>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::filtered(&self.past, platforms))
        }

        async fn set_bookmark(&self, contest_id: &str, desired: bool) -> ApiResult<Contest> {
            self.update(contest_id, |contest| contest.is_bookmarked = desired)
        }

        async fn set_solution_url(&self, contest_id: &str, url: &str) -> ApiResult<Contest> {
            self.update(contest_id, |contest| {
                contest.solution_url = Some(url.to_string())
            })
        }

        async fn sync(&self) -> ApiResult<SyncResponse> {
            if self.fail_mutations.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            Ok(SyncResponse {
                message: String::from("Contests synchronized"),
            })
        }
    }

    fn board_with(
        api: FakeApi,
    ) -> (ContestBoard<FakeApi>, Arc<MemoryPreferenceStore>) {
        let store = Arc::new(MemoryPreferenceStore::new());
        let filter = PersistedFilter::load(store.clone());
        (ContestBoard::new(api, filter), store)
    }

    fn default_board() -> ContestBoard<FakeApi> {
        let api = FakeApi::new(
            vec![
                contest("c1", Platform::Codeforces, false),
                contest("c2", Platform::Codechef, true),
                contest("c3", Platform::Leetcode, false),
            ],
            vec![
                contest("p1", Platform::Codeforces, true),
                contest("p2", Platform::Leetcode, false),
            ],
        );
        board_with(api).0
    }

    fn ids(contests: &[Contest]) -> Vec<&str> {
        contests.iter().map(|c| c.id.as_str()).collect()
    }

    fn list_calls(board: &ContestBoard<FakeApi>) -> usize {
        board.api().list_calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_refresh_fetches_both_lists() {
        let mut board = default_board();
        board.refresh().await;

        assert_eq!(ids(board.upcoming()), vec!["c1", "c2", "c3"]);
        assert_eq!(ids(board.past()), vec!["p1", "p2"]);
        assert_eq!(list_calls(&board), 2);
        assert_eq!(
            board.api().last_platforms.lock().unwrap().clone(),
            Some(BTreeSet::from(Platform::ALL))
        );
    }

    #[tokio::test]
    async fn test_failed_list_degrades_to_empty() {
        let mut board = default_board();
        board.api().fail_upcoming.store(true, Ordering::SeqCst);
        board.refresh().await;

        assert!(board.upcoming().is_empty());
        assert_eq!(ids(board.past()), vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_toggle_bookmarked_does_not_refetch() {
        let mut board = default_board();
        board.refresh().await;

        board.toggle_bookmarked();
        assert_eq!(list_calls(&board), 2);
        assert_eq!(ids(&board.visible_upcoming()), vec!["c2"]);
        assert_eq!(ids(&board.visible_past()), vec!["p1"]);

        board.toggle_bookmarked();
        assert_eq!(ids(&board.visible_upcoming()), vec!["c1", "c2", "c3"]);
        assert_eq!(list_calls(&board), 2);
    }

    #[tokio::test]
    async fn test_toggle_platform_refetches() {
        let mut board = default_board();
        board.refresh().await;

        board.toggle_platform(Platform::Codechef).await;
        assert_eq!(list_calls(&board), 4);
        assert_eq!(
            board.api().last_platforms.lock().unwrap().clone(),
            Some(BTreeSet::from([Platform::Codeforces, Platform::Leetcode]))
        );
        assert_eq!(ids(&board.visible_upcoming()), vec!["c1", "c3"]);
    }

    #[tokio::test]
    async fn test_no_platform_selected_shows_nothing() {
        let mut board = default_board();
        board.refresh().await;

        board.clear_platforms().await;
        assert!(board.visible_upcoming().is_empty());
        assert!(board.visible_past().is_empty());
        assert_eq!(list_calls(&board), 2);

        board.select_all_platforms().await;
        assert_eq!(ids(&board.visible_upcoming()), vec!["c1", "c2", "c3"]);
        assert_eq!(list_calls(&board), 4);
    }

    #[tokio::test]
    async fn test_filter_changes_are_persisted() {
        let (mut board, store) = board_with(FakeApi::default());

        board.toggle_platform(Platform::Leetcode).await;
        board.toggle_bookmarked();

        let reloaded = FilterPreferences::load(store.as_ref() as &dyn PreferenceStore);
        assert_eq!(&reloaded, board.preferences());
        assert!(reloaded.show_bookmarked);
        assert!(!reloaded.is_selected(Platform::Leetcode));
    }

    #[tokio::test]
    async fn test_toggle_bookmark_applies_response_and_refetches() {
        let mut board = default_board();
        board.refresh().await;

        let updated = board.toggle_bookmark("c1").await.unwrap();
        assert_eq!(updated.id, "c1");
        assert!(updated.is_bookmarked);
        assert!(board.find("c1").unwrap().is_bookmarked);
        assert_eq!(list_calls(&board), 4);

        let updated = board.toggle_bookmark("c1").await.unwrap();
        assert!(!updated.is_bookmarked);
        assert!(!board.find("c1").unwrap().is_bookmarked);
    }

    #[tokio::test]
    async fn test_failed_bookmark_keeps_state() {
        let mut board = default_board();
        board.refresh().await;
        board.api().fail_mutations.store(true, Ordering::SeqCst);

        let result = board.toggle_bookmark("c1").await;
        assert!(matches!(result, Err(BoardError::Remote(_))));
        assert!(!board.find("c1").unwrap().is_bookmarked);
        assert_eq!(list_calls(&board), 2);
    }

    #[tokio::test]
    async fn test_bookmark_of_unknown_contest() {
        let mut board = default_board();
        board.refresh().await;

        let result = board.toggle_bookmark("nope").await;
        assert!(matches!(
            result,
            Err(BoardError::ContestNotFound { contest_id, reason })
                if contest_id == "nope" && reason == "the contest service does not list it"
        ));
        assert_eq!(board.api().mutation_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_names_failed_fetch() {
        let mut board = default_board();
        board.api().fail_upcoming.store(true, Ordering::SeqCst);
        board.refresh().await;

        let err = board.toggle_bookmark("c1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "contest `c1` is not on the board: fetching upcoming contests failed"
        );

        board.api().fail_upcoming.store(false, Ordering::SeqCst);
        board.refresh().await;
        assert!(board.toggle_bookmark("c1").await.is_ok());
    }

    #[tokio::test]
    async fn test_not_found_names_deselected_platforms() {
        let mut board = default_board();
        board.toggle_platform(Platform::Leetcode).await;

        let err = board.toggle_bookmark("c3").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "contest `c3` is not on the board: it is not listed for the selected platforms, deselected: leetcode"
        );

        board.clear_platforms().await;
        let err = board.toggle_bookmark("c1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "contest `c1` is not on the board: no platform is selected"
        );
    }

    #[tokio::test]
    async fn test_save_solution() {
        let mut board = default_board();
        board.refresh().await;

        let updated = board
            .save_solution("p2", "  https://example.com/p2-editorial ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            updated.solution_url.as_deref(),
            Some("https://example.com/p2-editorial")
        );
        assert!(board.find("p2").unwrap().has_solution());
        assert_eq!(list_calls(&board), 4);

        let again = board.save_solution("p2", "https://example.com/other").await;
        assert!(matches!(again, Err(BoardError::SolutionAlreadySet(_))));
    }

    #[tokio::test]
    async fn test_blank_solution_is_noop() {
        let mut board = default_board();
        board.refresh().await;

        assert!(board.save_solution("p1", "   ").await.unwrap().is_none());
        assert_eq!(board.api().mutation_calls.load(Ordering::SeqCst), 0);
        assert_eq!(list_calls(&board), 2);
    }

    #[tokio::test]
    async fn test_solution_only_for_past_contests() {
        let mut board = default_board();
        board.refresh().await;

        let result = board.save_solution("c1", "https://example.com/c1").await;
        assert!(matches!(
            result,
            Err(BoardError::ContestNotFound { reason, .. }) if reason == "it is not a past contest"
        ));
    }

    #[tokio::test]
    async fn test_sync() {
        let board = default_board();
        assert_eq!(board.sync().await.unwrap().message, "Contests synchronized");

        board.api().fail_mutations.store(true, Ordering::SeqCst);
        assert!(matches!(board.sync().await, Err(BoardError::Remote(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_if_stale() {
        let mut board = default_board();
        assert!(board.is_stale());
        assert!(board.refresh_if_stale().await);
        assert!(!board.refresh_if_stale().await);
        assert_eq!(list_calls(&board), 2);

        tokio::time::advance(DEFAULT_STALE_AFTER - Duration::from_secs(1)).await;
        assert!(!board.refresh_if_stale().await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(board.refresh_if_stale().await);
        assert_eq!(list_calls(&board), 4);
    }
}
