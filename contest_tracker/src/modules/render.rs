use chrono::{DateTime, TimeZone, Utc};
use contest_tracker_libs::{
    compute_remaining,
    countdown::clock::{format_duration, format_start},
    Contest, CountdownState, FilterPreferences,
};
use std::fmt;

pub const NO_UPCOMING: &str = "No upcoming contests match your filters.";
pub const NO_PAST: &str = "No past contests match your filters.";

/// Which of the two contest lists is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Upcoming,
    Past,
}

/// Text card for one contest.
///
/// Upcoming cards carry the countdown at `now`; past cards carry the solution link.
pub fn render_card<Tz: TimeZone>(
    contest: &Contest,
    tab: Tab,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz::Offset: fmt::Display,
{
    let marker = if contest.is_bookmarked { " *" } else { "" };
    let status = match tab {
        Tab::Upcoming => {
            CountdownState::from(compute_remaining(contest.start_time, now)).to_string()
        }
        Tab::Past => match &contest.solution_url {
            Some(url) if contest.has_solution() => format!("Solution: {}", url),
            _ => String::from("No solution yet"),
        },
    };

    [
        format!(
            "[{}] {}{} ({})",
            contest.platform, contest.name, marker, contest.id
        ),
        format!(
            "    {} | {}",
            format_start(&contest.start_time, tz),
            format_duration(contest.duration)
        ),
        format!("    {}", status),
        format!("    {}", contest.url),
    ]
    .join("\n")
}

pub fn render_list<Tz: TimeZone>(
    contests: &[Contest],
    tab: Tab,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz::Offset: fmt::Display,
{
    if contests.is_empty() {
        return match tab {
            Tab::Upcoming => NO_UPCOMING.to_string(),
            Tab::Past => NO_PAST.to_string(),
        };
    }

    contests
        .iter()
        .map(|contest| render_card(contest, tab, now, tz))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_preferences(prefs: &FilterPreferences) -> String {
    let platforms = if prefs.selected_platforms.is_empty() {
        String::from("(none)")
    } else {
        prefs
            .selected_platforms
            .iter()
            .map(|platform| platform.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let shown = if prefs.show_bookmarked {
        "bookmarked only"
    } else {
        "all contests"
    };

    format!("Platforms: {}\nShowing: {}", platforms, shown)
}
