//! Text formatting for listening statistics.
//!
//! Every function here is pure and total: whatever the input, a displayable
//! string comes back. Functions that depend on the current time take it as an
//! argument so results are reproducible.

use crate::{PlayCount, ReleaseDate, TrackStats};
use chrono::{DateTime, Datelike, Utc};

/// Placeholder shown while a track's statistics are being resolved.
pub const LOADING_MESSAGE: &str = "Loading song statistics...";

/// Line shown when the user has never scrobbled the current track.
pub const FIRST_LISTEN_MESSAGE: &str = "You are hearing this for the first time.";

/// Line shown when the scrobble service could not be asked.
pub const PLAY_COUNT_UNAVAILABLE: &str = "Play count unavailable";

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

fn plural(value: i64, unit: &str) -> String {
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

/// Describe when a track was last played, relative to `now`.
///
/// Without a timestamp the result depends on the play count: `"never"` for a
/// track that was never played, `"unknown date"` when plays exist but none of
/// them could be dated. Timestamps in the future are treated as "just now".
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use song_stats::format_elapsed;
///
/// let now = Utc::now();
/// assert_eq!(format_elapsed(None, 0, now), "never");
/// assert_eq!(format_elapsed(None, 5, now), "unknown date");
///
/// let two_hours_ago = (now - Duration::hours(2)).timestamp();
/// assert_eq!(format_elapsed(Some(two_hours_ago), 5, now), "2 hours ago");
/// ```
pub fn format_elapsed(last_played: Option<i64>, play_count: u64, now: DateTime<Utc>) -> String {
    let Some(timestamp) = last_played else {
        return if play_count > 0 {
            "unknown date".to_string()
        } else {
            "never".to_string()
        };
    };

    let elapsed = now.timestamp().saturating_sub(timestamp).max(0);

    if elapsed < HOUR {
        format!("{} ago", plural(elapsed / MINUTE, "minute"))
    } else if elapsed < DAY {
        format!("{} ago", plural(elapsed / HOUR, "hour"))
    } else if elapsed < WEEK {
        match elapsed / DAY {
            1 => "yesterday".to_string(),
            days => format!("{days} days ago"),
        }
    } else if elapsed < 30 * DAY {
        format!("{} ago", plural(elapsed / WEEK, "week"))
    } else {
        match DateTime::<Utc>::from_timestamp(timestamp, 0) {
            Some(date) => date.format("%-d %b %Y").to_string(),
            None => "unknown date".to_string(),
        }
    }
}

/// [`format_elapsed`] relative to the current time.
pub fn time_since_last_play(last_played: Option<i64>, play_count: u64) -> String {
    format_elapsed(last_played, play_count, Utc::now())
}

/// Describe a release date.
pub fn format_release_date(release: &ReleaseDate) -> String {
    match release {
        ReleaseDate::Year(year) => format!("Released {year}"),
        ReleaseDate::FullDate(date) => format!(
            "Song released {}.{}.{}",
            date.day(),
            date.month(),
            date.year()
        ),
        ReleaseDate::Unknown => "Unknown release date".to_string(),
    }
}

/// Describe a play count.
///
/// Returns `None` for zero: a first listen gets its own message rather than
/// `"0 plays"`.
pub fn format_play_count(count: u64) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 play".to_string()),
        n => Some(format!("{n} plays")),
    }
}

/// Compose the single statistics line shown next to the current track.
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use song_stats::{format_stats_line, ReleaseDate, ScrobbleStats, TrackStats};
///
/// let now = Utc::now();
/// let stats = TrackStats {
///     scrobble: ScrobbleStats::new(3, Some((now - Duration::days(1)).timestamp())),
///     release: ReleaseDate::Year(2001),
/// };
/// assert_eq!(
///     format_stats_line(&stats, now),
///     "3 plays. Last play yesterday. Released 2001."
/// );
/// ```
pub fn format_stats_line(stats: &TrackStats, now: DateTime<Utc>) -> String {
    let count = match stats.scrobble.play_count {
        PlayCount::Known(0) => return FIRST_LISTEN_MESSAGE.to_string(),
        PlayCount::Known(count) => count,
        PlayCount::Unknown => {
            return if stats.release.is_known() {
                format!(
                    "{PLAY_COUNT_UNAVAILABLE}. {}.",
                    format_release_date(&stats.release)
                )
            } else {
                format!("{PLAY_COUNT_UNAVAILABLE}.")
            };
        }
    };

    let mut parts = Vec::with_capacity(3);
    parts.extend(format_play_count(count));

    // Undated plays are left out rather than shown as "unknown date".
    if stats.scrobble.last_played.is_some() {
        parts.push(format!(
            "Last play {}",
            format_elapsed(stats.scrobble.last_played, count, now)
        ));
    }

    if stats.release.is_known() {
        parts.push(format_release_date(&stats.release));
    }

    format!("{}.", parts.join(". "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScrobbleStats;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(duration: Duration) -> Option<i64> {
        Some((now() - duration).timestamp())
    }

    #[test]
    fn test_elapsed_without_timestamp() {
        assert_eq!(format_elapsed(None, 0, now()), "never");
        assert_eq!(format_elapsed(None, 5, now()), "unknown date");
    }

    #[test]
    fn test_elapsed_buckets() {
        assert!(format_elapsed(ago(Duration::seconds(90)), 1, now()).contains("minute"));
        assert!(format_elapsed(ago(Duration::hours(2)), 1, now()).contains("hour"));
        assert_eq!(format_elapsed(ago(Duration::seconds(30)), 1, now()), "0 minutes ago");
        assert_eq!(format_elapsed(ago(Duration::seconds(61)), 1, now()), "1 minute ago");
        assert_eq!(format_elapsed(ago(Duration::minutes(59)), 1, now()), "59 minutes ago");
        assert_eq!(format_elapsed(ago(Duration::minutes(60)), 1, now()), "1 hour ago");
        assert_eq!(format_elapsed(ago(Duration::hours(23)), 1, now()), "23 hours ago");
        assert_eq!(format_elapsed(ago(Duration::hours(24)), 1, now()), "yesterday");
        assert_eq!(format_elapsed(ago(Duration::hours(47)), 1, now()), "yesterday");
        assert_eq!(format_elapsed(ago(Duration::days(3)), 1, now()), "3 days ago");
        assert_eq!(format_elapsed(ago(Duration::days(7)), 1, now()), "1 week ago");
        assert_eq!(format_elapsed(ago(Duration::days(29)), 1, now()), "4 weeks ago");
        assert_eq!(format_elapsed(ago(Duration::days(30)), 1, now()), "16 May 2024");
        assert_eq!(format_elapsed(ago(Duration::days(400)), 1, now()), "12 May 2023");
    }

    #[test]
    fn test_elapsed_future_timestamp_clamps() {
        let future = (now() + Duration::hours(3)).timestamp();
        assert_eq!(format_elapsed(Some(future), 1, now()), "0 minutes ago");
    }

    #[test]
    fn test_elapsed_extreme_timestamps() {
        assert_eq!(format_elapsed(Some(i64::MIN), 1, now()), "unknown date");
        assert_eq!(format_elapsed(Some(i64::MAX), 1, now()), "0 minutes ago");
    }

    #[test]
    fn test_time_since_last_play_uses_clock() {
        let recent = (Utc::now() - Duration::minutes(5)).timestamp();
        assert_eq!(time_since_last_play(Some(recent), 2), "5 minutes ago");
        assert_eq!(time_since_last_play(None, 0), "never");
    }

    #[test]
    fn test_play_count() {
        assert_eq!(format_play_count(0), None);
        assert_eq!(format_play_count(1).as_deref(), Some("1 play"));
        assert_eq!(format_play_count(2).as_deref(), Some("2 plays"));
    }

    #[test]
    fn test_release_date() {
        assert_eq!(format_release_date(&ReleaseDate::Year(1994)), "Released 1994");
        assert_eq!(
            format_release_date(&ReleaseDate::FullDate(
                NaiveDate::from_ymd_opt(1997, 5, 1).unwrap()
            )),
            "Song released 1.5.1997"
        );
        assert_eq!(
            format_release_date(&ReleaseDate::Unknown),
            "Unknown release date"
        );
    }

    #[test]
    fn test_stats_line_first_listen() {
        let stats = TrackStats {
            scrobble: ScrobbleStats::new(0, None),
            release: ReleaseDate::Year(2001),
        };
        assert_eq!(
            format_stats_line(&stats, now()),
            "You are hearing this for the first time."
        );
    }

    #[test]
    fn test_stats_line_full() {
        let stats = TrackStats {
            scrobble: ScrobbleStats::new(3, ago(Duration::days(1))),
            release: ReleaseDate::Year(2001),
        };
        assert_eq!(
            format_stats_line(&stats, now()),
            "3 plays. Last play yesterday. Released 2001."
        );
    }

    #[test]
    fn test_stats_line_skips_missing_parts() {
        let stats = TrackStats {
            scrobble: ScrobbleStats::new(1, None),
            release: ReleaseDate::Unknown,
        };
        assert_eq!(format_stats_line(&stats, now()), "1 play.");
    }

    #[test]
    fn test_stats_line_degraded_play_count() {
        let stats = TrackStats {
            scrobble: ScrobbleStats::unknown(),
            release: ReleaseDate::Year(1969),
        };
        assert_eq!(
            format_stats_line(&stats, now()),
            "Play count unavailable. Released 1969."
        );

        let stats = TrackStats {
            scrobble: ScrobbleStats::unknown(),
            release: ReleaseDate::Unknown,
        };
        assert_eq!(format_stats_line(&stats, now()), "Play count unavailable.");
    }
}
