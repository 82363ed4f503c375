//! Text rendering for cards, the detail view, and metadata values.

use std::fmt::Write;

use animelist_api::traits::{AnimeRecord, EpisodeRecord};
use animelist_core::filter::FilterState;
use animelist_core::models::{AnimeWithPreference, Preference};
use animelist_core::preferences::WatchList;
use chrono::NaiveDate;

/// Rows one card occupies, including the blank separator.
pub const CARD_ROWS: u32 = 3;

const TITLE_WIDTH: usize = 48;

pub fn star(on: bool) -> &'static str {
    if on {
        "★"
    } else {
        "☆"
    }
}

pub fn heart(on: bool) -> &'static str {
    if on {
        "♥"
    } else {
        "♡"
    }
}

fn check(on: bool) -> &'static str {
    if on {
        "[x]"
    } else {
        "[ ]"
    }
}

/// `1998-04-03` → `Apr 3, 1998`; anything unparseable is returned as-is.
pub fn date(s: &str) -> String {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| s.to_string())
}

/// Airing status as Kitsu sends it, except `current` reads "Ongoing".
pub fn status(s: &str) -> &str {
    match s {
        "current" => "Ongoing",
        other => other,
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// A card: numbered title line, rating/favorites line, blank line.
pub fn card(number: usize, item: &AnimeWithPreference) -> String {
    let anime = &item.anime;
    let rating = anime.average_rating.as_deref().unwrap_or("-");
    let favorites = anime
        .favorites_count
        .map_or_else(|| "-".to_string(), |n| n.to_string());

    format!(
        "[{number:>3}] {title:<width$}  id {id}\n      {star} {rating:<8} {heart} {favorites}\n",
        title = truncate(anime.display_title(), TITLE_WIDTH),
        width = TITLE_WIDTH,
        id = anime.id,
        star = star(item.is_starred()),
        heart = heart(item.is_favorite()),
    )
}

/// The control bar above the list: filter toggles, search text, count.
pub fn header(
    filter: FilterState,
    search: &str,
    shown: usize,
    loaded: usize,
    total: Option<u64>,
) -> String {
    let mut out = String::from("Anime List\n");
    let _ = write!(
        out,
        "Filter {} {}   Search: {}   {shown} of {loaded} Items",
        heart(filter.favorite),
        star(filter.starred),
        if search.is_empty() { "-" } else { search },
    );
    if let Some(total) = total {
        let _ = write!(out, " (catalog {total})");
    }
    out.push('\n');
    out
}

fn episode_line(episode: &EpisodeRecord, watched: bool) -> String {
    let mut line = format!("{} ", check(watched));
    if let Some(air_date) = &episode.air_date {
        let _ = write!(line, "{} ", date(air_date));
    }
    let _ = write!(
        line,
        "Season {} Episode {}: {}",
        episode.season_number.unwrap_or(0),
        episode
            .number
            .map_or_else(|| "?".to_string(), |n| n.to_string()),
        episode.display_title(),
    );
    line
}

/// Full detail view of one anime with its episodes.
pub fn detail(
    anime: &AnimeRecord,
    preference: Option<&Preference>,
    episodes: &[EpisodeRecord],
    watched: &WatchList,
) -> String {
    let starred = preference.is_some_and(Preference::is_starred);
    let favorite = preference.is_some_and(Preference::is_favorite);
    let dash = || "-".to_string();

    let mut out = String::new();
    let _ = writeln!(out, "{}  (id {})", anime.display_title(), anime.id);
    if let Some(url) = anime.poster_url() {
        let _ = writeln!(out, "Poster: {url}");
    }
    let _ = writeln!(
        out,
        "{} {} from {} users",
        star(starred),
        anime.average_rating.as_deref().unwrap_or("-"),
        anime.user_count.map_or_else(dash, |n| n.to_string()),
    );
    let _ = writeln!(
        out,
        "{} {} Rank # {}",
        heart(favorite),
        anime.favorites_count.map_or_else(dash, |n| n.to_string()),
        anime.popularity_rank.map_or_else(dash, |n| n.to_string()),
    );
    let _ = writeln!(
        out,
        "Rated {}: {}",
        anime.age_rating.as_deref().unwrap_or("-"),
        anime.age_rating_guide.as_deref().unwrap_or("-"),
    );
    if let Some(start) = &anime.start_date {
        let _ = writeln!(out, "Aired on {}", date(start));
    }
    if let Some(s) = &anime.status {
        match (s.as_str(), &anime.end_date) {
            ("finished", Some(end)) => {
                let _ = writeln!(out, "{} {}", status(s), date(end));
            }
            _ => {
                let _ = writeln!(out, "{}", status(s));
            }
        }
    }
    if let Some(subtype) = &anime.subtype {
        let _ = writeln!(out, "Type: {subtype}");
    }
    if let Some(synopsis) = &anime.synopsis {
        let _ = writeln!(out, "\n{}", synopsis.trim());
    }

    let _ = writeln!(out, "\nEpisodes");
    if episodes.is_empty() {
        let _ = writeln!(out, "  (none listed)");
    }
    for (i, episode) in episodes.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}",
            i + 1,
            episode_line(episode, watched.is_watched(&episode.id))
        );
        if let Some(synopsis) = episode.synopsis.as_deref().filter(|s| !s.trim().is_empty()) {
            let _ = writeln!(out, "     {}", truncate(synopsis.trim(), 160));
        }
    }
    out
}
