//! Interactive infinite-scroll browser.
//!
//! The list is a column of fixed-height cards. Scrolling moves a window of
//! `rows` terminal rows over it; whenever a scroll or resize leaves the
//! window at the bottom, the next catalog page is fetched.

use std::io::Write;
use std::ops::Range;

use animelist_api::traits::CatalogService;
use animelist_core::catalog::Catalog;
use animelist_core::error::AnimelistError;
use animelist_core::filter::{self, FilterState};
use animelist_core::models::{AnimeWithPreference, PreferenceKind};
use animelist_core::page_end::{PageEndDetector, Viewport};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::app::{self, App};
use crate::format::{self, CARD_ROWS};

type InputLines = Lines<BufReader<Stdin>>;

const HELP: &str = "\
Enter/j scroll down   k scroll up   /TEXT search (/ clears)
f favorite filter     s starred filter
fav N  toggle favorite   star N  toggle star   open N  details
rows N viewport height   r retry   q quit";

const DETAIL_HELP: &str = "f favorite   s star   w N toggle episode watched   b back";

// ── Input ─────────────────────────────────────────────────────────

/// One line of input in the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    ScrollDown,
    ScrollUp,
    Search(String),
    ToggleFavoriteFilter,
    ToggleStarredFilter,
    Favorite(usize),
    Star(usize),
    Open(usize),
    Resize(u32),
    Retry,
    Help,
    Quit,
}

/// One line of input in the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailInput {
    ToggleFavorite,
    ToggleStar,
    Watch(usize),
    Help,
    Back,
}

/// Parse a 1-based card or episode number.
fn parse_number(s: &str) -> Result<usize, String> {
    s.parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| format!("not a valid number: {s}"))
}

pub fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix('/') {
        return Ok(Input::Search(text.trim().to_string()));
    }

    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments: {line}"));
    }

    match (cmd, arg) {
        ("" | "j", None) => Ok(Input::ScrollDown),
        ("k", None) => Ok(Input::ScrollUp),
        ("f", None) => Ok(Input::ToggleFavoriteFilter),
        ("s", None) => Ok(Input::ToggleStarredFilter),
        ("fav", Some(n)) => parse_number(n).map(Input::Favorite),
        ("star", Some(n)) => parse_number(n).map(Input::Star),
        ("open" | "o", Some(n)) => parse_number(n).map(Input::Open),
        ("rows", Some(n)) => parse_number(n).and_then(|n| {
            u32::try_from(n)
                .map(Input::Resize)
                .map_err(|_| format!("too many rows: {n}"))
        }),
        ("r", None) => Ok(Input::Retry),
        ("?" | "h" | "help", None) => Ok(Input::Help),
        ("q" | "quit", None) => Ok(Input::Quit),
        _ => Err(format!("unknown command: {line} (? for help)")),
    }
}

pub fn parse_detail_input(line: &str) -> Result<DetailInput, String> {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    match (parts.next().unwrap_or(""), parts.next(), parts.next()) {
        ("f", None, None) => Ok(DetailInput::ToggleFavorite),
        ("s", None, None) => Ok(DetailInput::ToggleStar),
        ("w", Some(n), None) => parse_number(n).map(DetailInput::Watch),
        ("?" | "h" | "help", None, None) => Ok(DetailInput::Help),
        ("b" | "q" | "back", None, None) => Ok(DetailInput::Back),
        _ => Err(format!("unknown command: {line} (? for help)")),
    }
}

// ── State ─────────────────────────────────────────────────────────

/// Search, filter, and scroll position of the list view.
pub struct BrowserState {
    pub search: String,
    pub filter: FilterState,
    scroll_top: u32,
    rows: u32,
    detector: PageEndDetector,
}

impl BrowserState {
    pub fn new(rows: u32) -> Self {
        Self {
            search: String::new(),
            filter: FilterState::default(),
            scroll_top: 0,
            rows: rows.max(1),
            detector: PageEndDetector::new(),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn viewport(&self, shown: usize) -> Viewport {
        Viewport {
            scroll_top: self.scroll_top,
            client_height: self.rows,
            scroll_height: (shown as u32).saturating_mul(CARD_ROWS),
        }
    }

    /// Scroll one window down. Returns whether the next page should load.
    pub fn scroll_down(&mut self, shown: usize) -> bool {
        let max = self.viewport(shown).max_scroll_top();
        self.scroll_top = self.scroll_top.saturating_add(self.rows).min(max);
        self.detector.on_scroll(self.viewport(shown))
    }

    /// Scroll one window up. Returns whether the next page should load.
    pub fn scroll_up(&mut self, shown: usize) -> bool {
        self.scroll_top = self.scroll_top.saturating_sub(self.rows);
        self.detector.on_scroll(self.viewport(shown))
    }

    /// Change the window height. Returns whether the next page should load.
    pub fn resize(&mut self, rows: u32, shown: usize) -> bool {
        self.rows = rows.max(1);
        self.clamp(shown);
        self.detector.on_resize(self.viewport(shown))
    }

    /// Re-observe the window once a page has landed. Fires only when the
    /// page added visible cards and the window is still not filled.
    pub fn after_load(&mut self, shown_before: usize, shown_after: usize) -> bool {
        shown_after > shown_before && self.detector.on_resize(self.viewport(shown_after))
    }

    pub fn set_search(&mut self, text: String) {
        self.search = text;
        self.scroll_top = 0;
    }

    pub fn toggle_favorite_filter(&mut self) {
        self.filter.toggle_favorite();
        self.scroll_top = 0;
    }

    pub fn toggle_starred_filter(&mut self) {
        self.filter.toggle_starred();
        self.scroll_top = 0;
    }

    /// Keep the window inside the list after it shrinks.
    pub fn clamp(&mut self, shown: usize) {
        self.scroll_top = self.scroll_top.min(self.viewport(shown).max_scroll_top());
    }

    /// Indices of the cards at least partly inside the window.
    pub fn visible(&self, shown: usize) -> Range<usize> {
        let start = (self.scroll_top / CARD_ROWS) as usize;
        let end = (self.scroll_top + self.rows).div_ceil(CARD_ROWS) as usize;
        start.min(shown)..end.min(shown)
    }

    fn fetching(&mut self, active: bool) {
        self.detector.set_suspended(active);
    }
}

// ── Loop ──────────────────────────────────────────────────────────

fn prompt() -> Result<(), AnimelistError> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn render_list<S: CatalogService>(
    state: &BrowserState,
    catalog: &Catalog<S>,
    shown: &[AnimeWithPreference],
    notice: Option<&str>,
) {
    println!();
    print!(
        "{}",
        format::header(
            state.filter,
            &state.search,
            shown.len(),
            catalog.len(),
            catalog.total()
        )
    );
    println!();

    let range = state.visible(shown.len());
    for (i, item) in shown.iter().enumerate().skip(range.start).take(range.len()) {
        println!("{}", format::card(i + 1, item));
    }

    if shown.is_empty() && catalog.items().is_some() {
        println!("No anime match the current search and filters.");
    }
    if let Some(e) = catalog.error() {
        println!("Error loading anime: {e} (r to retry)");
    } else if !catalog.has_more() {
        println!("End of catalog.");
    } else if range.end == shown.len() && !shown.is_empty() {
        println!("Scroll down to load more.");
    }
    if let Some(notice) = notice {
        println!("{notice}");
    }
}

fn shown_items<S: CatalogService>(
    app: &App,
    state: &BrowserState,
    catalog: &Catalog<S>,
) -> Vec<AnimeWithPreference> {
    filter::apply(
        catalog.items().unwrap_or_default(),
        app.prefs.list(),
        &state.search,
        state.filter,
    )
}

/// Toggle a preference on the `n`-th shown card and describe the result.
fn toggle_card(
    app: &mut App,
    shown: &[AnimeWithPreference],
    n: usize,
    kind: PreferenceKind,
) -> String {
    let Some(item) = shown.get(n - 1) else {
        return format!("no card {n}");
    };
    match app.prefs.toggle(&item.anime.id, kind) {
        Ok(pref) => format!(
            "{}: {} {}",
            item.anime.display_title(),
            kind,
            if pref.flag(kind) { "on" } else { "off" }
        ),
        Err(e) => e.to_string(),
    }
}

/// Run the interactive list view until the user quits or input ends.
pub async fn run(app: &mut App) -> Result<(), AnimelistError> {
    let client = app.client()?;
    let mut catalog = Catalog::new(client, app.config.api.page_size);
    let mut state = BrowserState::new(app.config.browser.viewport_rows);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // The first render counts as a resize, so an empty list loads page one.
    let mut wants_more = state.resize(state.rows(), 0);
    let mut notice: Option<String> = None;

    loop {
        let mut shown_before = None;
        if wants_more {
            if let Some(request) = catalog.start_load() {
                shown_before = Some(shown_items(app, &state, &catalog).len());
                if catalog.is_loading() {
                    println!("Loading...");
                }
                state.fetching(true);
                let result = catalog
                    .service()
                    .list_anime(request.offset, request.limit)
                    .await;
                catalog.finish_load(request, result);
                state.fetching(false);
            }
        }
        wants_more = false;

        let shown = shown_items(app, &state, &catalog);
        state.clamp(shown.len());

        // A page too short to fill the window pulls the next one.
        if let Some(before) = shown_before {
            if state.after_load(before, shown.len()) && catalog.has_more() {
                wants_more = true;
                continue;
            }
        }

        render_list(&state, &catalog, &shown, notice.take().as_deref());
        prompt()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(msg) => {
                notice = Some(msg);
                continue;
            }
        };

        match input {
            Input::Quit => break,
            Input::ScrollDown => wants_more = state.scroll_down(shown.len()),
            Input::ScrollUp => wants_more = state.scroll_up(shown.len()),
            Input::Resize(rows) => wants_more = state.resize(rows, shown.len()),
            Input::Search(text) => state.set_search(text),
            Input::ToggleFavoriteFilter => state.toggle_favorite_filter(),
            Input::ToggleStarredFilter => state.toggle_starred_filter(),
            Input::Retry => wants_more = true,
            Input::Help => notice = Some(HELP.to_string()),
            Input::Favorite(n) => {
                notice = Some(toggle_card(app, &shown, n, PreferenceKind::Favorite));
            }
            Input::Star(n) => {
                notice = Some(toggle_card(app, &shown, n, PreferenceKind::Star));
            }
            Input::Open(n) => match shown.get(n - 1) {
                Some(item) => {
                    detail_view(app, catalog.service(), &item.anime.id, &mut lines).await?;
                }
                None => notice = Some(format!("no card {n}")),
            },
        }
    }

    Ok(())
}

/// Detail view with preference and episode toggles; returns on `b`.
async fn detail_view<S: CatalogService>(
    app: &mut App,
    service: &S,
    id: &str,
    lines: &mut InputLines,
) -> Result<(), AnimelistError> {
    println!("Loading...");
    let detail = match app::fetch_detail(service, id, app.config.api.episode_limit).await {
        Ok(detail) => detail,
        Err(e) => {
            println!("Error loading anime {id}: {e}");
            return Ok(());
        }
    };

    let mut notice: Option<String> = None;
    loop {
        println!();
        print!(
            "{}",
            format::detail(
                &detail.anime,
                app.prefs.get(id),
                &detail.episodes,
                app.watched.list()
            )
        );
        if let Some(n) = notice.take() {
            println!("{n}");
        }
        prompt()?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        match parse_detail_input(&line) {
            Ok(DetailInput::Back) => return Ok(()),
            Ok(DetailInput::Help) => notice = Some(DETAIL_HELP.to_string()),
            Ok(DetailInput::ToggleFavorite) => {
                if let Err(e) = app.prefs.toggle(id, PreferenceKind::Favorite) {
                    notice = Some(e.to_string());
                }
            }
            Ok(DetailInput::ToggleStar) => {
                if let Err(e) = app.prefs.toggle(id, PreferenceKind::Star) {
                    notice = Some(e.to_string());
                }
            }
            Ok(DetailInput::Watch(n)) => match detail.episodes.get(n - 1) {
                Some(episode) => {
                    if let Err(e) = app.watched.toggle(&episode.id) {
                        notice = Some(e.to_string());
                    }
                }
                None => notice = Some(format!("no episode {n}")),
            },
            Err(msg) => notice = Some(msg),
        }
    }
}
