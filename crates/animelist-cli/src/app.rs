use animelist_api::kitsu::KitsuClient;
use animelist_api::traits::{AnimeRecord, CatalogService, EpisodeRecord};
use animelist_core::catalog::Catalog;
use animelist_core::config::AppConfig;
use animelist_core::error::{AnimelistError, StorageError};
use animelist_core::filter::{self, FilterState};
use animelist_core::models::PreferenceKind;
use animelist_core::storage::{FileStore, PreferenceRepo, WatchRepo, PREFERENCES_KEY};

use crate::browser;
use crate::cli::Commands;
use crate::format;

/// Loaded configuration and the two local overlays.
pub struct App {
    pub config: AppConfig,
    pub prefs: PreferenceRepo<FileStore>,
    pub watched: WatchRepo<FileStore>,
}

impl App {
    pub fn open(config: AppConfig) -> Result<Self, AnimelistError> {
        let store = FileStore::new(config.ensure_data_dir()?);
        tracing::debug!(dir = %store.dir().display(), "Opening local store");
        Ok(Self {
            prefs: PreferenceRepo::open(store.clone())?,
            watched: WatchRepo::open(store)?,
            config,
        })
    }

    pub fn client(&self) -> Result<KitsuClient, AnimelistError> {
        KitsuClient::new(&self.config.api_base_url(), self.config.request_timeout())
            .map_err(|e| AnimelistError::Api(e.to_string()))
    }
}

/// An anime with its first page of episodes.
pub struct Detail {
    pub anime: AnimeRecord,
    pub episodes: Vec<EpisodeRecord>,
}

/// Fetch the record and its episodes concurrently.
pub async fn fetch_detail<S: CatalogService>(
    service: &S,
    id: &str,
    episode_limit: u32,
) -> Result<Detail, AnimelistError> {
    let (anime, episodes) = futures::try_join!(
        service.get_anime(id),
        service.list_episodes(id, episode_limit)
    )
    .map_err(|e| AnimelistError::Api(e.to_string()))?;

    tracing::debug!(id, episodes = episodes.len(), "Anime detail loaded");
    Ok(Detail { anime, episodes })
}

pub async fn run(command: Commands, config: AppConfig) -> Result<(), AnimelistError> {
    if let Commands::Config { path, init } = command {
        return if init {
            init_config(&config)
        } else {
            show_config(&config, path)
        };
    }

    let mut app = App::open(config)?;
    match command {
        Commands::Browse => browser::run(&mut app).await,
        Commands::List {
            pages,
            search,
            favorite,
            starred,
        } => {
            list(
                &app,
                pages,
                search.as_deref().unwrap_or(""),
                FilterState { favorite, starred },
            )
            .await
        }
        Commands::Show {
            id,
            episodes,
            poster,
        } => show(&app, &id, episodes, poster).await,
        Commands::Favorite { id } => toggle_preference(&mut app, &id, PreferenceKind::Favorite),
        Commands::Star { id } => toggle_preference(&mut app, &id, PreferenceKind::Star),
        Commands::Watch { episode_id } => {
            let state = app.watched.toggle(&episode_id)?;
            println!(
                "Episode {}: {}",
                state.id,
                if state.watched { "watched" } else { "not watched" }
            );
            Ok(())
        }
        Commands::Prefs { json } => prefs(&app, json),
        Commands::Config { .. } => unreachable!("handled before opening the store"),
    }
}

async fn list(
    app: &App,
    pages: u32,
    search: &str,
    filter_state: FilterState,
) -> Result<(), AnimelistError> {
    let mut catalog = Catalog::new(app.client()?, app.config.api.page_size);

    for _ in 0..pages.max(1) {
        catalog.load_next().await;
        if let Some(e) = catalog.error() {
            return Err(AnimelistError::Api(e.to_string()));
        }
        if !catalog.has_more() {
            break;
        }
    }

    let shown = filter::apply(
        catalog.items().unwrap_or_default(),
        app.prefs.list(),
        search,
        filter_state,
    );

    print!(
        "{}",
        format::header(filter_state, search, shown.len(), catalog.len(), catalog.total())
    );
    println!();
    for (i, item) in shown.iter().enumerate() {
        println!("{}", format::card(i + 1, item));
    }
    Ok(())
}

async fn show(
    app: &App,
    id: &str,
    episodes: Option<u32>,
    poster: bool,
) -> Result<(), AnimelistError> {
    let client = app.client()?;
    let limit = episodes.unwrap_or(app.config.api.episode_limit);
    let detail = fetch_detail(&client, id, limit).await?;

    print!(
        "{}",
        format::detail(
            &detail.anime,
            app.prefs.get(id),
            &detail.episodes,
            app.watched.list()
        )
    );

    if poster {
        match detail.anime.poster_url() {
            Some(url) => {
                tracing::info!(url, "Opening poster");
                open::that(url)?;
            }
            None => println!("No poster image for {id}."),
        }
    }
    Ok(())
}

fn toggle_preference(
    app: &mut App,
    id: &str,
    kind: PreferenceKind,
) -> Result<(), AnimelistError> {
    let pref = app.prefs.toggle(id, kind)?;
    println!(
        "Anime {id}: {} {}  {} {}",
        format::heart(pref.is_favorite()),
        if pref.is_favorite() { "favorite" } else { "not favorite" },
        format::star(pref.is_starred()),
        if pref.is_starred() { "starred" } else { "not starred" },
    );
    Ok(())
}

fn prefs(app: &App, json: bool) -> Result<(), AnimelistError> {
    let list = app.prefs.list();
    if json {
        let out = serde_json::to_string_pretty(list).map_err(|source| StorageError::Serialize {
            key: PREFERENCES_KEY.to_string(),
            source,
        })?;
        println!("{out}");
        return Ok(());
    }

    if list.is_empty() {
        println!("No preferences stored yet.");
        return Ok(());
    }
    for pref in list.iter() {
        println!(
            "{:>8}  {} {}",
            pref.anime_id,
            format::heart(pref.is_favorite()),
            format::star(pref.is_starred())
        );
    }
    Ok(())
}

fn init_config(config: &AppConfig) -> Result<(), AnimelistError> {
    let path = AppConfig::config_path();
    if path.exists() {
        return Err(AnimelistError::Config(format!(
            "{} already exists",
            path.display()
        )));
    }
    let path = config.save()?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn show_config(config: &AppConfig, path_only: bool) -> Result<(), AnimelistError> {
    if path_only {
        println!("{}", AppConfig::config_path().display());
        return Ok(());
    }
    let rendered =
        toml::to_string_pretty(config).map_err(|e| AnimelistError::Config(e.to_string()))?;
    println!("# {}", AppConfig::config_path().display());
    print!("{rendered}");
    println!("# effective api url: {}", config.api_base_url());
    println!("# data dir: {}", config.data_dir().display());
    Ok(())
}
