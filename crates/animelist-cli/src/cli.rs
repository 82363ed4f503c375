use clap::{Parser, Subcommand};

/// animelist - browse the Kitsu anime catalog from the terminal
/// with local favorites, stars, and episode watch tracking.
#[derive(Parser)]
#[command(name = "animelist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Also log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive infinite-scroll browser (default)
    #[command(alias = "b")]
    Browse,

    /// Print loaded anime as cards
    #[command(alias = "ls")]
    List {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Case-insensitive substring of the romaji title
        #[arg(short, long)]
        search: Option<String>,

        /// Only favorites
        #[arg(long)]
        favorite: bool,

        /// Only starred
        #[arg(long)]
        starred: bool,
    },

    /// Show an anime with its episodes
    #[command(alias = "s")]
    Show {
        /// Anime ID
        id: String,

        /// Number of episodes to list (defaults to api.episode_limit)
        #[arg(short, long)]
        episodes: Option<u32>,

        /// Open the poster image in the browser
        #[arg(long)]
        poster: bool,
    },

    /// Toggle the favorite flag of an anime
    #[command(alias = "fav")]
    Favorite {
        /// Anime ID
        id: String,
    },

    /// Toggle the starred flag of an anime
    Star {
        /// Anime ID
        id: String,
    },

    /// Toggle the watched flag of an episode
    #[command(alias = "w")]
    Watch {
        /// Episode ID
        episode_id: String,
    },

    /// List stored preferences
    Prefs {
        /// Print the stored JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Print only the config file path
        #[arg(long, conflicts_with = "init")]
        path: bool,

        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}
