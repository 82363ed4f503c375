pub mod kitsu;
pub mod traits;
