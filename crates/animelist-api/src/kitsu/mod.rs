pub mod client;
pub mod error;
pub mod types;

pub use client::{KitsuClient, DEFAULT_BASE_URL};
pub use error::KitsuError;
