pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod page_end;
pub mod preferences;
pub mod storage;
