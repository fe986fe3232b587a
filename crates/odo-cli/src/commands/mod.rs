pub mod common;
pub mod config;
pub mod entries;
pub mod export;
pub mod list;
pub mod sync;
