//! Rank progress tracking: coefficient scoring, group standings, persistence
//! and JSON / spreadsheet interchange.

pub mod config;
pub mod db;
pub mod error;
pub mod locale;
pub mod models;
pub mod persistence;
pub mod scoring;
pub mod store;
pub mod tracker;
pub mod transcode;
