//! Match history, champion aggregation and live game estimates for League of
//! Legends players, backed by the Riot API.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod identity;
pub mod live;
pub mod logging;
pub mod prompt;
pub mod region;
