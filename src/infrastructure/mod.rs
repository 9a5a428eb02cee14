pub mod auth;
pub mod config;
pub mod listings;
pub mod logging;
pub mod storage;
