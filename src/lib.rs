pub mod api;
pub mod config;
pub mod error;
pub mod output;
pub mod ranking;
pub mod record;
pub mod scoring;
pub mod store;
pub mod upload;
pub mod validate;
