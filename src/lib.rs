pub mod app;
pub mod batch;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod evolution;
pub mod fetcher;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod record;
