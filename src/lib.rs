pub mod config;
pub mod fetcher;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod provider;
pub mod standings;
pub mod storage;
pub mod utils;
