pub mod config;
pub mod contract;
pub mod core_service;
pub mod extractor;
pub mod freq_store;
pub mod logging;
pub mod merger;
pub mod model;
pub mod open_url;
pub mod presenter;
pub mod runtime;
pub mod search;
pub mod transport;
