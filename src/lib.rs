pub mod config;
pub mod download;
pub mod error;
pub mod events;
pub mod games;
pub mod highlight;
pub mod http_client;
pub mod identity;
pub mod mux;
pub mod pipeline;
pub mod stats_api;
pub mod video;
