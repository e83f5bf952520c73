pub mod config;
pub mod error;
pub mod export;
pub mod fallback;
pub mod fixtures;
pub mod http_client;
pub mod odds;
pub mod pipeline;
pub mod rows;
pub mod teams;
pub mod timestamps;
