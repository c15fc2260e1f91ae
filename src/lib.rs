pub mod api;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod live;
pub mod models;
pub mod notify;
pub mod observability;
pub mod orders;
pub mod phone;
pub mod state;
pub mod store;
