pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod content;
pub mod models;
pub mod render;
