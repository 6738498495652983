pub mod api;
pub mod canvas;
pub mod config;
pub mod delivery;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod state;
pub mod store;
