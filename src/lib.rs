pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod inbox;
pub mod models;
pub mod session;
pub mod transport;
pub mod view;
pub mod workspaces;
