pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod numbering;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
pub mod totals;
