pub mod api;
pub mod config;
pub mod domain;
pub mod terminal;
pub mod views;
pub mod worker;
