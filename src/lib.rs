pub mod calendar;
pub mod config;
pub mod error;
pub mod store;
pub mod utils;
pub mod web;
