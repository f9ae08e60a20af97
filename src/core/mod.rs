//! Core routing engine module

pub mod adapter;
pub mod cache;
pub mod config;
pub mod errors;
pub mod language;
pub mod models;
pub mod registry;
pub mod router;
