pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod humanize;
pub mod observability;
pub mod overlay;
pub mod validation;
