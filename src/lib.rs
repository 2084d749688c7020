//! Export the asset inventory of a Cloudinary account to CSV.
//!
//! The crate pages through the Admin API search endpoint, flattens every
//! asset into one row and streams the rows into a CSV file.
//!
//! # Modules
//!
//! - `cloudinary`: Admin API client and the `SearchApi` / `MetadataApi` traits
//! - `configuration`: stored credentials and connection settings
//! - `export`: the pagination driver
//! - `format`: the CSV sink
//! - `metadata`: metadata field resolution and value label lookup
//! - `model`: data models for assets, metadata fields and export settings
//! - `record`: flattening of one asset into a row
//! - `commands`, `actions`, `cli`, `prompts`: the command line surface

pub mod actions;
pub mod cli;
pub mod cloudinary;
pub mod commands;
pub mod configuration;
pub mod error;
pub mod error_utils;
pub mod exit_codes;
pub mod export;
pub mod format;
pub mod http_utils;
pub mod metadata;
pub mod model;
pub mod prompts;
pub mod record;
