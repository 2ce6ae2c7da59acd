//! # SiteDesk Shared Library
//!
//! This crate contains shared types, database models, and business logic used
//! across the SiteDesk API server and supporting tools.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Identity resolution and project access control
//! - `db`: Connection pool and migration runner
//! - `notify`: In-app notification and email dispatch

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;

/// Current version of the SiteDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
