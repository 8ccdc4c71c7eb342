//! # Scholarr Common Library
//!
//! Shared code for the Scholarr acquisition agent:
//! - Domain models (quality ladder, profiles, authors, works, releases)
//! - Canonical text cleaning for catalog matching
//! - Error types
//! - Configuration loading

pub mod clean;
pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
