//! Error types for the FacetHaus crate
//!
//! This module contains all error types that can be returned by FacetHaus
//! operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FacetHausError {
    #[error("data access error: {0}")]
    Facet(#[from] facet_store::FacetError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
