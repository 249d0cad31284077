//! Error types for scene composition

use thiserror::Error;

/// Errors raised while turning static configuration into visual entities.
///
/// Per-frame updates never fail; only parsing of configured values can.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackdropError {
    #[error("invalid color '{0}': expected #rrggbb or #rgb")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, BackdropError>;
