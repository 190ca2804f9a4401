//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`BakeError`] covers the conditions under which a binder
//! refuses to publish:
//! - Configuration errors (point count too small, missing host bindings)
//! - An absent curve source at publish time
//! - Settings parsing errors
//!
//! None of these are fatal. A binder that returns an error simply skips the
//! current tick and is re-checked on the next one.
//!
//! # Usage
//!
//! Fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, BakeError>`.
//!
//! ```rust,ignore
//! use vfx_path::errors::{BakeError, Result};
//!
//! fn publish() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::host::PropertyKind;

/// The main error type for path baking.
#[derive(Error, Debug)]
pub enum BakeError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// The configured point count cannot describe a path.
    #[error("Point count must be at least 2 (got {point_count})")]
    PointCountTooSmall {
        /// The rejected point count
        point_count: usize,
    },

    /// The host does not declare a binding the binder requires.
    #[error("Host does not declare {kind:?} property '{name}'")]
    MissingBinding {
        /// Expected property type
        kind: PropertyKind,
        /// Binding name that was looked up
        name: String,
    },

    /// The curve source is absent (no curve, empty chain, zero length).
    #[error("Curve source '{source_kind}' has no curve to bake")]
    SourceUnavailable {
        /// Human-readable source variant
        source_kind: &'static str,
    },

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// Binder settings could not be parsed.
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl BakeError {
    /// Returns `true` for errors that mean "the binder is not valid this tick".
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, BakeError::Settings(_))
    }
}

/// Alias for `Result<T, BakeError>`.
pub type Result<T> = std::result::Result<T, BakeError>;
