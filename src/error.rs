// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error kinds reported by the CSG engine

use thiserror::Error;

/// Failures surfaced by solid construction and boolean operations
#[derive(Debug, Error)]
pub enum CsgError {
    /// The caller supplied a bad primitive, face or array
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant was broken; indicates a logic bug
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Two valid solids could not be combined
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CsgError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn illegal(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry(message.into())
    }

    /// True for failures caused by input that cannot be combined, as opposed to bad arguments
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateGeometry(_))
    }
}

pub type Result<T> = std::result::Result<T, CsgError>;
