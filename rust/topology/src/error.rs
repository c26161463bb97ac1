// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology operations.
//!
//! None of these abort a pass: callers log them and move on to the next
//! feature or level.

use crate::keys::{FeatureKey, LevelKey};

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A feature key was not found in the store.
    #[error("feature not found: {0:?}")]
    FeatureNotFound(FeatureKey),

    /// A level key was not found in the engine.
    #[error("level not found: {0:?}")]
    LevelNotFound(LevelKey),

    /// A token of a `level` / `repeat_on` tag could not be parsed.
    #[error("malformed level token {token:?} in {value:?}")]
    MalformedLevel { value: String, token: String },

    /// A feature's geometry does not suit the derivation step it was tagged for.
    #[error("{role} feature {key:?} has unsupported geometry: {geometry}")]
    GeometryMismatch {
        key: FeatureKey,
        role: &'static str,
        geometry: &'static str,
    },

    /// Geometry kernel error.
    #[error("geometry error: {0}")]
    Geometry(#[from] indoor_lite_geometry::Error),
}
