// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a [`TextMeasurer`](crate::TextMeasurer) for one
/// candidate. It only ever skips that candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct MeasureError(pub String);

impl MeasureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The frame cannot map pixels to map units.
    #[error("invalid frame: zoom {zoom}, {pixels_per_unit} px per unit")]
    InvalidFrame { zoom: f64, pixels_per_unit: f64 },

    /// Measuring a candidate failed.
    #[error("label measurement failed: {0}")]
    Measure(#[from] MeasureError),
}
