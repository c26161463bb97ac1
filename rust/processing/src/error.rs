// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid feature collection: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error(transparent)]
    Topology(#[from] indoor_lite_topology::Error),

    #[error(transparent)]
    Labels(#[from] indoor_lite_labels::Error),
}
