// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Level-range parsing.
//!
//! A `level` value is a semicolon-separated list of `N` or `N-M` tokens,
//! e.g. `"0"`, `"-1;2"`, `"0-3"`, `"-2--1"`. Every integer inside the closed
//! interval `[min(N, M), max(N, M)]` is a member level. Malformed tokens are
//! logged and skipped; they never fail the whole value.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::feature::Tags;

/// Tags whose values are level lists
pub const LEVEL_TAGS: [&str; 2] = ["level", "repeat_on"];

/// Ranges wider than this are treated as malformed, so one bad tag cannot
/// route a feature into millions of levels
pub const MAX_LEVEL_SPAN: f64 = 500.0;

const LEVEL_RANGE: std::ops::RangeInclusive<f64> = (i32::MIN as f64)..=(i32::MAX as f64);

/// Parse one `N` or `N-M` token into its numeric bounds, in tag order.
pub fn parse_token(token: &str) -> Result<(f64, f64)> {
    let malformed = || Error::MalformedLevel {
        value: token.to_string(),
        token: token.to_string(),
    };

    let token = token.trim();
    // A leading '-' is a sign, the first later '-' separates the bounds
    let split = token
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i);

    let (from, to) = match split {
        Some(i) => (&token[..i], &token[i + 1..]),
        None => (token, token),
    };

    let from: f64 = from.trim().parse().map_err(|_| malformed())?;
    let to: f64 = to.trim().parse().map_err(|_| malformed())?;
    if !LEVEL_RANGE.contains(&from)
        || !LEVEL_RANGE.contains(&to)
        || (to - from).abs() > MAX_LEVEL_SPAN
    {
        return Err(malformed());
    }

    Ok((from, to))
}

/// Parse a full level value into its member levels.
///
/// Returns the parsed levels plus one error per skipped token.
pub fn parse_levels(value: &str) -> (BTreeSet<i32>, Vec<Error>) {
    let mut levels = BTreeSet::new();
    let mut errors = Vec::new();

    for token in value.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_token(token) {
            Ok((from, to)) => {
                let lo = from.min(to).ceil() as i32;
                let hi = from.max(to).floor() as i32;
                levels.extend(lo..=hi);
            }
            Err(Error::MalformedLevel { token, .. }) => errors.push(Error::MalformedLevel {
                value: value.to_string(),
                token,
            }),
            Err(other) => errors.push(other),
        }
    }

    (levels, errors)
}

/// All levels a feature belongs to, from its `level` and `repeat_on` tags.
///
/// Malformed tokens are logged at warn level and contribute nothing.
pub fn feature_levels(tags: &Tags) -> BTreeSet<i32> {
    let mut levels = BTreeSet::new();
    for key in LEVEL_TAGS {
        let Some(value) = tags.get(key) else {
            continue;
        };
        let (parsed, errors) = parse_levels(value);
        for error in errors {
            tracing::warn!(tag = key, %error, "Skipping malformed level token");
        }
        levels.extend(parsed);
    }
    levels
}

/// Returns `true` if the feature carries any level tag, parseable or not.
pub fn has_level_tag(tags: &Tags) -> bool {
    LEVEL_TAGS.iter().any(|k| tags.contains_key(*k))
}
