// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Label text from feature tags.
//!
//! Label variants are tag names. A candidate starts at the first tag of
//! [`LABEL_TAGS`] the feature carries and falls back along that list.

use geo::{coord, Rect};
use indoor_lite_labels::{Candidate, LabelRects, MeasureError, Measured, TextMeasurer};
use indoor_lite_topology::{Feature, FeatureKey, FeatureStore};

/// Tags a label can show, in fallback order
pub const LABEL_TAGS: [&str; 3] = ["name", "ref", "amenity"];

/// First label tag present on `feature`.
pub fn label_variant(feature: &Feature) -> Option<&'static str> {
    LABEL_TAGS.iter().copied().find(|tag| feature.tag(tag).is_some())
}

fn next_variant(feature: &Feature, variant: &str) -> Option<&'static str> {
    LABEL_TAGS
        .iter()
        .copied()
        .skip_while(|tag| *tag != variant)
        .skip(1)
        .find(|tag| feature.tag(tag).is_some())
}

/// Lays out one string into label-local pixel rectangles.
pub trait TextLayout {
    fn layout(&mut self, text: &str, max_width: f64) -> Result<LabelRects, MeasureError>;
}

/// Monospaced layout with greedy character wrapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvance {
    pub advance: f64,
    pub line_height: f64,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self {
            advance: 7.0,
            line_height: 14.0,
        }
    }
}

impl TextLayout for FixedAdvance {
    fn layout(&mut self, text: &str, max_width: f64) -> Result<LabelRects, MeasureError> {
        let chars = text.trim().chars().count();
        if chars == 0 {
            return Ok(LabelRects::new());
        }
        let per_line = ((max_width / self.advance).floor() as usize).max(1);
        let lines = chars.div_ceil(per_line);
        let width = chars.min(per_line) as f64 * self.advance;

        let mut rects = LabelRects::new();
        rects.push(Rect::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: width, y: lines as f64 * self.line_height },
        ));
        Ok(rects)
    }
}

/// Measures candidates by looking up their tag text in the feature store.
pub struct TagMeasurer<'a, L: ?Sized> {
    features: &'a FeatureStore,
    layout: &'a mut L,
}

impl<'a, L: TextLayout + ?Sized> TagMeasurer<'a, L> {
    pub fn new(features: &'a FeatureStore, layout: &'a mut L) -> Self {
        Self { features, layout }
    }
}

impl<L: TextLayout + ?Sized> TextMeasurer<FeatureKey> for TagMeasurer<'_, L> {
    fn measure(
        &mut self,
        candidate: &Candidate<FeatureKey>,
        variant: &str,
        max_width: f64,
    ) -> Result<Measured, MeasureError> {
        let feature = self
            .features
            .try_get(candidate.key)
            .map_err(|e| MeasureError::new(e.to_string()))?;
        let fallback = next_variant(feature, variant).map(str::to_string);

        let Some(text) = feature.tag(variant) else {
            return Ok(Measured {
                fallback,
                ..Measured::default()
            });
        };

        Ok(Measured {
            rects: self.layout.layout(text, max_width)?,
            content: text.to_string(),
            fallback,
            allow_overflow: false,
        })
    }
}
