// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based storage.
//!
//! Features and levels each get a unique, type-safe key for O(1) lookup.
//! Keys are created by `slotmap::SlotMap` and remain valid even after other
//! entries are removed (generational indices), so a key never silently
//! aliases a newer entry.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a tagged feature in the [`FeatureStore`](crate::FeatureStore).
    pub struct FeatureKey;

    /// Key for a level (one spatial cluster at one level number).
    pub struct LevelKey;
}

/// Stable `u64` form of a feature key, for caches living outside this crate.
pub fn feature_id(key: FeatureKey) -> u64 {
    slotmap::Key::data(&key).as_ffi()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn feature_ids_are_distinct_and_stable() {
        let mut map: SlotMap<FeatureKey, u8> = SlotMap::with_key();
        let a = map.insert(1);
        let b = map.insert(2);

        assert_ne!(feature_id(a), feature_id(b));
        assert_eq!(feature_id(a), feature_id(a));
    }

    #[test]
    fn removed_keys_are_not_reused() {
        let mut map: SlotMap<FeatureKey, u8> = SlotMap::with_key();
        let a = map.insert(1);
        map.remove(a);
        let b = map.insert(2);

        assert_ne!(a, b);
        assert!(!map.contains_key(a));
    }
}
