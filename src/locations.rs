// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glow-shader`.
//
// `glow-shader` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glow-shader` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glow-shader`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! Uniform location caching and the missing-uniform policy.

use crate::Error;

use ahash::RandomState;
use hashbrown::HashMap;

/// Uniform locations of one link of a program.
///
/// `None` entries mark names that are known to be missing, so each one is warned about once.
pub(crate) struct UniformCache<L> {
    locations: HashMap<String, Option<L>, RandomState>,

    /// Whether a lookup on the unlinked program has been warned about.
    warned_unlinked: bool,
}

impl<L: Clone> UniformCache<L> {
    pub(crate) fn new() -> Self {
        Self {
            locations: HashMap::with_hasher(RandomState::new()),
            warned_unlinked: false,
        }
    }

    /// Forget everything; called on every link.
    pub(crate) fn clear(&mut self) {
        self.locations.clear();
        self.warned_unlinked = false;
    }

    /// Resolve `name`, calling `lookup` only on a cache miss with a non-empty name.
    ///
    /// Missing uniforms are `Ok(None)` unless `strict` is set.
    pub(crate) fn resolve(
        &mut self,
        name: &str,
        linked: bool,
        strict: bool,
        lookup: impl FnOnce(&str) -> Option<L>,
    ) -> Result<Option<L>, Error> {
        if !linked {
            if !self.warned_unlinked {
                tracing::warn!(uniform = name, "uniform lookup on an unlinked program");
                self.warned_unlinked = true;
            }

            return if strict { Err(Error::NotLinked) } else { Ok(None) };
        }

        let location = match self.locations.get(name) {
            Some(location) => location.clone(),
            None => {
                let location = if name.is_empty() { None } else { lookup(name) };

                if location.is_none() {
                    tracing::warn!("The uniform '{}' does not exist or is never used", name);
                }

                self.locations.insert(name.to_owned(), location.clone());
                location
            }
        };

        match location {
            None if strict => Err(Error::MissingUniform(name.to_owned())),
            location => Ok(location),
        }
    }

    #[cfg(test)]
    fn is_cached(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    fn lookup<'a>(calls: &'a Cell<usize>) -> impl FnOnce(&str) -> Option<u32> + 'a {
        move |name| {
            calls.set(calls.get() + 1);
            match name {
                "uRoughness" => Some(3),
                "uEnvironmentMap" => Some(7),
                _ => None,
            }
        }
    }

    #[test]
    fn found_locations_are_cached() {
        let calls = Cell::new(0);
        let mut cache = UniformCache::new();

        assert_eq!(cache.resolve("uRoughness", true, false, lookup(&calls)).unwrap(), Some(3));
        assert_eq!(cache.resolve("uRoughness", true, false, lookup(&calls)).unwrap(), Some(3));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn missing_uniform_is_looked_up_once() {
        let calls = Cell::new(0);
        let mut cache = UniformCache::new();

        for _ in 0..3 {
            assert_eq!(cache.resolve("uUnused", true, false, lookup(&calls)).unwrap(), None);
        }
        assert_eq!(calls.get(), 1);
        assert!(cache.is_cached("uUnused"));
    }

    #[test]
    fn empty_name_is_missing_without_lookup() {
        let calls = Cell::new(0);
        let mut cache = UniformCache::new();

        assert_eq!(cache.resolve("", true, false, lookup(&calls)).unwrap(), None);
        assert!(matches!(
            cache.resolve("", true, true, lookup(&calls)),
            Err(Error::MissingUniform(ref name)) if name.is_empty()
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn strict_mode_reports_missing_uniforms() {
        let calls = Cell::new(0);
        let mut cache = UniformCache::new();

        assert!(matches!(
            cache.resolve("uUnused", true, true, lookup(&calls)),
            Err(Error::MissingUniform(ref name)) if name == "uUnused"
        ));
        assert_eq!(
            cache.resolve("uEnvironmentMap", true, true, lookup(&calls)).unwrap(),
            Some(7)
        );
    }

    #[test]
    fn unlinked_program() {
        let calls = Cell::new(0);
        let mut cache = UniformCache::new();

        assert_eq!(cache.resolve("uRoughness", false, false, lookup(&calls)).unwrap(), None);
        assert!(cache.warned_unlinked);
        assert_eq!(cache.resolve("uRoughness", false, false, lookup(&calls)).unwrap(), None);
        assert!(matches!(
            cache.resolve("uRoughness", false, true, lookup(&calls)),
            Err(Error::NotLinked)
        ));
        assert_eq!(calls.get(), 0);
        assert!(!cache.is_cached("uRoughness"));
    }

    #[test]
    fn clear_forgets_the_previous_link() {
        let calls = Cell::new(0);
        let mut cache = UniformCache::new();

        cache.resolve("uUnused", true, false, lookup(&calls)).unwrap();
        cache.resolve("uRoughness", false, false, lookup(&calls)).unwrap();
        cache.clear();

        assert!(!cache.is_cached("uUnused"));
        assert!(!cache.warned_unlinked);
        cache.resolve("uUnused", true, false, lookup(&calls)).unwrap();
        assert_eq!(calls.get(), 2);
    }
}
