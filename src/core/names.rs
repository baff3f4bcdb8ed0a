//! Target name comparison
//!
//! Case-insensitive mode is ordinal: equal length, then every character pair
//! compared after uppercasing both. No locale, no full Unicode case folding.

use std::ffi::OsStr;

/// Compare two names, literally or ignoring case
pub fn names_equal(entry_name: &str, target: &str, ignore_case: bool) -> bool {
    if ignore_case {
        ignore_case_equal(entry_name, target)
    } else {
        entry_name == target
    }
}

fn ignore_case_equal(a: &str, b: &str) -> bool {
    if a.chars().count() != b.chars().count() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(x, y)| x == y || x.to_uppercase().eq(y.to_uppercase()))
}

/// Matches directory entry names against the target set of one search
#[derive(Debug, Clone)]
pub struct NameMatcher<'a> {
    targets: &'a [String],
    ignore_case: bool,
}

impl<'a> NameMatcher<'a> {
    pub fn new(targets: &'a [String], ignore_case: bool) -> Self {
        Self {
            targets,
            ignore_case,
        }
    }

    /// True when there is nothing to look for
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Every target the entry name matches, in target order.
    ///
    /// Duplicate targets yield duplicate matches.
    pub fn matches<'n>(&'n self, entry_name: &'n OsStr) -> impl Iterator<Item = &'a str> + 'n {
        let targets: &'a [String] = self.targets;
        let ignore_case = self.ignore_case;
        // Targets are UTF-8, so a name that is not never matches
        let name = entry_name.to_str();
        targets.iter().filter_map(move |target| {
            let hit = name.is_some_and(|name| names_equal(name, target, ignore_case));
            hit.then_some(target.as_str())
        })
    }
}
