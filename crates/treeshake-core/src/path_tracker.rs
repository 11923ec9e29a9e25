//! Object-path deoptimization tracking.
//!
//! A path describes how a value is reached from its binding: `[]` is the value
//! itself, `["a", "b"]` is `value.a.b`. Once a path is deoptimized on a Variable,
//! every query for that path, or for any path extending it, must answer
//! conservatively for the rest of the run.

use crate::latch::Latch;
use rustc_hash::FxHashSet as HashSet;
use std::cell::RefCell;
use std::fmt;

/// Paths deeper than this are never tracked individually; they escalate.
pub const MAX_PATH_DEPTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathKey {
    Named(String),
    /// A key that cannot be determined statically (`obj[expr]`).
    Unknown,
}

impl PathKey {
    pub fn named(name: impl Into<String>) -> Self {
        PathKey::Named(name.into())
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            PathKey::Named(name) => Some(name),
            PathKey::Unknown => None,
        }
    }

    /// Whether `self` (a tracked key) may denote the same property as `query`.
    fn matches(&self, query: &PathKey) -> bool {
        matches!(query, PathKey::Unknown) || self == query
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Named(name) => f.write_str(name),
            PathKey::Unknown => f.write_str("[?]"),
        }
    }
}

pub type ObjectPath = Vec<PathKey>;

pub const EMPTY_PATH: &[PathKey] = &[];
pub const UNKNOWN_PATH: &[PathKey] = &[PathKey::Unknown];

/// Whether analysis can still reason about `path` at all.
pub fn is_trackable(path: &[PathKey]) -> bool {
    path.len() <= MAX_PATH_DEPTH && !path.contains(&PathKey::Unknown)
}

pub fn display_path(path: &[PathKey]) -> String {
    if path.is_empty() {
        return "<value>".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Per-Variable record of which access paths can no longer be reasoned about.
///
/// Both the path set and the escalation flag only grow.
#[derive(Debug, Default)]
pub struct DeoptimizationTracker {
    paths: RefCell<HashSet<ObjectPath>>,
    escalated: Latch,
}

impl DeoptimizationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` as deoptimized. Returns `true` if the tracker changed.
    ///
    /// The empty path, untrackable paths and paths containing an unknown key
    /// escalate the tracker.
    pub fn deoptimize_path(&self, path: &[PathKey]) -> bool {
        if self.is_path_deoptimized(path) {
            return false;
        }
        if path.is_empty() || !is_trackable(path) {
            return self.escalate();
        }
        self.paths.borrow_mut().insert(path.to_vec())
    }

    /// Treats every path as unknown from now on.
    pub fn escalate(&self) -> bool {
        self.escalated.set()
    }

    pub fn is_escalated(&self) -> bool {
        self.escalated.is_set()
    }

    /// Whether `path`, or a prefix of it, has been deoptimized.
    ///
    /// Unknown keys in the query match any tracked key.
    pub fn is_path_deoptimized(&self, path: &[PathKey]) -> bool {
        if self.escalated.is_set() {
            return true;
        }
        let paths = self.paths.borrow();
        if is_trackable(path) {
            return (0..=path.len()).any(|len| paths.contains(&path[..len]));
        }
        if path.len() > MAX_PATH_DEPTH {
            return true;
        }
        paths.iter().any(|tracked| {
            tracked.len() <= path.len()
                && tracked.iter().zip(path).all(|(key, query)| key.matches(query))
        })
    }

    pub fn deoptimized_path_count(&self) -> usize {
        self.paths.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(keys: &[&str]) -> ObjectPath {
        keys.iter().map(|k| PathKey::named(*k)).collect()
    }

    #[test]
    fn test_fresh_tracker_knows_everything() {
        let tracker = DeoptimizationTracker::new();
        assert!(!tracker.is_path_deoptimized(EMPTY_PATH));
        assert!(!tracker.is_path_deoptimized(&path(&["a"])));
    }

    #[test]
    fn test_prefix_covers_longer_paths() {
        let tracker = DeoptimizationTracker::new();
        assert!(tracker.deoptimize_path(&path(&["a"])));

        assert!(tracker.is_path_deoptimized(&path(&["a"])));
        assert!(tracker.is_path_deoptimized(&path(&["a", "b"])));
        assert!(!tracker.is_path_deoptimized(&path(&["b"])));
        assert!(!tracker.is_path_deoptimized(EMPTY_PATH));
    }

    #[test]
    fn test_redundant_deoptimization_reports_no_change() {
        let tracker = DeoptimizationTracker::new();
        tracker.deoptimize_path(&path(&["a"]));
        assert!(!tracker.deoptimize_path(&path(&["a", "b"])));
        assert_eq!(tracker.deoptimized_path_count(), 1);
    }

    #[test]
    fn test_unknown_key_escalates() {
        let tracker = DeoptimizationTracker::new();
        assert!(tracker.deoptimize_path(UNKNOWN_PATH));
        assert!(tracker.is_escalated());
        assert!(tracker.is_path_deoptimized(&path(&["anything", "at", "all"])));
    }

    #[test]
    fn test_known_paths_never_shrink() {
        let tracker = DeoptimizationTracker::new();
        tracker.deoptimize_path(&path(&["a"]));
        assert_eq!(tracker.deoptimized_path_count(), 1);

        assert!(tracker.escalate());
        assert_eq!(tracker.deoptimized_path_count(), 1);
        assert!(!tracker.deoptimize_path(&path(&["b"])));
        assert_eq!(tracker.deoptimized_path_count(), 1);
        assert!(tracker.is_path_deoptimized(&path(&["b"])));
    }

    #[test]
    fn test_empty_path_escalates() {
        let tracker = DeoptimizationTracker::new();
        tracker.deoptimize_path(EMPTY_PATH);
        assert!(tracker.is_escalated());
    }

    #[test]
    fn test_query_with_unknown_key_matches_tracked_paths() {
        let tracker = DeoptimizationTracker::new();
        tracker.deoptimize_path(&path(&["a", "b"]));

        assert!(tracker.is_path_deoptimized(&[PathKey::Unknown, PathKey::named("b")]));
        assert!(!tracker.is_path_deoptimized(&[PathKey::Unknown, PathKey::named("c")]));
    }

    #[test]
    fn test_too_deep_paths_are_conservative() {
        let tracker = DeoptimizationTracker::new();
        let deep: ObjectPath = (0..=MAX_PATH_DEPTH).map(|i| PathKey::named(i.to_string())).collect();
        assert!(tracker.is_path_deoptimized(&deep));
        tracker.deoptimize_path(&deep);
        assert!(tracker.is_escalated());
    }

    #[test]
    fn test_display_path() {
        assert_eq!(display_path(EMPTY_PATH), "<value>");
        assert_eq!(display_path(&[PathKey::named("a"), PathKey::Unknown]), "a.[?]");
    }
}
