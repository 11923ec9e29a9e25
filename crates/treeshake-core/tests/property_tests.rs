//! Property-based tests for the deoptimization tracker and the splice buffer
//!
//! These check the monotonicity and composition rules the analysis relies on
//! across randomly generated paths and edits.

use proptest::prelude::*;
use treeshake_core::path_tracker::{DeoptimizationTracker, ObjectPath, PathKey, MAX_PATH_DEPTH};
use treeshake_core::render::SpliceBuffer;
use treeshake_test_helpers::shake;

fn key_strategy() -> impl Strategy<Value = PathKey> {
    prop_oneof![
        8 => "[a-d]".prop_map(PathKey::Named),
        1 => Just(PathKey::Unknown),
    ]
}

fn path_strategy() -> impl Strategy<Value = ObjectPath> {
    prop::collection::vec(key_strategy(), 0..=MAX_PATH_DEPTH + 1)
}

proptest! {
    #[test]
    fn test_deoptimized_paths_stay_deoptimized(
        paths in prop::collection::vec(path_strategy(), 1..12),
        queries in prop::collection::vec(path_strategy(), 1..12),
    ) {
        let tracker = DeoptimizationTracker::new();
        for (index, path) in paths.iter().enumerate() {
            let before: Vec<bool> = queries.iter().map(|q| tracker.is_path_deoptimized(q)).collect();
            tracker.deoptimize_path(path);
            prop_assert!(tracker.is_path_deoptimized(path), "path {} not deoptimized", index);
            for (query, was_deoptimized) in queries.iter().zip(before) {
                if was_deoptimized {
                    prop_assert!(tracker.is_path_deoptimized(query));
                }
            }
        }
    }

    #[test]
    fn test_extensions_of_deoptimized_paths(
        base in prop::collection::vec("[a-d]".prop_map(PathKey::Named), 0..4),
        suffix in prop::collection::vec(key_strategy(), 0..3),
    ) {
        let tracker = DeoptimizationTracker::new();
        tracker.deoptimize_path(&base);
        let mut extended = base.clone();
        extended.extend(suffix);
        prop_assert!(tracker.is_path_deoptimized(&extended));
    }

    #[test]
    fn test_redundant_deoptimization_is_not_a_change(path in path_strategy()) {
        let tracker = DeoptimizationTracker::new();
        tracker.deoptimize_path(&path);
        prop_assert!(!tracker.deoptimize_path(&path));
    }

    #[test]
    fn test_removals_compose_in_order(
        source in "[a-z ]{1,40}",
        cuts in prop::collection::vec((0usize..40, 0usize..6), 0..6),
    ) {
        let len = source.len();
        let mut buffer = SpliceBuffer::new(&source);
        let mut removed = vec![false; len];
        for (start, width) in cuts {
            let start = start.min(len);
            let end = (start + width).min(len);
            let overlaps = removed[start..end].iter().any(|r| *r);
            let result = buffer.remove(start as u32, end as u32);
            if overlaps {
                prop_assert!(result.is_err());
            } else {
                prop_assert!(result.is_ok());
                removed[start..end].iter_mut().for_each(|r| *r = true);
            }
        }
        let expected: String = source
            .chars()
            .zip(&removed)
            .filter(|(_, r)| !**r)
            .map(|(c, _)| c)
            .collect();
        let rendered = buffer.finish();
        prop_assert_eq!(&rendered.code, &expected);

        // every kept character maps back to itself
        for (generated, c) in rendered.code.char_indices() {
            let original = rendered.positions.original_offset(generated as u32);
            prop_assert!(original.is_some());
            let original = original.unwrap_or_default() as usize;
            prop_assert_eq!(source.as_bytes()[original], c as u8);
        }
    }

    #[test]
    fn test_unused_constants_never_survive(
        names in prop::collection::hash_set("[a-z]{3,8}", 1..6),
    ) {
        let source: String = names
            .iter()
            .map(|name| format!("const v_{name} = {};\n", name.len()))
            .collect();
        prop_assert_eq!(shake(&source).unwrap(), "");
    }
}
