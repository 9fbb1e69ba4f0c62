use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use nearwait::manifest::{self, Manifest, PathStyle};
use nearwait::paths::Normalizer;
use nearwait::{pack, reconcile, FileEntry};
use proptest::prelude::*;

// Property-based test strategies
prop_compose! {
    fn arb_rel_path()(segments in prop::collection::vec("[a-z0-9_]{1,8}", 1..4)) -> String {
        segments.join("/")
    }
}

prop_compose! {
    fn arb_paths()(names in prop::collection::btree_set(arb_rel_path(), 0..20)) -> BTreeSet<PathBuf> {
        names.into_iter().map(|n| Path::new("/proj").join(n)).collect()
    }
}

prop_compose! {
    fn arb_manifest()(entries in prop::collection::btree_map(arb_rel_path(), any::<bool>(), 0..20)) -> Manifest {
        let mut manifest = Manifest::new();
        for (name, disabled) in entries {
            manifest.insert(Path::new("/proj").join(name), disabled);
        }
        manifest
    }
}

prop_compose! {
    fn arb_entries()(sizes in prop::collection::vec(0u64..5000, 0..40)) -> Vec<FileEntry> {
        sizes
            .into_iter()
            .enumerate()
            .map(|(i, size)| FileEntry::new(format!("f{:03}.txt", i), size))
            .collect()
    }
}

proptest! {
    #[test]
    fn reconcile_is_idempotent(old in arb_manifest(), current in arb_paths()) {
        let once = reconcile(&old, &current);
        let twice = reconcile(&once, &current);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reconcile_tracks_current_files(old in arb_manifest(), current in arb_paths()) {
        let updated = reconcile(&old, &current);

        prop_assert_eq!(updated.len(), current.len());
        for path in &current {
            let expected = old.is_disabled(path).unwrap_or(false);
            prop_assert_eq!(updated.is_disabled(path), Some(expected));
        }
    }

    #[test]
    fn render_parse_preserves_manifest(m in arb_manifest(), relative in any::<bool>()) {
        let normalizer = Normalizer::new(Vec::new());
        let style = if relative { PathStyle::Relative } else { PathStyle::Absolute };
        let dir = Path::new("/proj");

        let text = manifest::render(&m, style, dir);
        let parsed = manifest::parse(&text, dir, &normalizer).unwrap();
        prop_assert_eq!(parsed, m);
    }

    #[test]
    fn pack_respects_budget(entries in arb_entries(), budget in 1u64..8000) {
        for batch in pack(entries, budget) {
            prop_assert!(!batch.files.is_empty());
            prop_assert!(batch.size <= budget || batch.files.len() == 1);
            prop_assert_eq!(batch.size, batch.files.iter().map(|f| f.size).sum::<u64>());
        }
    }

    #[test]
    fn pack_places_every_file_once(entries in arb_entries(), budget in 1u64..8000) {
        let mut expected: Vec<PathBuf> = entries.iter().map(|e| e.path.clone()).collect();
        expected.sort();

        let mut placed: Vec<PathBuf> = pack(entries, budget)
            .into_iter()
            .flat_map(|b| b.files)
            .map(|f| f.path)
            .collect();
        placed.sort();

        prop_assert_eq!(placed, expected);
    }

    #[test]
    fn oversized_files_travel_alone(entries in arb_entries(), budget in 1u64..8000) {
        for batch in pack(entries, budget) {
            if batch.files.iter().any(|f| f.size > budget) {
                prop_assert_eq!(batch.files.len(), 1);
            }
        }
    }
}
