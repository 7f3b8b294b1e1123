//! Property tests: any well-formed pair of snapshots converges under replay.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;

use proptest::prelude::*;
use sectiondiff_core::diff::{diff, diff_staged};
use sectiondiff_core::model::{Item, Section, Snapshot};
use sectiondiff_core::apply;

type PropSnapshot = Snapshot<String, u8, i32>;

/// Raw section: (identity key, header, items as (identity key, value))
type RawSection = (u8, u8, Vec<(u8, i32)>);

/// Small identity pools so that snapshots overlap heavily. Item identities
/// are unique per section but may repeat across sections.
fn raw_snapshot() -> impl Strategy<Value = Vec<RawSection>> {
    prop::collection::vec(
        (
            0u8..6,
            0u8..3,
            prop::collection::vec((0u8..10, 0i32..3), 0..7),
        ),
        0..6,
    )
}

fn build(raw: Vec<RawSection>) -> PropSnapshot {
    let mut seen_sections = HashSet::new();
    raw.into_iter()
        .filter(|(key, _, _)| seen_sections.insert(*key))
        .map(|(key, header, items)| {
            let mut seen_items = HashSet::new();
            Section::new(
                format!("S{}", key),
                header,
                items
                    .into_iter()
                    .filter(|(item_key, _)| seen_items.insert(*item_key))
                    .map(|(item_key, value)| Item::new(format!("i{}", item_key), value))
                    .collect(),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_replay_converges(a in raw_snapshot(), b in raw_snapshot()) {
        let a = build(a);
        let b = build(b);

        let changeset = diff(&a, &b).unwrap();

        prop_assert_eq!(apply(&a, &changeset).unwrap(), b);
    }

    #[test]
    fn prop_staged_replay_converges(a in raw_snapshot(), b in raw_snapshot()) {
        let a = build(a);
        let b = build(b);

        let stages = diff_staged(&a, &b).unwrap();
        prop_assert!(!stages.is_empty());
        prop_assert!(stages.len() <= 2);

        let mut current = a;
        for stage in &stages {
            current = apply(&current, stage).unwrap();
        }
        prop_assert_eq!(current, b);
    }

    #[test]
    fn prop_self_diff_is_empty(a in raw_snapshot()) {
        let a = build(a);

        let changeset = diff(&a, &a).unwrap();

        prop_assert!(changeset.is_empty());
    }

    #[test]
    fn prop_index_sets_are_sorted(a in raw_snapshot(), b in raw_snapshot()) {
        let a = build(a);
        let b = build(b);

        let changeset = diff(&a, &b).unwrap();

        prop_assert!(changeset.deleted_sections().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(changeset.inserted_sections().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(changeset.deleted_items().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(changeset.inserted_items().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(changeset.updated_items().windows(2).all(|w| w[0] < w[1]));
        prop_assert!(changeset.moved_items().windows(2).all(|w| w[0] < w[1]));
    }
}
