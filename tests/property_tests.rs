//! Property-based tests for advertisement parsing and tag selection.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated advertisements and version sets.

mod support;

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;

use gitpin::checker::tag_pattern::{listing_tag_matches, same_prefix, scan_version};
use gitpin::git::advertisement;
use gitpin::version::GenericVersion;

use support::{git_dependency, Advertisement, Harness};

/// Strategy for `major.minor.patch` triples.
fn version_triple() -> impl Strategy<Value = (u64, u64, u64)> {
    (0..30u64, 0..30u64, 0..30u64)
}

/// Strategy for a non-empty set of distinct triples.
fn version_set() -> impl Strategy<Value = BTreeSet<(u64, u64, u64)>> {
    prop::collection::btree_set(version_triple(), 1..12)
}

/// Strategy for prefixes that never end in a digit, dot, or `v`.
fn tag_prefix() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-u]{1,6}-"]
}

fn dotted((a, b, c): (u64, u64, u64)) -> String {
    format!("{}.{}.{}", a, b, c)
}

/// Distinct 40-character SHA per index.
fn sha_for(i: usize) -> String {
    format!("{:040x}", i + 1)
}

proptest! {
    /// Every advertised name parses to exactly one ref, in order, with the
    /// peeled commit for annotated tags.
    #[test]
    fn parse_keeps_one_ref_per_name(
        names in prop::collection::hash_set("[a-z]{1,8}", 1..10),
        annotated in prop::collection::vec(any::<bool>(), 10),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let mut ad = Advertisement::new();
        for (i, name) in names.iter().enumerate() {
            ad = if annotated[i] {
                ad.annotated_tag(name, &sha_for(100 + i), &sha_for(i))
            } else {
                ad.tag(name, &sha_for(i))
            };
        }

        let refs = advertisement::parse(&ad.build());
        prop_assert_eq!(refs.len(), names.len());
        for (i, r) in refs.iter().enumerate() {
            prop_assert_eq!(r.name(), names[i].as_str());
            prop_assert_eq!(r.commit_sha(), sha_for(i));
            prop_assert_eq!(r.tag_sha().is_some(), annotated[i]);
        }
    }

    /// A prefix that does not end in a digit or dot never leaks into the
    /// scanned version.
    #[test]
    fn scan_separates_prefix_and_version(prefix in tag_prefix(), v in version_triple()) {
        let version = dotted(v);
        let name = format!("{}{}", prefix, version);
        prop_assert_eq!(scan_version(&name), Some(version.as_str()));
        let spelled_with_v = format!("{}v{}", prefix, version);
        prop_assert!(same_prefix(&name, &spelled_with_v));
    }

    #[test]
    fn listing_tags_match_whole_versions(v in version_triple(), digit in 0..10u8) {
        let version = dotted(v);
        prop_assert!(listing_tag_matches(&version, &version));
        let with_v = format!("v{}", version);
        let glued_digit = format!("{}{}", digit, version);
        prop_assert!(listing_tag_matches(&with_v, &version));
        prop_assert!(!listing_tag_matches(&glued_digit, &version));
    }

    /// Trailing zero components do not change a version.
    #[test]
    fn zero_padding_is_equal(a in 0..100u64, b in 0..100u64) {
        let short = GenericVersion::parse(&format!("{}.{}", a, b)).unwrap();
        let long = GenericVersion::parse(&format!("{}.{}.0", a, b)).unwrap();
        prop_assert_eq!(short, long);
    }

    /// Numeric versions order like their component tuples.
    #[test]
    fn ordering_matches_tuples(x in version_triple(), y in version_triple()) {
        let vx = GenericVersion::parse(&dotted(x)).unwrap();
        let vy = GenericVersion::parse(&dotted(y)).unwrap();
        prop_assert_eq!(vx.cmp(&vy), x.cmp(&y));
    }

    /// The latest tag is the maximum candidate sharing the pinned prefix,
    /// whatever else the repository advertises.
    #[test]
    fn latest_is_max_with_same_prefix(
        versions in version_set(),
        others in version_set(),
    ) {
        let mut ad = Advertisement::new();
        for (i, v) in versions.iter().enumerate() {
            ad = ad.tag(&format!("v{}", dotted(*v)), &sha_for(i));
        }
        for (i, v) in others.iter().enumerate() {
            ad = ad.tag(&format!("release-{}", dotted(*v)), &sha_for(100 + i));
        }
        let h = Harness::new(&ad.build());

        let first = dotted(*versions.iter().next().unwrap());
        let pin = format!("v{}", first);
        let r = h.resolver(git_dependency(Some(&first), Some(&pin), None));

        let (allowed, latest) = tokio_test::block_on(async {
            (
                r.allowed_version_tags().await.unwrap(),
                r.local_tag_for_latest_version().await.unwrap(),
            )
        });

        prop_assert_eq!(allowed.len(), versions.len());
        prop_assert!(allowed.iter().all(|t| same_prefix(t.name(), &pin)));

        let expected = format!("v{}", dotted(*versions.iter().next_back().unwrap()));
        prop_assert_eq!(latest.map(|t| t.tag), Some(expected));
    }

    /// Publishing a strictly higher version makes it the latest.
    #[test]
    fn adding_a_higher_version_wins(versions in version_set()) {
        let top = *versions.iter().next_back().unwrap();
        let higher = (top.0 + 1, 0, 0);

        let mut ad = Advertisement::new();
        for (i, v) in versions.iter().enumerate() {
            ad = ad.tag(&dotted(*v), &sha_for(i));
        }
        ad = ad.tag(&dotted(higher), &sha_for(99));
        let h = Harness::new(&ad.build());
        let r = h.resolver(git_dependency(None, None, None));

        let latest = tokio_test::block_on(r.local_tag_for_latest_version()).unwrap();
        prop_assert_eq!(latest.map(|t| t.tag), Some(dotted(higher)));
    }

    /// The precision-preserving pick keeps the current component count.
    #[test]
    fn precision_pick_keeps_component_count(
        triples in version_set(),
        pairs in prop::collection::btree_set((0..30u64, 0..30u64), 0..8),
    ) {
        let mut ad = Advertisement::new();
        let mut names = HashSet::new();
        for (i, v) in triples.iter().enumerate() {
            let name = format!("v{}", dotted(*v));
            names.insert(name.clone());
            ad = ad.tag(&name, &sha_for(i));
        }
        for (i, (a, b)) in pairs.iter().enumerate() {
            let name = format!("v{}.{}", a, b);
            names.insert(name.clone());
            ad = ad.tag(&name, &sha_for(100 + i));
        }
        let h = Harness::new(&ad.build());
        let r = h.resolver(git_dependency(Some("0.0"), Some("v0.0"), None));

        let picked = tokio_test::block_on(
            r.local_ref_for_latest_version_matching_existing_precision(),
        )
        .unwrap();

        match picked {
            Some(tag) => {
                prop_assert!(names.contains(&tag.tag));
                let version = scan_version(&tag.tag).unwrap();
                prop_assert_eq!(version.split('.').count(), 2);
            }
            None => prop_assert!(pairs.is_empty()),
        }
    }
}
