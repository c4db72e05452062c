//! Integration tests for pin resolution.
//!
//! These tests drive `PinResolver` through scripted transports and a mock
//! forge, covering pin state, tag selection, SHA pins and release inclusion.

mod support;

use gitpin::checker::CheckerError;
use gitpin::core::config::CheckerSettings;
use gitpin::forge::mock::{FailOn, MockOperation};
use gitpin::forge::{CompareStatus, ForgeError};

use support::{git_dependency, sha, Advertisement, Harness};

const LISTING_URL: &str = "https://gitlab.com/upstream/business";

/// master, a live `v1.5` branch, and tags across two naming schemes.
fn business() -> String {
    Advertisement::new()
        .head(&sha('0'))
        .branch("master", &sha('0'))
        .branch("v1.5", &sha('5'))
        .annotated_tag("v1.0.0", &sha('a'), &sha('1'))
        .tag("v1.1.0", &sha('2'))
        .tag("v1.2.0", &sha('3'))
        .tag("v1.2", &sha('3'))
        .tag("v1.3.0.beta.1", &sha('4'))
        .tag("release-2.0.0", &sha('6'))
        .tag("release-2.1.0", &sha('7'))
        .build()
}

// =============================================================================
// Pin State
// =============================================================================

mod pin_state {
    use super::*;

    #[tokio::test]
    async fn branch_tracking_is_not_pinned() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(None, Some("main"), Some("main")));
        assert!(!r.pinned().await.unwrap());
        assert_eq!(h.local_fetches(), 0);
    }

    #[tokio::test]
    async fn bare_sha_is_pinned() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(
            None,
            Some("abc1234abc1234abc1234abc1234abc1234abc1"),
            None,
        ));
        assert!(r.pinned().await.unwrap());
        assert!(r.pinned_ref_looks_like_commit_sha().await.unwrap());
    }

    #[tokio::test]
    async fn tag_is_pinned() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        assert!(r.pinned().await.unwrap());
        assert!(r.pinned_ref_looks_like_version().await.unwrap());
    }

    #[tokio::test]
    async fn live_branch_is_not_pinned() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(None, Some("master"), None));
        assert!(!r.pinned().await.unwrap());
        assert!(!r.pinned_ref_looks_like_version().await.unwrap());
    }

    #[tokio::test]
    async fn version_branch_follows_setting() {
        let h = Harness::new(&business());
        assert!(!h
            .resolver(git_dependency(None, Some("v1.5"), None))
            .pinned()
            .await
            .unwrap());

        let settings = CheckerSettings {
            consider_version_branches_pinned: true,
            ..Default::default()
        };
        assert!(h
            .resolver_with(git_dependency(None, Some("v1.5"), None), settings)
            .pinned()
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn ls_remote_fallback_serves_pin_state() {
        let h = Harness::new("");
        h.http.respond(
            "https://github.com/gocardless/business.git/info/refs?service=git-upload-pack",
            Ok(gitpin::git::HttpResponse::new(401, "")),
        );
        h.runner.ls_remote(
            "https://github.com/gocardless/business.git",
            &format!("{}\trefs/heads/master\n", sha('0')),
        );
        let r = h.resolver(git_dependency(None, Some("master"), None));
        assert!(!r.pinned().await.unwrap());
        assert_eq!(h.runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_repository() {
        let h = Harness::new("");
        h.http.respond(
            "https://github.com/gocardless/business.git/info/refs?service=git-upload-pack",
            Ok(gitpin::git::HttpResponse::new(404, "")),
        );
        let r = h.resolver(git_dependency(None, Some("v1.0.0"), None));
        assert!(matches!(r.pinned().await, Err(CheckerError::Unreachable(_))));
        assert!(!r.git_repo_reachable().await.unwrap());
    }
}

// =============================================================================
// Tag Selection
// =============================================================================

mod selection {
    use super::*;

    #[tokio::test]
    async fn candidates_share_the_declared_prefix() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        let names: Vec<String> = r
            .allowed_version_tags()
            .await
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["v1.0.0", "v1.1.0", "v1.2.0", "v1.2"]);
    }

    #[tokio::test]
    async fn latest_is_the_maximum_allowed() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(Some("2.0.0"), Some("release-2.0.0"), None));
        let latest = r.local_tag_for_latest_version().await.unwrap().unwrap();
        assert_eq!(latest.tag, "release-2.1.0");
        assert_eq!(latest.commit_sha, sha('7'));
    }

    #[tokio::test]
    async fn nothing_allowed_means_no_latest() {
        let h = Harness::new(
            &Advertisement::new()
                .branch("master", &sha('0'))
                .tag("nightly", &sha('1'))
                .build(),
        );
        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        assert!(r.allowed_version_tags().await.unwrap().is_empty());
        assert_eq!(r.local_tag_for_latest_version().await.unwrap(), None);
    }

    #[tokio::test]
    async fn all_versions_ignored() {
        let h = Harness::new(
            &Advertisement::new()
                .tag("1.0.0", &sha('1'))
                .tag("1.1.0", &sha('2'))
                .tag("1.2.0", &sha('3'))
                .build(),
        );
        let settings = CheckerSettings {
            ignored_versions: vec!["> 1.0.0".into()],
            raise_on_ignored: true,
            ..Default::default()
        };
        let r = h.resolver_with(git_dependency(Some("1.0.0"), Some("1.0.0"), None), settings);
        assert_eq!(
            r.local_tag_for_latest_version().await,
            Err(CheckerError::AllVersionsIgnored {
                dependency: "business".into()
            })
        );
    }

    #[tokio::test]
    async fn ignored_without_raise_reports_current() {
        let h = Harness::new(
            &Advertisement::new()
                .tag("1.0.0", &sha('1'))
                .tag("1.1.0", &sha('2'))
                .build(),
        );
        let settings = CheckerSettings {
            ignored_versions: vec!["> 1.0.0".into()],
            ..Default::default()
        };
        let r = h.resolver_with(git_dependency(Some("1.0.0"), Some("1.0.0"), None), settings);
        let latest = r.local_tag_for_latest_version().await.unwrap().unwrap();
        assert_eq!(latest.tag, "1.0.0");
    }

    #[tokio::test]
    async fn precision_is_preserved() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(Some("1.0"), Some("v1.0"), None));

        let same = r
            .local_ref_for_latest_version_matching_existing_precision()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same.tag, "v1.5");

        let lower = r
            .local_ref_for_latest_version_lower_precision()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lower.tag, "v1.5");
    }

    #[tokio::test]
    async fn prerelease_only_for_prerelease_pins() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(None, Some("v1.3.0.beta.1"), None));
        let latest = r.local_tag_for_latest_version().await.unwrap().unwrap();
        assert_eq!(latest.tag, "v1.3.0.beta.1");
    }

    #[tokio::test]
    async fn local_tags_expose_tag_objects() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        let tags = r.local_tags_for_allowed_versions().await.unwrap();
        assert_eq!(tags[0].tag, "v1.0.0");
        assert_eq!(tags[0].commit_sha, sha('1'));
        assert_eq!(tags[0].tag_sha, sha('a'));
    }
}

// =============================================================================
// SHA Pins
// =============================================================================

mod sha_pins {
    use super::*;

    #[tokio::test]
    async fn most_specific_tag_for_pinned_commit() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(None, Some(&sha('3')), None));
        assert_eq!(
            r.local_tag_for_pinned_sha().await.unwrap().as_deref(),
            Some("v1.2.0")
        );
    }

    #[tokio::test]
    async fn pinned_commit_anchors_the_prefix() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(Some("2.0.0"), Some(&sha('6')), None));
        let latest = r.local_tag_for_latest_version().await.unwrap().unwrap();
        assert_eq!(latest.tag, "release-2.1.0");
    }

    #[tokio::test]
    async fn tag_object_sha_resolves_to_commit() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(None, Some(&sha('a')), None));
        assert_eq!(
            r.head_commit_for_pinned_ref().await.unwrap(),
            Some(sha('1'))
        );
    }

    #[tokio::test]
    async fn repeated_queries_fetch_once() {
        let h = Harness::new(&business());
        let r = h.resolver(git_dependency(Some("1.2.0"), Some(&sha('3')), None));

        for _ in 0..2 {
            r.pinned().await.unwrap();
            r.allowed_version_tags().await.unwrap();
            r.local_tag_for_latest_version().await.unwrap();
            r.local_ref_for_latest_version_matching_existing_precision()
                .await
                .unwrap();
            r.head_commit_for_current_branch().await.unwrap();
        }
        assert_eq!(h.local_fetches(), 1);
    }
}

// =============================================================================
// Release Inclusion
// =============================================================================

mod release {
    use super::*;

    fn listing() -> String {
        Advertisement::new()
            .tag("v1.9.0", &sha('8'))
            .tag("v2.0.0", &sha('9'))
            .build()
    }

    #[tokio::test]
    async fn branch_behind_release_when_no_commits_ahead() {
        let h = Harness::new(&business()).with_listing(LISTING_URL, &listing());
        h.forge.set_status("v2.0.0", "main", CompareStatus::Behind);

        let r = h.resolver(git_dependency(None, None, Some("main")));
        assert!(r.branch_behind_release("2.0.0").await.unwrap());
        assert_eq!(
            h.forge.operations(),
            vec![MockOperation::Compare {
                base: "v2.0.0".into(),
                head: "main".into()
            }]
        );
        assert_eq!(h.factory.requested()[0].repo, "upstream/business");
    }

    #[tokio::test]
    async fn identical_branch_is_not_behind() {
        let h = Harness::new(&business()).with_listing(LISTING_URL, &listing());
        h.forge.set_status("v2.0.0", "main", CompareStatus::Identical);

        let r = h.resolver(git_dependency(None, None, Some("main")));
        assert!(!r.branch_behind_release("2.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn pinned_tag_identical_to_release() {
        let h = Harness::new(&business()).with_listing(LISTING_URL, &listing());
        h.forge.set_status("v1.9.0", "v1.0.0", CompareStatus::Identical);

        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        assert!(r.pinned_ref_in_release("1.9.0").await.unwrap());
        assert!(r.branch_or_ref_in_release("1.9.0").await.unwrap());
    }

    #[tokio::test]
    async fn permanent_compare_errors_are_not_included() {
        let h = Harness::new(&business()).with_listing(LISTING_URL, &listing());
        h.forge.fail_on(FailOn::Compare(ForgeError::ApiError {
            status: 500,
            message: "boom".into(),
        }));

        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        assert!(!r.branch_or_ref_in_release("2.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn auth_failures_propagate() {
        let h = Harness::new(&business()).with_listing(LISTING_URL, &listing());
        h.forge
            .fail_on(FailOn::Compare(ForgeError::AuthFailed("bad token".into())));

        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        assert!(matches!(
            r.branch_or_ref_in_release("2.0.0").await,
            Err(CheckerError::Forge(ForgeError::AuthFailed(_)))
        ));
    }

    #[tokio::test]
    async fn listing_tags_fetched_once() {
        let h = Harness::new(&business()).with_listing(LISTING_URL, &listing());
        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));

        r.branch_or_ref_in_release("1.9.0").await.unwrap();
        r.branch_or_ref_in_release("2.0.0").await.unwrap();
        r.listing_tag_for_version("2.0.0").await;

        let listing_fetches = h
            .http
            .requests()
            .iter()
            .filter(|u| u.starts_with(LISTING_URL))
            .count();
        assert_eq!(listing_fetches, 1);
        assert_eq!(h.finder.calls(), 1);
    }

    #[tokio::test]
    async fn codecommit_listing_is_never_included() {
        let url = "https://git-codecommit.eu-west-1.amazonaws.com/v1/repos/business";
        let h = Harness::new(&business()).with_listing(url, &listing());
        let r = h.resolver(git_dependency(Some("1.0.0"), Some("v1.0.0"), None));
        h.forge.set_status("v2.0.0", "v1.0.0", CompareStatus::Unknown);

        assert!(!r.branch_or_ref_in_release("2.0.0").await.unwrap());
    }
}
