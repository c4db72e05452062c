//! check command - Resolve pin state and upgrade candidates for a dependency
//!
//! # Output
//!
//! Human-readable by default, or a [`CheckReport`] as JSON with `--json`.
//! The release check only runs when `--release` is given.

use std::fmt::Display;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::checker::{CheckerContext, CheckerError, PinResolver};
use crate::cli::args::CheckArgs;
use crate::core::config::{CheckerSettings, Config};
use crate::core::types::{Dependency, DependencyRequirement, SourceDetails};
use crate::git::LocalTag;
use crate::metadata::StaticSourceFinder;
use crate::version::{scheme_for_package_manager, GenericScheme, SchemeKind, SemverScheme, VersionScheme};

/// Everything `gitpin check` found out about one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub dependency: String,
    pub pinned: bool,
    pub ref_looks_like_version: bool,
    pub ref_looks_like_commit_sha: bool,
    pub head_commit: Option<String>,
    pub latest_tag: Option<TagSummary>,
    pub latest_matching_precision: Option<TagSummary>,
    pub tag_for_pinned_sha: Option<String>,
    pub in_release: Option<bool>,
}

/// A selected tag with its version rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub tag: String,
    pub version: String,
    pub commit_sha: String,
    pub tag_sha: String,
}

impl<V: Display> From<LocalTag<V>> for TagSummary {
    fn from(tag: LocalTag<V>) -> Self {
        Self {
            tag: tag.tag,
            version: tag.version.to_string(),
            commit_sha: tag.commit_sha,
            tag_sha: tag.tag_sha,
        }
    }
}

/// Resolve and print the pin state of the dependency described by `args`.
pub async fn check(config: &Config, args: &CheckArgs) -> Result<()> {
    let dependency = dependency_from(args);
    let settings = settings_for(&config.file.checker, args);
    let finder = Arc::new(StaticSourceFinder::new(args.listing_url.as_deref()));
    let context =
        CheckerContext::from_config(&config.file, finder).context("failed to build HTTP client")?;

    let release = args.release.as_deref();
    let report = match scheme_for_package_manager(&args.package_manager) {
        SchemeKind::Generic => {
            let resolver = PinResolver::new(dependency, GenericScheme, &settings, context)?;
            resolve(&resolver, release).await
        }
        SchemeKind::Semver => {
            let resolver = PinResolver::new(dependency, SemverScheme, &settings, context)?;
            resolve(&resolver, release).await
        }
    }
    .with_context(|| format!("failed to check '{}'", args.name))?;

    if args.json {
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{}", out);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn dependency_from(args: &CheckArgs) -> Dependency {
    Dependency::new(&args.name, args.version.as_deref(), &args.package_manager).with_requirement(
        DependencyRequirement::from_source(SourceDetails::git(
            &args.url,
            args.reference.as_deref(),
            args.branch.as_deref(),
        )),
    )
}

/// Configuration settings with the command-line flags layered on top.
fn settings_for(base: &CheckerSettings, args: &CheckArgs) -> CheckerSettings {
    let mut settings = base.clone();
    settings.ignored_versions.extend(args.ignore.iter().cloned());
    settings.raise_on_ignored |= args.raise_on_ignored;
    settings.consider_version_branches_pinned |= args.consider_version_branches_pinned;
    settings
}

async fn resolve<S: VersionScheme>(
    resolver: &PinResolver<S>,
    release: Option<&str>,
) -> Result<CheckReport, CheckerError> {
    let pinned = resolver.pinned().await?;
    let in_release = match release {
        Some(version) => Some(resolver.branch_or_ref_in_release(version).await?),
        None => None,
    };

    Ok(CheckReport {
        dependency: resolver.dependency().name.clone(),
        pinned,
        ref_looks_like_version: resolver.pinned_ref_looks_like_version().await?,
        ref_looks_like_commit_sha: resolver.pinned_ref_looks_like_commit_sha().await?,
        head_commit: resolver.head_commit_for_current_branch().await?,
        latest_tag: resolver.local_tag_for_latest_version().await?.map(Into::into),
        latest_matching_precision: resolver
            .local_ref_for_latest_version_matching_existing_precision()
            .await?
            .map(Into::into),
        tag_for_pinned_sha: resolver.local_tag_for_pinned_sha().await?,
        in_release,
    })
}

fn print_report(report: &CheckReport) {
    let yes_no = |b: bool| if b { "yes" } else { "no" };

    println!("Dependency: {}", report.dependency);
    println!("Pinned: {}", yes_no(report.pinned));
    if report.ref_looks_like_commit_sha {
        println!("Pinned to: commit");
    } else if report.ref_looks_like_version {
        println!("Pinned to: version tag");
    }
    if let Some(sha) = &report.head_commit {
        println!("Head: {}", sha);
    }
    if let Some(tag) = &report.tag_for_pinned_sha {
        println!("Tag at pinned commit: {}", tag);
    }
    match &report.latest_tag {
        Some(tag) => println!("Latest tag: {} ({}) at {}", tag.tag, tag.version, tag.commit_sha),
        None => println!("Latest tag: none"),
    }
    if let Some(tag) = &report.latest_matching_precision {
        println!("Latest at same precision: {} ({})", tag.tag, tag.version);
    }
    if let Some(included) = report.in_release {
        println!("In release: {}", yes_no(included));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::args::{Cli, Command};

    fn parse_check(argv: &[&str]) -> CheckArgs {
        let mut full = vec!["gitpin", "check"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Check(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn flags_layer_over_configuration() {
        let base = CheckerSettings {
            ignored_versions: vec![">= 3.0".into()],
            raise_on_ignored: false,
            consider_version_branches_pinned: true,
        };
        let args = parse_check(&[
            "--url",
            "https://github.com/a/b",
            "--ignore",
            "= 2.1",
            "--raise-on-ignored",
        ]);

        let settings = settings_for(&base, &args);
        assert_eq!(settings.ignored_versions, vec![">= 3.0", "= 2.1"]);
        assert!(settings.raise_on_ignored);
        assert!(settings.consider_version_branches_pinned);
    }

    #[test]
    fn dependency_carries_git_source() {
        let args = parse_check(&[
            "--url",
            "https://github.com/a/b",
            "--ref",
            "v1.0.0",
            "--version",
            "1.0.0",
            "--name",
            "b",
        ]);
        let dep = dependency_from(&args);
        assert_eq!(dep.name, "b");
        assert_eq!(dep.package_manager, "bundler");
        let source = dep.git_source().unwrap().unwrap();
        assert_eq!(source.reference.as_deref(), Some("v1.0.0"));
        assert_eq!(source.branch, None);
    }

    #[test]
    fn tag_summary_renders_version() {
        let summary = TagSummary::from(LocalTag {
            tag: "v1.2.0".to_string(),
            version: semver::Version::new(1, 2, 0),
            commit_sha: "abc".to_string(),
            tag_sha: "def".to_string(),
        });
        assert_eq!(summary.version, "1.2.0");
    }
}
