//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use gitpin::checker::{CheckerContext, PinResolver};
use gitpin::core::config::CheckerSettings;
use gitpin::core::credentials::Credentials;
use gitpin::core::types::{Dependency, DependencyRequirement, SourceDetails};
use gitpin::forge::mock::{MockForge, MockForgeFactory};
use gitpin::forge::ForgeFactory;
use gitpin::git::mock::{MockCommandRunner, MockTransport};
use gitpin::metadata::{SourceUrlFinder, StaticSourceFinder};
use gitpin::version::GenericScheme;

pub const REPO_URL: &str = "https://github.com/gocardless/business";

/// Builds smart-HTTP advertisements line by line.
#[derive(Debug, Default)]
pub struct Advertisement {
    lines: Vec<String>,
}

impl Advertisement {
    pub fn new() -> Self {
        Self {
            lines: vec!["001e# service=git-upload-pack".to_string()],
        }
    }

    pub fn head(mut self, sha: &str) -> Self {
        self.lines.push(format!("00000155{} HEAD\0multi_ack side-band-64k", sha));
        self
    }

    pub fn branch(mut self, name: &str, sha: &str) -> Self {
        self.lines.push(format!("003f{} refs/heads/{}", sha, name));
        self
    }

    pub fn tag(mut self, name: &str, sha: &str) -> Self {
        self.lines.push(format!("003f{} refs/tags/{}", sha, name));
        self
    }

    /// An annotated tag: the tag object line and its peel line.
    pub fn annotated_tag(mut self, name: &str, object_sha: &str, commit_sha: &str) -> Self {
        self.lines.push(format!("003f{} refs/tags/{}", object_sha, name));
        self.lines
            .push(format!("0042{} refs/tags/{}^{{}}", commit_sha, name));
        self
    }

    pub fn build(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push_str("\n0000");
        out
    }
}

/// A 40-character SHA made of one repeated hex digit, e.g. `sha('a')`.
pub fn sha(digit: char) -> String {
    std::iter::repeat(digit).take(40).collect()
}

pub fn git_dependency(
    version: Option<&str>,
    reference: Option<&str>,
    branch: Option<&str>,
) -> Dependency {
    Dependency::new("business", version, "bundler").with_requirement(
        DependencyRequirement::from_source(SourceDetails::git(REPO_URL, reference, branch)),
    )
}

/// Everything a resolver talks to, scripted.
pub struct Harness {
    pub http: MockTransport,
    pub runner: MockCommandRunner,
    pub forge: MockForge,
    pub factory: MockForgeFactory,
    pub finder: Arc<StaticSourceFinder>,
}

impl Harness {
    pub fn new(advertisement: &str) -> Self {
        let http = MockTransport::new();
        http.advertise(REPO_URL, advertisement);
        let forge = MockForge::new();
        Self {
            http,
            runner: MockCommandRunner::new(),
            factory: MockForgeFactory::new(forge.clone()),
            forge,
            finder: Arc::new(StaticSourceFinder::default()),
        }
    }

    /// List `url` as the dependency's listing source, serving `advertisement`.
    pub fn with_listing(mut self, url: &str, advertisement: &str) -> Self {
        self.http.advertise(url, advertisement);
        self.finder = Arc::new(StaticSourceFinder::new(Some(url)));
        self
    }

    pub fn context(&self) -> CheckerContext {
        self.context_with_forges(Arc::new(self.factory.clone()))
    }

    pub fn context_with_forges(&self, forges: Arc<dyn ForgeFactory>) -> CheckerContext {
        let finder: Arc<dyn SourceUrlFinder> = self.finder.clone();
        CheckerContext::new(
            Arc::new(self.http.clone()),
            Arc::new(self.runner.clone()),
            finder,
            forges,
            Credentials::default(),
        )
    }

    pub fn resolver(&self, dependency: Dependency) -> PinResolver<GenericScheme> {
        self.resolver_with(dependency, CheckerSettings::default())
    }

    pub fn resolver_with(
        &self,
        dependency: Dependency,
        settings: CheckerSettings,
    ) -> PinResolver<GenericScheme> {
        PinResolver::new(dependency, GenericScheme, &settings, self.context())
            .expect("resolver should build")
    }

    /// Advertisement requests made against the dependency's own repository.
    pub fn local_fetches(&self) -> usize {
        self.http
            .requests()
            .iter()
            .filter(|u| u.starts_with(REPO_URL))
            .count()
    }
}
