//! git::mock
//!
//! Scripted transports for deterministic testing.
//!
//! # Design
//!
//! [`MockTransport`] answers `GET` requests from a table keyed by URL and
//! answers 404 for anything unscripted. [`MockCommandRunner`] plays the
//! `git ls-remote` fallback: it fails by default, or replays scripted stdout
//! per target URL. Both record every call so tests can assert how often the
//! network was touched.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gitpin::core::credentials::Credentials;
//! use gitpin::git::mock::{MockCommandRunner, MockTransport};
//! use gitpin::git::GitReferenceFetcher;
//!
//! # tokio_test::block_on(async {
//! let http = MockTransport::new();
//! http.advertise(
//!     "https://github.com/gocardless/business",
//!     "e1f9d6b1c1b0f8ad0f0e8c9b7a6d5c4b3a291807 refs/heads/master\n",
//! );
//!
//! let fetcher = GitReferenceFetcher::new(
//!     "https://github.com/gocardless/business",
//!     Credentials::default(),
//!     Arc::new(http.clone()),
//!     Arc::new(MockCommandRunner::new()),
//! );
//! assert_eq!(fetcher.ref_names().await.unwrap(), vec!["master"]);
//! assert_eq!(http.requests().len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::transport::{CommandOutput, CommandRunner, HttpResponse, HttpTransport, TransportError};
use super::url::{service_pack_request, with_git_suffix};
use crate::core::credentials::{BasicAuth, Credentials};

/// HTTP transport answering from a table of scripted responses.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    responses: HashMap<String, Result<HttpResponse, TransportError>>,
    requests: Vec<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for an exact request URL.
    pub fn respond(&self, url: &str, response: Result<HttpResponse, TransportError>) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.insert(url.to_string(), response);
    }

    /// Serve `body` as the 200 advertisement of `repo_url`.
    ///
    /// Falls back to the bare `.git` URL if the repository URL cannot be
    /// turned into a service request.
    pub fn advertise(&self, repo_url: &str, body: &str) {
        let url = service_pack_request(repo_url, &Credentials::default())
            .map(|request| request.url)
            .unwrap_or_else(|_| format!("{}/info/refs", with_git_suffix(repo_url)));
        self.respond(&url, Ok(HttpResponse::new(200, body)));
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(
        &self,
        url: &str,
        _auth: Option<&BasicAuth>,
    ) -> Result<HttpResponse, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(url.to_string());
        inner
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "")))
    }
}

/// `git ls-remote` stand-in keyed by target URL.
#[derive(Debug, Clone, Default)]
pub struct MockCommandRunner {
    inner: Arc<Mutex<MockRunnerInner>>,
}

#[derive(Debug, Default)]
struct MockRunnerInner {
    outputs: HashMap<String, String>,
    calls: Vec<Vec<String>>,
}

impl MockCommandRunner {
    /// A runner on which every command fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout` when `ls-remote` targets `target`.
    pub fn ls_remote(&self, target: &str, stdout: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.outputs.insert(target.to_string(), stdout.to_string());
    }

    /// Arguments of every call so far.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(
        &self,
        _program: &str,
        args: &[&str],
        _env: &[(&str, &str)],
    ) -> std::io::Result<CommandOutput> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(args.iter().map(|a| a.to_string()).collect());

        let scripted = args.last().and_then(|target| inner.outputs.get(*target));
        Ok(match scripted {
            Some(stdout) => CommandOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
                success: true,
            },
            None => CommandOutput {
                stdout: String::new(),
                stderr: "fatal: could not read from remote repository".to_string(),
                success: false,
            },
        })
    }
}
