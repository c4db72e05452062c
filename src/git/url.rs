//! git::url
//!
//! Repository URL normalization for ref discovery.
//!
//! Dependency manifests name repositories in several shapes: HTTPS URLs,
//! `http://` URLs on private hosts, and SCP-style `git@host:path` remotes.
//! Ref discovery always talks smart HTTP, so every shape is normalized to an
//! `https://` (or explicit `http://`) URL before the service path is appended.

use url::Url;

use super::fetcher::FetchError;
use crate::core::credentials::{BasicAuth, Credentials};

/// Hosts whose failures are reported loudly; anything else is a private host.
pub const KNOWN_HOSTS: &[&str] = &["github.com", "bitbucket.org", "gitlab.com"];

/// Host that rejects the `.git` suffix on repository paths.
const NO_GIT_SUFFIX_HOST: &str = "dev.azure.com";

const SERVICE_PATH: &str = "/info/refs?service=git-upload-pack";

/// Convert `git@host:path` / `git@host:/path` / `git@host/path` to `https://host/path`.
///
/// Other URLs are returned unchanged.
pub fn scp_to_standard(uri: &str) -> String {
    let Some(rest) = uri.strip_prefix("git@") else {
        return uri.to_string();
    };
    let rest = rest.rsplit("git@").next().unwrap_or(rest);
    match rest.find(':') {
        Some(idx) => {
            let (host, path) = rest.split_at(idx);
            let path = &path[1..];
            let path = path.strip_prefix('/').unwrap_or(path);
            format!("https://{}/{}", host, path)
        }
        None => format!("https://{}", rest),
    }
}

/// Whether the URL targets one of [`KNOWN_HOSTS`].
pub fn is_known_host(uri: &str) -> bool {
    host_of(uri)
        .map(|host| KNOWN_HOSTS.contains(&host.as_str()))
        .unwrap_or(false)
}

/// Whether the URL targets github.com.
pub fn is_github(uri: &str) -> bool {
    host_of(uri).as_deref() == Some("github.com")
}

/// Lowercased host of a (possibly SCP-style) repository URL.
pub fn host_of(uri: &str) -> Option<String> {
    Url::parse(&scp_to_standard(uri))
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

fn skip_git_suffix(uri: &str) -> bool {
    uri.contains(NO_GIT_SUFFIX_HOST)
}

/// Append `.git` unless the path already has it or the host rejects it.
pub fn with_git_suffix(uri: &str) -> String {
    if uri.ends_with(".git") || skip_git_suffix(uri) {
        uri.to_string()
    } else {
        format!("{}.git", uri)
    }
}

/// A ready-to-send ref advertisement request.
#[derive(Clone, PartialEq, Eq)]
pub struct ServicePackRequest {
    /// Full `.../info/refs?service=git-upload-pack` URL, without userinfo.
    pub url: String,
    /// Basic auth taken from the URL itself or from a matching credential.
    pub auth: Option<BasicAuth>,
}

impl std::fmt::Debug for ServicePackRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePackRequest")
            .field("url", &self.url)
            .field("has_auth", &self.auth.is_some())
            .finish()
    }
}

/// Build the smart-HTTP advertisement request for a repository URL.
///
/// Credentials already embedded in the URL take precedence; otherwise the
/// first `git_source` credential for the host that has both a username and a
/// password is used.
pub fn service_pack_request(
    uri: &str,
    credentials: &Credentials,
) -> Result<ServicePackRequest, FetchError> {
    let standard = scp_to_standard(uri);
    let mut parsed =
        Url::parse(&standard).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", uri, e)))?;

    if parsed.scheme() != "http" && parsed.set_scheme("https").is_err() {
        // `set_scheme` refuses to switch between special and non-special
        // schemes (e.g. `ssh://`), so rebuild from the host and path.
        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(uri.to_string()))?
            .to_string();
        let rebuilt = format!("https://{}{}", host, parsed.path());
        parsed =
            Url::parse(&rebuilt).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", uri, e)))?;
    }

    let embedded = match (parsed.username(), parsed.password()) {
        (user, Some(password)) if !user.is_empty() => Some(BasicAuth {
            username: decode(user),
            password: decode(password),
        }),
        _ => None,
    };
    let auth = embedded.or_else(|| {
        let host = parsed.host_str()?;
        credentials
            .git_sources_for_host(host)
            .find_map(|cred| cred.basic_auth())
    });

    parsed
        .set_username("")
        .map_err(|()| FetchError::InvalidUrl(uri.to_string()))?;
    parsed
        .set_password(None)
        .map_err(|()| FetchError::InvalidUrl(uri.to_string()))?;

    let base = parsed.as_str().trim_end_matches('/').to_string();
    let url = format!("{}{}", with_git_suffix(&base), SERVICE_PATH);

    Ok(ServicePackRequest { url, auth })
}

/// URL handed to `git ls-remote` when smart HTTP fails.
pub fn ls_remote_url(uri: &str) -> String {
    with_git_suffix(uri.trim_end_matches('/'))
}

fn decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| component.to_string())
}
