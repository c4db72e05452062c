//! git::advertisement
//!
//! Parser for `git-upload-pack` ref advertisements.
//!
//! # Format
//!
//! Smart-HTTP servers answer `info/refs?service=git-upload-pack` with pkt-lines:
//!
//! ```text
//! 001e# service=git-upload-pack
//! 0000015b7bb4e41ce5164074a0920d5b5770d196b4d90104 HEAD\0multi_ack ...
//! 003f7bb4e41ce5164074a0920d5b5770d196b4d90104 refs/heads/master
//! 003fc5bf1bd47935504072ac0eba1006cf4d67af6a7a refs/tags/v1.0.0
//! 0042df9f605d7111b6814fe493cf8f41de3f9f0978b2 refs/tags/v1.0.0^{}
//! 0000
//! ```
//!
//! `git ls-remote` prints the same pairs without length prefixes and with a tab
//! separator. Both forms are handled by taking the last whitespace token as the
//! ref name and the last 40 characters of the first token as the SHA.
//!
//! # Parsing
//!
//! Parsing is two-pass: the first pass builds one entry per `refs/tags/*` or
//! `refs/heads/*` line and defers `^{}` peel lines; the second pass patches the
//! commit SHA of each entry that has a peel line. Entries are frozen into
//! [`GitRef`] values only after both passes.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::reference::{GitRef, RefType};

const TAGS_REF_PREFIX: &str = "refs/tags/";
const HEADS_REF_PREFIX: &str = "refs/heads/";
const PEEL_SUFFIX: &str = "^{}";
const SHA_LEN: usize = 40;

/// Smart HTTP service announcement, optionally behind its pkt-line length.
static SERVICE_PREAMBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:[0-9a-f]{4})?# service=git-upload-pack")
        .expect("valid preamble regex")
});

/// Ref entry under construction; `commit_sha` is patched by peel lines.
struct RefBuilder {
    name: String,
    ref_type: RefType,
    ref_sha: String,
    commit_sha: String,
}

impl RefBuilder {
    fn freeze(self) -> GitRef {
        GitRef::peeled(self.name, self.ref_type, self.ref_sha, self.commit_sha)
    }
}

/// Remove the leading `# service=git-upload-pack` announcement from the payload.
///
/// Bitbucket (among others) omits the line break after the announcement, which
/// glues it onto the first ref line. Only the announcement itself is removed,
/// so ref names and capabilities that mention `git-upload-pack` survive.
pub fn strip_service_preamble(raw: &str) -> String {
    SERVICE_PREAMBLE.replace(raw, "").into_owned()
}

/// Extract the SHA from an advertisement line.
///
/// The first token is `<pkt-len><sha>` for smart HTTP and `<sha>` for
/// `ls-remote`; either way the SHA is its last 40 characters.
pub fn sha_for_line(line: &str) -> Option<String> {
    let first = line.split_whitespace().next()?;
    let chars: Vec<char> = first.chars().collect();
    let start = chars.len().saturating_sub(SHA_LEN);
    Some(chars[start..].iter().collect())
}

/// Strip `refs/tags/` or `refs/heads/` from a full ref name.
fn short_name(full_ref_name: &str) -> Option<(&str, RefType)> {
    if let Some(rest) = full_ref_name.strip_prefix(TAGS_REF_PREFIX) {
        Some((rest, RefType::Tag))
    } else {
        full_ref_name
            .strip_prefix(HEADS_REF_PREFIX)
            .map(|rest| (rest, RefType::Head))
    }
}

/// Parse a raw advertisement into resolved refs, in order of first appearance.
///
/// Lines that do not name a branch or tag (HEAD, capabilities, flush packets,
/// pull request refs) contribute nothing.
pub fn parse(raw: &str) -> Vec<GitRef> {
    let body = strip_service_preamble(raw);

    let mut order: Vec<String> = Vec::new();
    let mut entries: HashMap<String, RefBuilder> = HashMap::new();
    let mut peel_lines: Vec<&str> = Vec::new();

    for line in body.lines() {
        let Some(full_ref_name) = line.split_whitespace().last() else {
            continue;
        };
        if !full_ref_name.starts_with(TAGS_REF_PREFIX)
            && !full_ref_name.starts_with(HEADS_REF_PREFIX)
        {
            continue;
        }
        if line.trim().ends_with(PEEL_SUFFIX) {
            peel_lines.push(line);
            continue;
        }

        let Some((name, ref_type)) = short_name(full_ref_name) else {
            continue;
        };
        let Some(sha) = sha_for_line(line) else {
            continue;
        };

        if !entries.contains_key(name) {
            order.push(name.to_string());
        }
        entries.insert(
            name.to_string(),
            RefBuilder {
                name: name.to_string(),
                ref_type,
                commit_sha: sha.clone(),
                ref_sha: sha,
            },
        );
    }

    for line in peel_lines {
        let Some(full_ref_name) = line.split_whitespace().last() else {
            continue;
        };
        let Some((name, _)) = short_name(full_ref_name) else {
            continue;
        };
        let name = name.strip_suffix(PEEL_SUFFIX).unwrap_or(name);
        if let (Some(entry), Some(sha)) = (entries.get_mut(name), sha_for_line(line)) {
            entry.commit_sha = sha;
        }
    }

    order
        .into_iter()
        .filter_map(|name| entries.remove(&name))
        .map(RefBuilder::freeze)
        .collect()
}

/// SHA advertised for the symbolic `HEAD` ref, if any.
pub fn head_sha(raw: &str) -> Option<String> {
    strip_service_preamble(raw)
        .lines()
        .find(|line| line.contains(" HEAD") || line.contains("\tHEAD"))
        .and_then(sha_for_line)
}

/// Whether the advertisement lists `full_ref_name` (e.g. `refs/tags/v1.0.0`).
///
/// Peel lines do not count: `refs/tags/v1.0.0^{}` does not advertise
/// `refs/tags/v1.0.0` on its own.
pub fn advertises(raw: &str, full_ref_name: &str) -> bool {
    raw.lines().any(|line| {
        let line = line.trim_end();
        match line.strip_suffix(full_ref_name) {
            Some(rest) => rest.ends_with(|c: char| c.is_whitespace()),
            None => false,
        }
    })
}
