//! refs command - List the refs a repository advertises

use anyhow::{Context as _, Result};

use super::fetcher_for;
use crate::core::config::Config;
use crate::git::GitRef;

/// List advertised refs, one per line: commit, type, name.
pub async fn refs(config: &Config, url: &str, tags_only: bool, json: bool) -> Result<()> {
    let fetcher = fetcher_for(config, url)?;
    let refs: Vec<GitRef> = if tags_only {
        fetcher.tags().await?
    } else {
        fetcher.refs().await?.to_vec()
    };

    if json {
        let out = serde_json::to_string_pretty(&refs).context("failed to serialize refs")?;
        println!("{}", out);
        return Ok(());
    }

    if refs.is_empty() {
        eprintln!("No refs advertised by {}", url);
        return Ok(());
    }
    for r in &refs {
        match r.tag_sha() {
            Some(tag_sha) => println!(
                "{}\t{}\t{} (tag object {})",
                r.commit_sha(),
                r.ref_type(),
                r.name(),
                tag_sha
            ),
            None => println!("{}\t{}\t{}", r.commit_sha(), r.ref_type(), r.name()),
        }
    }
    Ok(())
}
