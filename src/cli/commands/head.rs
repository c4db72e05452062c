//! head command - Print the commit a ref points to

use anyhow::{bail, Result};

use super::fetcher_for;
use crate::core::config::Config;

/// Print the commit of `reference` (or `HEAD`).
pub async fn head(config: &Config, url: &str, reference: Option<&str>) -> Result<()> {
    let fetcher = fetcher_for(config, url)?;
    let name = reference.unwrap_or("HEAD");

    match fetcher.head_commit_for_ref(name).await? {
        Some(sha) => {
            println!("{}", sha);
            Ok(())
        }
        None => bail!("ref '{}' is not advertised by {}", name, url),
    }
}
