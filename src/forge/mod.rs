//! forge
//!
//! Compare-commits clients for remote hosting services.
//!
//! # Architecture
//!
//! The `Forge` trait exposes one operation, `compare(base, head)`. The pin
//! resolver asks a [`ForgeFactory`] for a forge bound to a repository and
//! never imports a concrete client.
//!
//! # Modules
//!
//! - `traits`: `Forge` trait, [`CompareStatus`] and [`ForgeError`]
//! - [`github`]: GitHub REST compare endpoint
//! - [`gitlab`]: GitLab repository compare endpoint
//! - [`bitbucket`]: Bitbucket commit listing
//! - [`codecommit`]: AWS CodeCommit (always unknown)
//! - [`mock`]: Mock implementation for deterministic testing
//! - `factory`: Provider detection and forge creation
//!
//! # Example
//!
//! ```no_run
//! use gitpin::core::config::ForgeSettings;
//! use gitpin::core::credentials::Credentials;
//! use gitpin::forge::{DefaultForgeFactory, ForgeFactory, RepoSource};
//!
//! # async fn example() -> Result<(), gitpin::forge::ForgeError> {
//! let factory = DefaultForgeFactory::new(Credentials::default(), ForgeSettings::default());
//! let source = RepoSource::from_url("https://github.com/gocardless/business").unwrap();
//! let forge = factory.forge_for(&source)?;
//!
//! let status = forge.compare("v1.5.0", "a1b78a929dac93a52f08db4f2847d76d6cfe39bd").await?;
//! println!("{}", status);
//! # Ok(())
//! # }
//! ```

pub mod bitbucket;
pub mod codecommit;
mod factory;
pub mod github;
pub mod gitlab;
pub mod mock;
mod traits;

pub use factory::{detect_provider, DefaultForgeFactory, ForgeFactory, ForgeProvider, RepoSource};
pub use traits::*;
