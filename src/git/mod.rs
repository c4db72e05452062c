//! git
//!
//! Ref discovery for remote repositories, without a local clone.
//!
//! # Architecture
//!
//! Everything gitpin knows about a repository comes from its ref
//! advertisement: the list of `<sha> <ref>` pairs a server sends for
//! `service=git-upload-pack`, or the equivalent `git ls-remote` output.
//!
//! - [`url`] - Normalizes repository URLs and builds the service request
//! - [`transport`] - HTTP and subprocess seams
//! - [`advertisement`] - Parses raw advertisements into [`GitRef`]s
//! - [`fetcher`] - [`GitReferenceFetcher`], the memoized entry point
//! - [`mock`] - Scripted transports for tests
//!
//! # Invariants
//!
//! - One advertisement request per fetcher, however many queries follow
//! - Parsed refs carry the peeled commit, never an annotated tag object
//! - Nothing here writes to a repository
//!
//! # Example
//!
//! ```
//! use gitpin::git::advertisement;
//!
//! let raw = "c5bf1bd47935504072ac0eba1006cf4d67af6a7a\trefs/tags/v1.0.0\n\
//!            df9f605d7111b6814fe493cf8f41de3f9f0978b2\trefs/tags/v1.0.0^{}\n";
//! let refs = advertisement::parse(raw);
//! assert_eq!(refs[0].commit_sha(), "df9f605d7111b6814fe493cf8f41de3f9f0978b2");
//! ```

pub mod advertisement;
pub mod fetcher;
pub mod mock;
pub mod reference;
pub mod transport;
pub mod url;

pub use fetcher::{FetchError, GitReferenceFetcher};
pub use reference::{apply_tag_prefix, GitRef, LocalTag, RefType, TAGS_PREFIX};
pub use transport::{
    CommandOutput, CommandRunner, HttpResponse, HttpTransport, ReqwestTransport,
    SystemCommandRunner, TransportError,
};
