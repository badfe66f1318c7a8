//! Build metadata for the daemon banner and `--version`.

use chrono::{DateTime, Utc};

/// Crate version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build timestamp emitted by vergen, if available.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("VERGEN_BUILD_TIMESTAMP");

const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");
const GIT_DIRTY: Option<&str> = option_env!("VERGEN_GIT_DIRTY");

/// Short git revision (7 chars) the binary was built from.
pub fn git_revision() -> Option<&'static str> {
    GIT_SHA
        .filter(|sha| sha.chars().all(|c| c.is_ascii_hexdigit()) && !sha.is_empty())
        .map(|sha| &sha[..7.min(sha.len())])
}

/// Version string of the form `{version}+{branch}.{sha}[.dirty]`.
///
/// Falls back to the bare crate version when the build had no git metadata
/// (e.g. a crates.io tarball).
pub fn version_string() -> String {
    let Some(sha) = git_revision() else {
        return PKG_VERSION.to_string();
    };
    let branch = GIT_BRANCH.unwrap_or("detached");
    let dirty = if GIT_DIRTY == Some("true") { ".dirty" } else { "" };
    format!("{PKG_VERSION}+{branch}.{sha}{dirty}")
}

/// Parsed [`BUILD_TIMESTAMP`], if vergen emitted a valid one.
pub fn build_time() -> Option<DateTime<Utc>> {
    BUILD_TIMESTAMP
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_pkg_version() {
        assert!(version_string().starts_with(PKG_VERSION));
    }

    #[test]
    fn git_revision_is_short_hex() {
        if let Some(sha) = git_revision() {
            assert!(sha.len() <= 7);
            assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn build_time_is_not_in_the_future() {
        if let Some(built) = build_time() {
            assert!(built <= Utc::now());
        }
    }
}
