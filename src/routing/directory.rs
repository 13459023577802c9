//! Directory-prefix rule.
//!
//! Matches requests whose path starts with a configured directory, strips
//! that directory before the request is forwarded, and adds it back to
//! backend-authored paths (redirects, cookie paths) on the way out.
//!
//! ```text
//! directory = "backend"  →  normalized "/backend/"
//!
//!   /backend/x ──process──▶ /x ──(backend)──▶ /x ──revert──▶ /backend/x
//! ```

use axum::body::Body;
use axum::http::Request;

use crate::routing::error::{RuleError, RuleResult};
use crate::routing::rule::Rule;

/// Only this literal value disables trailing slash insertion.
const DISABLE_TRAILING_SLASH: &str = "false";

/// Normalize a configured directory into a matching prefix.
///
/// A leading `/` is always inserted when absent. A trailing `/` is inserted
/// when absent and `append_trailing_slash` is set. The result is always
/// derived from the raw value, so normalizing twice never doubles slashes.
pub fn normalize_directory(raw: &str, append_trailing_slash: bool) -> String {
    let mut directory = String::with_capacity(raw.len() + 2);
    if !raw.starts_with('/') {
        directory.push('/');
    }
    directory.push_str(raw);
    if append_trailing_slash && !directory.ends_with('/') {
        directory.push('/');
    }
    directory
}

/// Parse the string-typed trailing slash flag.
///
/// Only `"false"` turns the flag off; every other value keeps the default.
pub fn parse_trailing_slash_flag(value: &str) -> bool {
    value != DISABLE_TRAILING_SLASH
}

/// A rule mapping a public directory onto a backend's root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRule {
    original_directory: String,
    directory: String,
    append_trailing_slash: bool,
}

impl DirectoryRule {
    /// Start configuring a new rule.
    pub fn builder() -> DirectoryRuleBuilder {
        DirectoryRuleBuilder::default()
    }

    /// The normalized prefix this rule matches on.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// The directory exactly as it was configured.
    pub fn original_directory(&self) -> &str {
        &self.original_directory
    }

    pub fn appends_trailing_slash(&self) -> bool {
        self.append_trailing_slash
    }

    /// Returns true if `path` starts with the normalized directory.
    ///
    /// This is a literal, case-sensitive prefix test. A directory of `/`
    /// matches every path.
    pub fn matches_path(&self, path: &str) -> bool {
        path.starts_with(&self.directory)
    }
}

impl Rule for DirectoryRule {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }

    /// Removes the directory, keeping a leading `/` on the result.
    ///
    /// With a directory ending in `/` the separator is reused, so
    /// `/foo/bar` under `/foo/` becomes `/bar`. Without one the remainder is
    /// prefixed with `/`, so `/svcx` under `/svc` becomes `/x`.
    fn process(&self, path: &str) -> RuleResult<String> {
        let rest = path
            .strip_prefix(self.directory.as_str())
            .ok_or_else(|| RuleError::PathOutsideDirectory {
                path: path.to_string(),
                directory: self.directory.clone(),
            })?;
        let mut processed = String::with_capacity(rest.len() + 1);
        processed.push('/');
        processed.push_str(rest);
        Ok(processed)
    }

    /// Prepends the directory to an absolute path. Anything else (relative
    /// references, full URLs) passes through untouched.
    fn revert(&self, path: &str) -> String {
        match path.strip_prefix('/') {
            Some(rest) => {
                let mut reverted = String::with_capacity(self.directory.len() + rest.len());
                reverted.push_str(&self.directory);
                reverted.push_str(rest);
                reverted
            }
            None => path.to_string(),
        }
    }
}

/// Configuration step for a [`DirectoryRule`].
///
/// Setters may be called in any order; the prefix is derived once in
/// [`build`](Self::build) from the raw directory and the final flag.
#[derive(Debug, Clone)]
pub struct DirectoryRuleBuilder {
    directory: Option<String>,
    append_trailing_slash: bool,
}

impl Default for DirectoryRuleBuilder {
    fn default() -> Self {
        Self {
            directory: None,
            append_trailing_slash: true,
        }
    }
}

impl DirectoryRuleBuilder {
    /// Set the directory that will be mapped to a backend.
    pub fn directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Set the directory from an optional configuration value.
    pub fn maybe_directory(mut self, directory: Option<impl Into<String>>) -> Self {
        self.directory = directory.map(Into::into);
        self
    }

    /// Set the trailing slash flag from its string configuration form.
    pub fn append_trailing_slash(mut self, value: &str) -> Self {
        if !parse_trailing_slash_flag(value) {
            self.append_trailing_slash = false;
        }
        self
    }

    pub fn trailing_slash(mut self, append: bool) -> Self {
        self.append_trailing_slash = append;
        self
    }

    /// Finish configuration.
    pub fn build(self) -> RuleResult<DirectoryRule> {
        let original_directory = self.directory.ok_or(RuleError::MissingDirectory)?;
        let directory = normalize_directory(&original_directory, self.append_trailing_slash);
        tracing::debug!(
            original = %original_directory,
            directory = %directory,
            append_trailing_slash = self.append_trailing_slash,
            "Directory rule configured"
        );
        Ok(DirectoryRule {
            original_directory,
            directory,
            append_trailing_slash: self.append_trailing_slash,
        })
    }
}
